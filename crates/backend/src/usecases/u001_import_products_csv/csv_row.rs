use super::error::ImportError;
use csv::StringRecord;
use rust_decimal::Decimal;
use std::str::FromStr;

pub const COL_TITLE: &str = "title";
pub const COL_COLOR_NAME: &str = "colorName";
pub const COL_COLOR_CODE: &str = "colorCode";
pub const COL_SIZE: &str = "size";
pub const COL_STOCK: &str = "stock";
pub const COL_PRICE: &str = "price";
pub const COL_IMAGE: &str = "image";

pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_TITLE,
    COL_COLOR_NAME,
    COL_COLOR_CODE,
    COL_SIZE,
    COL_STOCK,
    COL_PRICE,
    COL_IMAGE,
];

const UTF8_BOM: char = '\u{feff}';

/// Индексы обязательных колонок, вычисляются один раз по заголовку
#[derive(Debug, Clone, Copy)]
pub struct ColumnIndex {
    title: usize,
    color_name: usize,
    color_code: usize,
    size: usize,
    stock: usize,
    price: usize,
    image: usize,
}

impl ColumnIndex {
    pub fn from_headers(headers: &StringRecord) -> Result<Self, ImportError> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches(UTF8_BOM).trim())
            .collect();
        let position = |column: &str| names.iter().position(|name| *name == column);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| position(**column).is_none())
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ImportError::MissingColumns(missing));
        }

        let index = |column: &str| position(column).unwrap_or_default();
        Ok(Self {
            title: index(COL_TITLE),
            color_name: index(COL_COLOR_NAME),
            color_code: index(COL_COLOR_CODE),
            size: index(COL_SIZE),
            stock: index(COL_STOCK),
            price: index(COL_PRICE),
            image: index(COL_IMAGE),
        })
    }
}

/// Типизированная строка CSV после нормализации
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRow {
    /// Номер строки в файле (заголовок = 1)
    pub line: u64,
    pub title: String,
    pub color_name: String,
    pub color_code: String,
    pub size: String,
    pub stock: i32,
    pub price: Decimal,
    pub image: String,
}

impl ProductRow {
    pub fn parse(record: &StringRecord, line: u64, columns: &ColumnIndex) -> Result<Self, ImportError> {
        // flexible: короткая строка дает пустые поля
        let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();

        Ok(Self {
            line,
            title: field(columns.title),
            color_name: field(columns.color_name),
            color_code: field(columns.color_code),
            size: field(columns.size),
            stock: parse_stock(&field(columns.stock), line)?,
            price: parse_price(&field(columns.price), line)?,
            image: field(columns.image),
        })
    }

    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }
}

fn invalid(line: u64, column: &'static str, value: &str) -> ImportError {
    ImportError::InvalidValue {
        line,
        column,
        value: value.to_string(),
    }
}

/// Пусто -> 0; запятая допускается как десятичный разделитель
pub fn parse_price(raw: &str, line: u64) -> Result<Decimal, ImportError> {
    if raw.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let normalized = raw.replace(',', ".");
    let price = Decimal::from_str(&normalized).map_err(|_| invalid(line, COL_PRICE, raw))?;
    if price < Decimal::ZERO {
        return Err(invalid(line, COL_PRICE, raw));
    }
    Ok(price)
}

/// Пусто -> 0
pub fn parse_stock(raw: &str, line: u64) -> Result<i32, ImportError> {
    if raw.is_empty() {
        return Ok(0);
    }
    match raw.parse::<i32>() {
        Ok(stock) if stock >= 0 => Ok(stock),
        _ => Err(invalid(line, COL_STOCK, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> StringRecord {
        StringRecord::from(names.to_vec())
    }

    #[test]
    fn header_order_does_not_matter_and_extra_columns_are_ignored() {
        let h = headers(&[
            "\u{feff}image", "price", "notes", "stock", "size", "colorCode", "colorName", "title",
        ]);
        let columns = ColumnIndex::from_headers(&h).unwrap();
        let record = StringRecord::from(vec![
            "/a.png", "19,90", "ignored", "4", "M", "#fff", " White ", "Tee",
        ]);
        let row = ProductRow::parse(&record, 2, &columns).unwrap();
        assert_eq!(row.title, "Tee");
        assert_eq!(row.color_name, "White");
        assert_eq!(row.image, "/a.png");
        assert_eq!(row.stock, 4);
        assert_eq!(row.price, Decimal::new(1990, 2));
    }

    #[test]
    fn all_missing_columns_are_listed() {
        let err = ColumnIndex::from_headers(&headers(&["title", "size", "Price"])).unwrap_err();
        match err {
            ImportError::MissingColumns(missing) => assert_eq!(
                missing,
                vec!["colorName", "colorCode", "stock", "price", "image"]
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_numbers_default_to_zero() {
        assert_eq!(parse_price("", 3).unwrap(), Decimal::ZERO);
        assert_eq!(parse_stock("", 3).unwrap(), 0);
    }

    #[test]
    fn bad_numbers_are_rejected_with_position() {
        for raw in ["abc", "-1.50", "1.2.3"] {
            let err = parse_price(raw, 7).unwrap_err();
            assert!(
                matches!(&err, ImportError::InvalidValue { line: 7, column: "price", value } if value == raw),
                "{raw}: {err}"
            );
        }
        assert!(parse_stock("-3", 8).is_err());
        assert!(parse_stock("2.5", 8).is_err());
        assert_eq!(parse_stock("12", 8).unwrap(), 12);
    }

    #[test]
    fn short_record_yields_empty_fields() {
        let columns = ColumnIndex::from_headers(&headers(&REQUIRED_COLUMNS)).unwrap();
        let row = ProductRow::parse(&StringRecord::from(vec!["Cap", "Blue"]), 5, &columns).unwrap();
        assert_eq!(row.title, "Cap");
        assert_eq!(row.size, "");
        assert_eq!(row.stock, 0);
        assert_eq!(row.price, Decimal::ZERO);
    }
}
