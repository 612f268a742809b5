use super::repository;
use contracts::domain::a001_product::Product;
use contracts::domain::common::AggregateId;
use sea_orm::{ConnectionTrait, DbErr, SqlErr};

/// Результат поиска/создания товара
#[derive(Debug, Clone)]
pub struct ResolvedProduct {
    pub product: Product,
    pub created: bool,
}

/// Найти товар по названию или создать новый.
///
/// Вставка выполняется сразу (вне пачки вариантов), чтобы следующие строки
/// того же импорта видели товар. Если параллельный импорт успел вставить то же
/// название, срабатывает уникальный индекс и возвращается уже существующий товар.
pub async fn find_or_create_by_title<C: ConnectionTrait>(
    conn: &C,
    title: &str,
) -> Result<ResolvedProduct, DbErr> {
    if let Some(product) = repository::find_by_title(conn, title).await? {
        return Ok(ResolvedProduct {
            product,
            created: false,
        });
    }

    let product = Product::new_for_insert(title);
    product.validate().map_err(DbErr::Custom)?;

    match repository::insert(conn, &product).await {
        Ok(()) => {
            tracing::debug!("Created product '{}' ({})", product.title, product.id.as_string());
            Ok(ResolvedProduct {
                product,
                created: true,
            })
        }
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            tracing::warn!(
                "Product '{}' was created concurrently, reusing existing row",
                title
            );
            let product = repository::find_by_title(conn, title)
                .await?
                .ok_or_else(|| DbErr::RecordNotFound(format!("a001_product '{}'", title)))?;
            Ok(ResolvedProduct {
                product,
                created: false,
            })
        }
        Err(e) => Err(e),
    }
}
