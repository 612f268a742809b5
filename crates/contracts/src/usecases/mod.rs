pub mod u001_import_products_csv;
