use super::{item_repository, repository};
use contracts::domain::a003_order::Order;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, TransactionTrait};

/// Записать заказ вместе со строками одной транзакцией.
///
/// Журнал продаж наполняется внешней системой; здесь запись нужна для
/// загрузки тестовых данных и ручного пополнения журнала.
pub async fn record_order(db: &DatabaseConnection, order: &Order) -> Result<(), DbErr> {
    let txn = db.begin().await?;
    if let Err(e) = repository::insert(&txn, order).await {
        txn.rollback().await?;
        return Err(e);
    }
    if let Err(e) = item_repository::insert_many(&txn, &order.items).await {
        txn.rollback().await?;
        return Err(e);
    }
    txn.commit().await?;
    tracing::debug!(
        "Recorded order {} ({} items, total {})",
        order.id,
        order.items.len(),
        order.total
    );
    Ok(())
}

/// Загрузить заказ со строками
pub async fn get_with_items(db: &DatabaseConnection, id: &str) -> Result<Option<Order>, DbErr> {
    let Some(model) = repository::Entity::find_by_id(id.to_string()).one(db).await? else {
        return Ok(None);
    };
    let mut order: Order = model.into();
    order.items = item_repository::list_by_order(db, id).await?;
    Ok(Some(order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::testing::setup_db;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    #[tokio::test]
    async fn order_and_items_round_trip() {
        let db = setup_db().await;
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let order = Order::new("user-7", created_at)
            .with_item(2, Decimal::new(1000, 2))
            .with_item(1, Decimal::new(500, 2));
        record_order(&db.conn, &order).await.unwrap();

        let stored = get_with_items(&db.conn, &order.id)
            .await
            .unwrap()
            .expect("order");
        assert_eq!(stored.created_at, created_at);
        assert_eq!(stored.total, Decimal::new(2500, 2));
        assert_eq!(stored.items.len(), 2);
        assert_eq!(stored.units(), 3);
    }

    #[tokio::test]
    async fn duplicate_order_id_is_rejected_whole() {
        let db = setup_db().await;
        let order = Order::new("user-1", Utc::now()).with_item(1, Decimal::ONE);
        record_order(&db.conn, &order).await.unwrap();

        let mut again = Order::new("user-1", Utc::now()).with_item(5, Decimal::ONE);
        again.id = order.id.clone();
        assert!(record_order(&db.conn, &again).await.is_err());

        let stored = get_with_items(&db.conn, &order.id).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 1);
    }
}
