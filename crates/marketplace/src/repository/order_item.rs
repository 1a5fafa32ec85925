use crate::{
    abstract_trait::order_item::{OrderItemCommandRepositoryTrait, OrderItemQueryRepositoryTrait},
    domain::requests::order::CreateOrderItemRecordRequest,
    model::order_item::OrderItem as OrderItemModel,
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderItemCommandRepository {
    db: ConnectionPool,
}

impl OrderItemCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderItemCommandRepositoryTrait for OrderItemCommandRepository {
    async fn create_order_item(
        &self,
        req: &CreateOrderItemRecordRequest,
    ) -> Result<OrderItemModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let item = sqlx::query_as::<_, OrderItemModel>(
            r#"
            INSERT INTO order_items (id, order_id, product_id, quantity, unit_price, subtotal, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, now())
            RETURNING id, order_id, product_id, quantity, unit_price, subtotal, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(req.order_id)
        .bind(req.product_id)
        .bind(req.quantity)
        .bind(req.unit_price)
        .bind(req.subtotal)
        .fetch_one(&mut *conn)
        .await
        .map_err(|err| {
            error!(
                "❌ Failed to create order item for order {} product {}: {:?}",
                req.order_id, req.product_id, err
            );
            RepositoryError::from(err)
        })?;

        info!("✅ Created order item {} for order {}", item.id, item.order_id);
        Ok(item)
    }

    async fn delete_order_item(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let result = sqlx::query("DELETE FROM order_items WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|err| {
                error!("❌ Failed to delete order item {id}: {err:?}");
                RepositoryError::from(err)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!("🗑️ Deleted order item {id}");
        Ok(())
    }
}

#[derive(Clone)]
pub struct OrderItemQueryRepository {
    db: ConnectionPool,
}

impl OrderItemQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderItemQueryRepositoryTrait for OrderItemQueryRepository {
    async fn find_by_order(&self, order_id: Uuid) -> Result<Vec<OrderItemModel>, RepositoryError> {
        info!("📦 Fetching order items for order {order_id}");

        sqlx::query_as::<_, OrderItemModel>(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price, subtotal, created_at
            FROM order_items
            WHERE order_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch order items for order {order_id}: {err:?}");
            RepositoryError::from(err)
        })
    }
}
