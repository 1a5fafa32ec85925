use super::ORDER_COLUMNS;
use crate::{
    abstract_trait::order::repository::OrderCommandRepositoryTrait,
    domain::requests::order::{CreateOrderRecordRequest, UpdateOrderStatusRecordRequest},
    model::order::{Order as OrderModel, PaymentStatus},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderCommandRepository {
    db: ConnectionPool,
}

impl OrderCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for OrderCommandRepository {
    async fn create_order(
        &self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            INSERT INTO orders (
                id, buyer_id, order_number, total_amount, delivery_address,
                payment_method, payment_status, status, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', 'pending', $7, now(), now())
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, OrderModel>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.buyer_id)
            .bind(&req.order_number)
            .bind(req.total_amount)
            .bind(&req.delivery_address)
            .bind(req.payment_method)
            .bind(req.notes.as_deref())
            .fetch_one(&mut *conn)
            .await
            .map_err(|err| {
                error!(
                    "❌ Failed to create order {} for buyer {}: {:?}",
                    req.order_number, req.buyer_id, err
                );
                RepositoryError::from(err)
            })?;

        info!(
            "✅ Created order {} ({}) for buyer {}",
            order.order_number, order.id, order.buyer_id
        );
        Ok(order)
    }

    async fn update_status(
        &self,
        req: &UpdateOrderStatusRecordRequest,
    ) -> Result<OrderModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            UPDATE orders
            SET status         = $3,
                updated_at     = now(),
                confirmed_at   = CASE WHEN $3 = 'confirmed'::order_status THEN now() ELSE confirmed_at END,
                delivered_at   = CASE WHEN $3 = 'delivered'::order_status THEN now() ELSE delivered_at END,
                cancelled_at   = CASE WHEN $3 = 'cancelled'::order_status THEN now() ELSE cancelled_at END,
                payment_status = CASE WHEN $3 = 'delivered'::order_status
                                      THEN 'completed'::payment_status
                                      ELSE payment_status END
            WHERE id = $1 AND status = $2
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, OrderModel>(&sql)
            .bind(req.order_id)
            .bind(req.from)
            .bind(req.status)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|err| {
                error!("❌ Failed to update status of order {}: {:?}", req.order_id, err);
                RepositoryError::from(err)
            })?
            .ok_or_else(|| {
                RepositoryError::Conflict(format!(
                    "Order {} is no longer {}",
                    req.order_id, req.from
                ))
            })?;

        info!("🔄 Order {} moved {} -> {}", order.id, req.from, order.status);
        Ok(order)
    }

    async fn update_payment_status(
        &self,
        order_id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<OrderModel, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            UPDATE orders
            SET payment_status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, OrderModel>(&sql)
            .bind(order_id)
            .bind(payment_status)
            .fetch_one(&mut *conn)
            .await
            .map_err(|err| {
                error!("❌ Failed to update payment of order {order_id}: {err:?}");
                RepositoryError::from(err)
            })
    }
}
