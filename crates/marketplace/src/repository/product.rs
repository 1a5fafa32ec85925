use crate::{
    abstract_trait::product::ProductRepositoryTrait,
    model::product::{ProductSnapshot, StockDecrement},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ProductRepository {
    db: ConnectionPool,
}

impl ProductRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepositoryTrait for ProductRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductSnapshot>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, ProductSnapshot>(
            r#"
            SELECT id, farmer_id, title, price, quantity, status, order_count
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to fetch product {id}: {err:?}");
            RepositoryError::from(err)
        })
    }

    async fn conditional_decrement(
        &self,
        product_id: Uuid,
        amount: i32,
    ) -> Result<StockDecrement, RepositoryError> {
        if amount <= 0 {
            warn!("⚠️ Refusing non-positive decrement of {amount} for product {product_id}");
            return Ok(StockDecrement::rejected());
        }

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let remaining = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE products
            SET quantity    = quantity - $2,
                status      = CASE WHEN quantity - $2 = 0
                                   THEN 'out_of_stock'::product_status
                                   ELSE 'available'::product_status END,
                order_count = order_count + 1,
                updated_at  = now()
            WHERE id = $1
              AND status = 'available'
              AND $2 > 0
              AND quantity >= $2
            RETURNING quantity
            "#,
        )
        .bind(product_id)
        .bind(amount)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|err| {
            error!("❌ Failed to decrement stock for product {product_id}: {err:?}");
            RepositoryError::from(err)
        })?;

        match remaining {
            Some(quantity) => {
                info!("📉 Product {product_id} stock decremented by {amount}, {quantity} left");
                Ok(StockDecrement::applied(quantity))
            }
            None => {
                warn!("⚠️ Product {product_id} could not give {amount} units");
                Ok(StockDecrement::rejected())
            }
        }
    }
}
