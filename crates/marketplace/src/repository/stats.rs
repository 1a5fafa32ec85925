use crate::abstract_trait::stats::{BuyerStatsRepositoryTrait, ProducerStatsRepositoryTrait};
use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct BuyerStatsRepository {
    db: ConnectionPool,
}

impl BuyerStatsRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BuyerStatsRepositoryTrait for BuyerStatsRepository {
    async fn apply_order(
        &self,
        buyer_id: Uuid,
        amount: Decimal,
        delivery_address: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE buyers
            SET total_spent      = total_spent + $2,
                total_orders     = total_orders + 1,
                delivery_address = $3,
                updated_at       = now()
            WHERE user_id = $1
            "#,
        )
        .bind(buyer_id)
        .bind(amount)
        .bind(delivery_address)
        .execute(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to update stats for buyer {buyer_id}: {err:?}");
            RepositoryError::from(err)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!("📈 Buyer {buyer_id} spent {amount}");
        Ok(())
    }
}

#[derive(Clone)]
pub struct ProducerStatsRepository {
    db: ConnectionPool,
}

impl ProducerStatsRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProducerStatsRepositoryTrait for ProducerStatsRepository {
    async fn apply_sales(
        &self,
        producer_id: Uuid,
        amount: Decimal,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE farmers
            SET total_sales = total_sales + $2,
                updated_at  = now()
            WHERE user_id = $1
            "#,
        )
        .bind(producer_id)
        .bind(amount)
        .execute(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to update sales for farmer {producer_id}: {err:?}");
            RepositoryError::from(err)
        })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!("📈 Farmer {producer_id} sold {amount}");
        Ok(())
    }
}
