use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::errors::RepositoryError;
use std::sync::Arc;
use uuid::Uuid;

pub type DynBuyerStatsRepository = Arc<dyn BuyerStatsRepositoryTrait + Send + Sync>;
pub type DynProducerStatsRepository = Arc<dyn ProducerStatsRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait BuyerStatsRepositoryTrait {
    /// Adds one order worth `amount` and remembers the last delivery address.
    async fn apply_order(
        &self,
        buyer_id: Uuid,
        amount: Decimal,
        delivery_address: &str,
    ) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProducerStatsRepositoryTrait {
    async fn apply_sales(&self, producer_id: Uuid, amount: Decimal)
    -> Result<(), RepositoryError>;
}
