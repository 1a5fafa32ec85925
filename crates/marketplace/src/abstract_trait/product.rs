use crate::model::product::{ProductSnapshot, StockDecrement};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;
use uuid::Uuid;

pub type DynProductRepository = Arc<dyn ProductRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait ProductRepositoryTrait {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductSnapshot>, RepositoryError>;

    /// Takes `amount` units only if the product is available and holds at
    /// least that many. A rejected decrement leaves the row untouched.
    async fn conditional_decrement(
        &self,
        product_id: Uuid,
        amount: i32,
    ) -> Result<StockDecrement, RepositoryError>;
}
