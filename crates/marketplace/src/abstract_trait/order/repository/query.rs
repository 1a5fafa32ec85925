use crate::{
    domain::requests::order::{FindOrdersRecordRequest, OrderScope},
    model::order::{Order as OrderModel, OrderAmountRow},
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderQueryRepository = Arc<dyn OrderQueryRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryRepositoryTrait {
    async fn find_all(
        &self,
        req: &FindOrdersRecordRequest,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderModel>, RepositoryError>;
    async fn contains_farmer_product(
        &self,
        order_id: Uuid,
        farmer_id: Uuid,
    ) -> Result<bool, RepositoryError>;
    /// One row per visible order. Farmers get the sum of their own lines.
    async fn find_amounts(&self, scope: OrderScope) -> Result<Vec<OrderAmountRow>, RepositoryError>;
}
