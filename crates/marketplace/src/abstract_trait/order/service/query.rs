use crate::domain::{
    requests::order::FindAllOrder,
    response::order::{OrderDetailResponse, OrderResponse, OrderStatsResponse},
};
use async_trait::async_trait;
use shared::{
    domain::{ApiResponse, ApiResponsePagination, Identity},
    errors::ServiceError,
};
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderQueryService = Arc<dyn OrderQueryServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderQueryServiceTrait {
    async fn find_all(
        &self,
        identity: Identity,
        req: &FindAllOrder,
    ) -> Result<ApiResponsePagination<Vec<OrderResponse>>, ServiceError>;
    async fn find_by_id(
        &self,
        identity: Identity,
        order_id: Uuid,
    ) -> Result<ApiResponse<OrderDetailResponse>, ServiceError>;
    async fn stats(&self, identity: Identity)
    -> Result<ApiResponse<OrderStatsResponse>, ServiceError>;
}
