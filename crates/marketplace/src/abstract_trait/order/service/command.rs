use crate::domain::{
    requests::order::{UpdateOrderStatusRequest, UpdatePaymentStatusRequest},
    response::order::OrderResponse,
};
use async_trait::async_trait;
use shared::{
    domain::{ApiResponse, Identity},
    errors::ServiceError,
};
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderCommandService = Arc<dyn OrderCommandServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandServiceTrait {
    async fn update_status(
        &self,
        identity: Identity,
        order_id: Uuid,
        req: &UpdateOrderStatusRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
    async fn update_payment_status(
        &self,
        order_id: Uuid,
        req: &UpdatePaymentStatusRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
}
