use crate::{
    domain::{requests::checkout::CheckoutRequest, response::checkout::CheckoutResponse},
    errors::CheckoutError,
};
use async_trait::async_trait;
use shared::domain::ApiResponse;
use std::sync::Arc;
use uuid::Uuid;

pub type DynCheckoutService = Arc<dyn CheckoutServiceTrait + Send + Sync>;

#[async_trait]
pub trait CheckoutServiceTrait {
    async fn place_order(
        &self,
        buyer_id: Uuid,
        req: &CheckoutRequest,
    ) -> Result<ApiResponse<CheckoutResponse>, CheckoutError>;
}
