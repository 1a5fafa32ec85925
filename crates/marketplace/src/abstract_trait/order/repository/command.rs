use crate::{
    domain::requests::order::{CreateOrderRecordRequest, UpdateOrderStatusRecordRequest},
    model::order::{Order as OrderModel, PaymentStatus},
};
use async_trait::async_trait;
use shared::errors::RepositoryError;
use std::sync::Arc;
use uuid::Uuid;

pub type DynOrderCommandRepository = Arc<dyn OrderCommandRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait OrderCommandRepositoryTrait {
    async fn create_order(
        &self,
        req: &CreateOrderRecordRequest,
    ) -> Result<OrderModel, RepositoryError>;
    /// Also stamps `confirmed_at`, `delivered_at` or `cancelled_at`; delivery
    /// marks the payment completed.
    async fn update_status(
        &self,
        req: &UpdateOrderStatusRecordRequest,
    ) -> Result<OrderModel, RepositoryError>;
    async fn update_payment_status(
        &self,
        order_id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<OrderModel, RepositoryError>;
}
