use crate::model::order::{OrderStatus, PaymentMethod, PaymentStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

pub const MAX_PAGE: i64 = 1_000_000;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FindAllOrder {
    #[validate(range(min = 1, max = MAX_PAGE))]
    #[serde(default = "default_page")]
    pub page: i64,

    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_limit")]
    pub limit: i64,

    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl Default for FindAllOrder {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            status: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePaymentStatusRequest {
    pub payment_status: PaymentStatus,
}

/// Order header as written by checkout.
#[derive(Debug, Clone)]
pub struct CreateOrderRecordRequest {
    pub buyer_id: Uuid,
    pub order_number: String,
    pub total_amount: Decimal,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderItemRecordRequest {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
}

/// Which orders a caller may list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    Buyer(Uuid),
    Farmer(Uuid),
    All,
}

#[derive(Debug, Clone)]
pub struct FindOrdersRecordRequest {
    pub scope: OrderScope,
    pub status: Option<OrderStatus>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone)]
pub struct UpdateOrderStatusRecordRequest {
    pub order_id: Uuid,
    /// Status the caller observed; the update is skipped if it has moved on.
    pub from: OrderStatus,
    pub status: OrderStatus,
}
