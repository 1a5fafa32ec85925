use crate::model::{
    order::{Order as OrderModel, OrderStatus, PaymentMethod, PaymentStatus},
    order_item::OrderItem as OrderItemModel,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub order_number: String,
    pub total_amount: Decimal,
    pub delivery_address: String,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl From<OrderModel> for OrderResponse {
    fn from(value: OrderModel) -> Self {
        OrderResponse {
            id: value.id,
            buyer_id: value.buyer_id,
            order_number: value.order_number,
            total_amount: value.total_amount,
            delivery_address: value.delivery_address,
            payment_method: value.payment_method,
            payment_status: value.payment_status,
            status: value.status,
            notes: value.notes,
            created_at: value.created_at,
            updated_at: value.updated_at,
            confirmed_at: value.confirmed_at,
            delivered_at: value.delivered_at,
            cancelled_at: value.cancelled_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub subtotal: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<OrderItemModel> for OrderItemResponse {
    fn from(value: OrderItemModel) -> Self {
        OrderItemResponse {
            id: value.id,
            order_id: value.order_id,
            product_id: value.product_id,
            quantity: value.quantity,
            unit_price: value.unit_price,
            subtotal: value.subtotal,
            created_at: value.created_at,
        }
    }
}

/// An order together with its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub order_items: Vec<OrderItemResponse>,
}

/// `total_amount` is money spent for buyers, own-line revenue for farmers
/// and gross order value for admins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderStatsResponse {
    pub total_orders: i64,
    pub total_amount: Decimal,
    pub pending_orders: i64,
    pub active_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    pub orders_by_status: BTreeMap<String, i64>,
}
