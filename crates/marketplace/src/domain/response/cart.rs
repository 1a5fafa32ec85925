use crate::model::{
    cart::CartLineSnapshot,
    product::{ProductSnapshot, ProductStatus},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartProductResponse {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub quantity: i32,
    pub status: ProductStatus,
}

impl From<ProductSnapshot> for CartProductResponse {
    fn from(value: ProductSnapshot) -> Self {
        CartProductResponse {
            id: value.id,
            farmer_id: value.farmer_id,
            title: value.title,
            price: value.price,
            quantity: value.quantity,
            status: value.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product: Option<CartProductResponse>,
}

impl From<CartLineSnapshot> for CartItemResponse {
    fn from(value: CartLineSnapshot) -> Self {
        CartItemResponse {
            id: value.item.id,
            product_id: value.item.product_id,
            quantity: value.item.quantity,
            created_at: value.item.created_at,
            updated_at: value.item.updated_at,
            product: value.product.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartSummaryResponse {
    pub item_count: i64,
    pub subtotal: Decimal,
    pub total: Decimal,
}

impl CartSummaryResponse {
    /// Totals over lines whose product is still available.
    pub fn from_lines(lines: &[CartLineSnapshot]) -> Self {
        let (item_count, subtotal) = lines
            .iter()
            .filter_map(|line| {
                line.product
                    .as_ref()
                    .filter(|p| p.status == ProductStatus::Available)
                    .map(|p| (line.item.quantity, p.price))
            })
            .fold((0i64, Decimal::ZERO), |(count, sum), (qty, price)| {
                (count + i64::from(qty), sum + price * Decimal::from(qty))
            });

        let subtotal = subtotal.round_dp(2);
        Self {
            item_count,
            subtotal,
            total: subtotal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    #[serde(flatten)]
    pub summary: CartSummaryResponse,
}
