use crate::model::product::{ProductSnapshot, ProductStatus};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `cart_items LEFT JOIN products` row.
#[derive(Debug, FromRow)]
pub struct CartProductRow {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product_title: Option<String>,
    pub product_price: Option<Decimal>,
    pub product_quantity: Option<i32>,
    pub product_status: Option<ProductStatus>,
    pub product_farmer_id: Option<Uuid>,
    pub product_order_count: Option<i32>,
}

/// A cart line together with the product state read alongside it.
/// `product` is `None` when the product row no longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineSnapshot {
    pub item: CartItem,
    pub product: Option<ProductSnapshot>,
}

impl From<CartProductRow> for CartLineSnapshot {
    fn from(row: CartProductRow) -> Self {
        let product = match (
            row.product_title,
            row.product_price,
            row.product_quantity,
            row.product_status,
            row.product_farmer_id,
        ) {
            (Some(title), Some(price), Some(quantity), Some(status), Some(farmer_id)) => {
                Some(ProductSnapshot {
                    id: row.product_id,
                    farmer_id,
                    title,
                    price,
                    quantity,
                    status,
                    order_count: row.product_order_count.unwrap_or(0),
                })
            }
            _ => None,
        };

        CartLineSnapshot {
            item: CartItem {
                id: row.id,
                buyer_id: row.buyer_id,
                product_id: row.product_id,
                quantity: row.quantity,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            product,
        }
    }
}
