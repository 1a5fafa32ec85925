use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Available,
    OutOfStock,
    Discontinued,
}

impl ProductStatus {
    /// Status that matches a stock level after a purchase.
    pub fn for_quantity(quantity: i32) -> Self {
        if quantity == 0 {
            ProductStatus::OutOfStock
        } else {
            ProductStatus::Available
        }
    }
}

/// The slice of a catalog product that cart and checkout read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ProductSnapshot {
    pub id: Uuid,
    pub farmer_id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub quantity: i32,
    pub status: ProductStatus,
    pub order_count: i32,
}

/// Outcome of a conditional stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDecrement {
    pub ok: bool,
    pub new_quantity: Option<i32>,
}

impl StockDecrement {
    pub fn applied(new_quantity: i32) -> Self {
        Self {
            ok: true,
            new_quantity: Some(new_quantity),
        }
    }

    pub fn rejected() -> Self {
        Self {
            ok: false,
            new_quantity: None,
        }
    }
}
