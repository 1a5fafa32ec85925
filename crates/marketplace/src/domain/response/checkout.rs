use crate::domain::response::order::{OrderItemResponse, OrderResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutSummary {
    pub item_count: usize,
    pub total_amount: Decimal,
    pub order_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub order: OrderResponse,
    pub order_items: Vec<OrderItemResponse>,
    pub summary: CheckoutSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReason {
    ProductUnavailable,
    InsufficientStock,
}

/// A cart line that cannot be purchased as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CartConflict {
    pub product_id: Uuid,
    pub reason: ConflictReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<i32>,
}

impl CartConflict {
    pub fn unavailable(product_id: Uuid) -> Self {
        Self {
            product_id,
            reason: ConflictReason::ProductUnavailable,
            product_title: None,
            requested: None,
            available: None,
        }
    }

    pub fn insufficient_stock(
        product_id: Uuid,
        product_title: impl Into<String>,
        requested: i32,
        available: i32,
    ) -> Self {
        Self {
            product_id,
            reason: ConflictReason::InsufficientStock,
            product_title: Some(product_title.into()),
            requested: Some(requested),
            available: Some(available),
        }
    }
}

/// Where a line stopped during the write phase of checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    LineInsert,
    StockDecrement,
    NotAttempted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FailedLine {
    pub product_id: Uuid,
    pub quantity: i32,
    pub stage: FailureStage,
    pub reason: String,
    /// Set when the line row could not be removed after its stock decrement failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orphan_line_id: Option<Uuid>,
}

/// Recovery detail for an order whose header exists but whose lines were
/// only partly written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PartialOrder {
    pub order_id: Uuid,
    pub order_number: String,
    pub succeeded_lines: Vec<OrderItemResponse>,
    pub failed_lines: Vec<FailedLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unavailable_conflict_omits_stock_fields() {
        let id = Uuid::nil();
        let value = serde_json::to_value(CartConflict::unavailable(id)).unwrap();
        assert_eq!(
            value,
            json!({ "product_id": id, "reason": "product_unavailable" })
        );
    }

    #[test]
    fn insufficient_stock_conflict_carries_counts() {
        let value =
            serde_json::to_value(CartConflict::insufficient_stock(Uuid::nil(), "Mangoes", 10, 3))
                .unwrap();
        assert_eq!(value["reason"], "insufficient_stock");
        assert_eq!(value["product_title"], "Mangoes");
        assert_eq!(value["requested"], 10);
        assert_eq!(value["available"], 3);
    }
}
