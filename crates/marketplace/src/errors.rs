use crate::domain::response::checkout::{CartConflict, PartialOrder};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use shared::errors::RepositoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Some items in your cart are no longer available")]
    CartConflict { conflicts: Vec<CartConflict> },

    #[error("Order {} was only partially placed", .0.order_number)]
    PartialOrder(Box<PartialOrder>),

    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),
}

impl IntoResponse for CheckoutError {
    fn into_response(self) -> Response {
        let message = self.to_string();

        let (status, body) = match self {
            CheckoutError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "status": "fail", "message": "Validation failed", "errors": errors }),
            ),
            CheckoutError::EmptyCart => (
                StatusCode::BAD_REQUEST,
                json!({ "status": "fail", "message": message }),
            ),
            CheckoutError::CartConflict { conflicts } => (
                StatusCode::BAD_REQUEST,
                json!({
                    "status": "fail",
                    "message": message,
                    "unavailable_items": conflicts,
                }),
            ),
            CheckoutError::PartialOrder(partial) => (
                StatusCode::MULTI_STATUS,
                json!({
                    "status": "partial",
                    "message": message,
                    "data": partial,
                }),
            ),
            CheckoutError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "status": "error", "message": "Error creating order" }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn conflicts_map_to_400() {
        let err = CheckoutError::CartConflict {
            conflicts: vec![CartConflict::unavailable(Uuid::nil())],
        };
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn partial_orders_map_to_207() {
        let err = CheckoutError::PartialOrder(Box::new(PartialOrder {
            order_id: Uuid::nil(),
            order_number: "ORD-1-ABCDE".into(),
            succeeded_lines: vec![],
            failed_lines: vec![],
        }));
        assert_eq!(err.to_string(), "Order ORD-1-ABCDE was only partially placed");
        assert_eq!(err.into_response().status(), StatusCode::MULTI_STATUS);
    }

    #[test]
    fn store_errors_hide_details() {
        let err = CheckoutError::Store(RepositoryError::Custom("connection reset".into()));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
