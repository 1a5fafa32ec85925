use crate::model::order::PaymentMethod;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate(custom(function = "not_blank", message = "Delivery address is required"))]
    pub delivery_address: String,

    pub payment_method: PaymentMethod,

    #[validate(length(max = 1000))]
    #[serde(default)]
    pub notes: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_address_is_rejected() {
        let req = CheckoutRequest {
            delivery_address: "   ".into(),
            payment_method: PaymentMethod::Gcash,
            notes: None,
        };
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("delivery_address"));
    }

    #[test]
    fn unknown_payment_method_does_not_deserialize() {
        let raw = r#"{"delivery_address":"Purok 4","payment_method":"crypto"}"#;
        assert!(serde_json::from_str::<CheckoutRequest>(raw).is_err());
    }

    #[test]
    fn notes_are_optional() {
        let raw = r#"{"delivery_address":"Purok 4","payment_method":"bank_transfer"}"#;
        let req: CheckoutRequest = serde_json::from_str(raw).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.notes, None);
    }
}
