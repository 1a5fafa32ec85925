pub mod cart;
pub mod checkout;
pub mod order;

use validator::ValidationErrors;

/// Flattens validator output into `field: message` lines.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| match &error.message {
                Some(message) => format!("{field}: {message}"),
                None => match error.code.as_ref() {
                    "length" => format!("{field}: Invalid length"),
                    "range" => format!("{field}: Value out of range"),
                    _ => format!("{field}: Invalid {field}"),
                },
            })
        })
        .collect();

    messages.sort();
    messages
}
