mod command;
mod query;

pub use self::command::OrderCommandService;
pub use self::query::OrderQueryService;

use crate::{abstract_trait::order::repository::DynOrderQueryRepository, model::order::Order};
use shared::{
    domain::{Identity, Role},
    errors::ServiceError,
};
use uuid::Uuid;

/// Loads an order the caller is allowed to see.
async fn find_visible_order(
    query: &DynOrderQueryRepository,
    identity: Identity,
    order_id: Uuid,
) -> Result<Order, ServiceError> {
    let order = query
        .find_by_id(order_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Order not found".into()))?;

    match identity.role {
        Role::Admin => {}
        Role::Buyer => {
            if order.buyer_id != identity.user_id {
                return Err(ServiceError::Forbidden(
                    "Access denied. You can only view your own orders.".into(),
                ));
            }
        }
        Role::Farmer => {
            if !query
                .contains_farmer_product(order.id, identity.user_id)
                .await?
            {
                return Err(ServiceError::Forbidden(
                    "Access denied. This order does not contain your products.".into(),
                ));
            }
        }
    }

    Ok(order)
}
