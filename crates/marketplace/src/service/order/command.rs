use super::find_visible_order;
use crate::{
    abstract_trait::order::{
        repository::{DynOrderCommandRepository, DynOrderQueryRepository},
        service::OrderCommandServiceTrait,
    },
    domain::{
        requests::order::{
            UpdateOrderStatusRecordRequest, UpdateOrderStatusRequest, UpdatePaymentStatusRequest,
        },
        response::order::OrderResponse,
    },
    model::order::OrderStatus,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::{ApiResponse, Identity, Role},
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, OperationTracer},
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderCommandService {
    command: DynOrderCommandRepository,
    query: DynOrderQueryRepository,
    tracer: OperationTracer,
}

impl OrderCommandService {
    pub fn new(
        command: DynOrderCommandRepository,
        query: DynOrderQueryRepository,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        metrics.register(registry, "order_command_service", "OrderCommandService");

        Self {
            command,
            query,
            tracer: OperationTracer::new("order-command-service", metrics),
        }
    }
}

#[async_trait]
impl OrderCommandServiceTrait for OrderCommandService {
    async fn update_status(
        &self,
        identity: Identity,
        order_id: Uuid,
        req: &UpdateOrderStatusRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let attributes = vec![
            KeyValue::new("component", "order"),
            KeyValue::new("order.id", order_id.to_string()),
            KeyValue::new("order.status", req.status.to_string()),
        ];

        self.tracer
            .trace("update_order_status", Method::Patch, attributes, async {
                let order = find_visible_order(&self.query, identity, order_id)
                    .await
                    .map_err(|err| match (identity.role, err) {
                        (Role::Farmer, ServiceError::Forbidden(_)) => ServiceError::Forbidden(
                            "Access denied. You can only update orders containing your products."
                                .into(),
                        ),
                        (Role::Buyer, ServiceError::Forbidden(_)) => ServiceError::Forbidden(
                            "Access denied. You can only update your own orders.".into(),
                        ),
                        (_, other) => other,
                    })?;

                if identity.is(Role::Buyer)
                    && (req.status != OrderStatus::Cancelled || order.status != OrderStatus::Pending)
                {
                    return Err(ServiceError::BadRequest(
                        "Buyers can only cancel pending orders".into(),
                    ));
                }

                if !order.status.can_transition_to(req.status) {
                    return Err(ServiceError::BadRequest(format!(
                        "Cannot move order from {} to {}",
                        order.status, req.status
                    )));
                }

                let updated = self
                    .command
                    .update_status(&UpdateOrderStatusRecordRequest {
                        order_id,
                        from: order.status,
                        status: req.status,
                    })
                    .await
                    .map_err(|err| match err {
                        RepositoryError::Conflict(msg) => ServiceError::BadRequest(msg),
                        other => ServiceError::Repo(other),
                    })?;

                info!(
                    "📦 {} {} moved order {} to {}",
                    identity.role, identity.user_id, updated.order_number, updated.status
                );

                let message = format!("Order status updated to {}", updated.status);
                Ok(ApiResponse::success(message, updated.into()))
            })
            .await
    }

    async fn update_payment_status(
        &self,
        order_id: Uuid,
        req: &UpdatePaymentStatusRequest,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let attributes = vec![
            KeyValue::new("component", "order"),
            KeyValue::new("order.id", order_id.to_string()),
        ];

        self.tracer
            .trace("update_payment_status", Method::Patch, attributes, async {
                let updated = self
                    .command
                    .update_payment_status(order_id, req.payment_status)
                    .await
                    .map_err(|err| match err {
                        RepositoryError::NotFound => {
                            ServiceError::NotFound("Order not found".into())
                        }
                        other => ServiceError::Repo(other),
                    })?;

                Ok(ApiResponse::success(
                    format!("Payment status updated to {}", updated.payment_status),
                    updated.into(),
                ))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::order::repository::OrderCommandRepositoryTrait,
        abstract_trait::order_item::OrderItemCommandRepositoryTrait,
        domain::requests::order::{CreateOrderItemRecordRequest, CreateOrderRecordRequest},
        model::order::{PaymentMethod, PaymentStatus},
        repository::memory::InMemoryStore,
    };
    use rust_decimal::Decimal;

    struct Fixture {
        store: InMemoryStore,
        service: OrderCommandService,
        buyer: Uuid,
        farmer: Uuid,
        order: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let buyer = Uuid::new_v4();
        let farmer = Uuid::new_v4();
        let product = store.seed_product(farmer, "Coconut", Decimal::new(3500, 2), 10);

        let order = store
            .create_order(&CreateOrderRecordRequest {
                buyer_id: buyer,
                order_number: "ORD-1700000000000-AB12C".into(),
                total_amount: Decimal::new(3500, 2),
                delivery_address: "Sitio Uno".into(),
                payment_method: PaymentMethod::BankTransfer,
                notes: None,
            })
            .await
            .unwrap();
        store
            .create_order_item(&CreateOrderItemRecordRequest {
                order_id: order.id,
                product_id: product,
                quantity: 1,
                unit_price: Decimal::new(3500, 2),
                subtotal: Decimal::new(3500, 2),
            })
            .await
            .unwrap();

        let service = OrderCommandService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            &mut Registry::default(),
        );

        Fixture {
            store,
            service,
            buyer,
            farmer,
            order: order.id,
        }
    }

    fn to(status: OrderStatus) -> UpdateOrderStatusRequest {
        UpdateOrderStatusRequest { status }
    }

    #[tokio::test]
    async fn farmer_walks_order_through_fulfilment() {
        let f = fixture().await;
        let farmer = Identity::new(f.farmer, Role::Farmer);

        for status in [
            OrderStatus::Confirmed,
            OrderStatus::Preparing,
            OrderStatus::ReadyForPickup,
            OrderStatus::OutForDelivery,
            OrderStatus::Delivered,
        ] {
            let response = f
                .service
                .update_status(farmer, f.order, &to(status))
                .await
                .unwrap();
            assert_eq!(response.data.status, status);
        }

        let order = f.store.orders().remove(0);
        assert!(order.confirmed_at.is_some());
        assert!(order.delivered_at.is_some());
        assert_eq!(order.payment_status, PaymentStatus::Completed);
    }

    #[tokio::test]
    async fn skipping_steps_is_rejected() {
        let f = fixture().await;
        let admin = Identity::new(Uuid::new_v4(), Role::Admin);

        let err = f
            .service
            .update_status(admin, f.order, &to(OrderStatus::Delivered))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::BadRequest(_)));
        assert_eq!(f.store.orders()[0].status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn buyer_may_only_cancel_a_pending_order() {
        let f = fixture().await;
        let buyer = Identity::new(f.buyer, Role::Buyer);

        let err = f
            .service
            .update_status(buyer, f.order, &to(OrderStatus::Confirmed))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        let cancelled = f
            .service
            .update_status(buyer, f.order, &to(OrderStatus::Cancelled))
            .await
            .unwrap();
        assert_eq!(cancelled.data.status, OrderStatus::Cancelled);
        assert!(cancelled.data.cancelled_at.is_some());

        let err = f
            .service
            .update_status(buyer, f.order, &to(OrderStatus::Cancelled))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn strangers_cannot_touch_the_order() {
        let f = fixture().await;

        let err = f
            .service
            .update_status(
                Identity::new(Uuid::new_v4(), Role::Farmer),
                f.order,
                &to(OrderStatus::Confirmed),
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, ServiceError::Forbidden(ref msg) if msg.contains("containing your products"))
        );

        let err = f
            .service
            .update_status(
                Identity::new(Uuid::new_v4(), Role::Buyer),
                f.order,
                &to(OrderStatus::Cancelled),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn payment_status_is_set_directly() {
        let f = fixture().await;

        let response = f
            .service
            .update_payment_status(
                f.order,
                &UpdatePaymentStatusRequest {
                    payment_status: PaymentStatus::Refunded,
                },
            )
            .await
            .unwrap();
        assert_eq!(response.message, "Payment status updated to refunded");
        assert_eq!(response.data.payment_status, PaymentStatus::Refunded);

        let err = f
            .service
            .update_payment_status(
                Uuid::new_v4(),
                &UpdatePaymentStatusRequest {
                    payment_status: PaymentStatus::Failed,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
