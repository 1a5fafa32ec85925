use super::find_visible_order;
use crate::{
    abstract_trait::{
        order::{repository::DynOrderQueryRepository, service::OrderQueryServiceTrait},
        order_item::DynOrderItemQueryRepository,
    },
    domain::{
        requests::{
            order::{FindAllOrder, FindOrdersRecordRequest, OrderScope},
            validation_messages,
        },
        response::order::{OrderDetailResponse, OrderResponse, OrderStatsResponse},
    },
    model::order::{OrderAmountRow, OrderStatus},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    domain::{ApiResponse, ApiResponsePagination, Identity, Pagination, Role},
    errors::ServiceError,
    utils::{Method, Metrics, OperationTracer},
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

fn scope_for(identity: Identity) -> OrderScope {
    match identity.role {
        Role::Buyer => OrderScope::Buyer(identity.user_id),
        Role::Farmer => OrderScope::Farmer(identity.user_id),
        Role::Admin => OrderScope::All,
    }
}

fn summarize(rows: &[OrderAmountRow]) -> OrderStatsResponse {
    let mut stats = OrderStatsResponse {
        total_orders: rows.len() as i64,
        ..OrderStatsResponse::default()
    };

    for row in rows {
        stats.total_amount += row.amount;
        *stats
            .orders_by_status
            .entry(row.status.to_string())
            .or_default() += 1;

        match row.status {
            OrderStatus::Pending => stats.pending_orders += 1,
            OrderStatus::Delivered => stats.completed_orders += 1,
            OrderStatus::Cancelled => stats.cancelled_orders += 1,
            _ => stats.active_orders += 1,
        }
    }

    stats.total_amount = stats.total_amount.round_dp(2);
    stats
}

#[derive(Clone)]
pub struct OrderQueryService {
    query: DynOrderQueryRepository,
    items: DynOrderItemQueryRepository,
    tracer: OperationTracer,
}

impl OrderQueryService {
    pub fn new(
        query: DynOrderQueryRepository,
        items: DynOrderItemQueryRepository,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        metrics.register(registry, "order_query_service", "OrderQueryService");

        Self {
            query,
            items,
            tracer: OperationTracer::new("order-query-service", metrics),
        }
    }
}

#[async_trait]
impl OrderQueryServiceTrait for OrderQueryService {
    async fn find_all(
        &self,
        identity: Identity,
        req: &FindAllOrder,
    ) -> Result<ApiResponsePagination<Vec<OrderResponse>>, ServiceError> {
        let attributes = vec![
            KeyValue::new("component", "order"),
            KeyValue::new("user.role", identity.role.to_string()),
            KeyValue::new("page", req.page),
            KeyValue::new("limit", req.limit),
        ];

        self.tracer
            .trace("find_all_orders", Method::Get, attributes, async {
                req.validate()
                    .map_err(|errors| ServiceError::Validation(validation_messages(&errors)))?;

                let (orders, total) = self
                    .query
                    .find_all(&FindOrdersRecordRequest {
                        scope: scope_for(identity),
                        status: req.status,
                        limit: req.limit,
                        offset: Pagination::offset(req.page, req.limit),
                    })
                    .await?;

                Ok(ApiResponsePagination {
                    status: "success".into(),
                    message: "Orders fetched successfully".into(),
                    data: orders.into_iter().map(OrderResponse::from).collect(),
                    pagination: Pagination::new(req.page, req.limit, total),
                })
            })
            .await
    }

    async fn find_by_id(
        &self,
        identity: Identity,
        order_id: Uuid,
    ) -> Result<ApiResponse<OrderDetailResponse>, ServiceError> {
        let attributes = vec![
            KeyValue::new("component", "order"),
            KeyValue::new("order.id", order_id.to_string()),
        ];

        self.tracer
            .trace("find_order_by_id", Method::Get, attributes, async {
                let order = find_visible_order(&self.query, identity, order_id).await?;
                let items = self.items.find_by_order(order.id).await?;

                Ok(ApiResponse::success(
                    "Order fetched successfully",
                    OrderDetailResponse {
                        order: order.into(),
                        order_items: items.into_iter().map(Into::into).collect(),
                    },
                ))
            })
            .await
    }

    async fn stats(
        &self,
        identity: Identity,
    ) -> Result<ApiResponse<OrderStatsResponse>, ServiceError> {
        let attributes = vec![
            KeyValue::new("component", "order"),
            KeyValue::new("user.role", identity.role.to_string()),
        ];

        self.tracer
            .trace("order_stats", Method::Get, attributes, async {
                let rows = self.query.find_amounts(scope_for(identity)).await?;
                Ok(ApiResponse::success(
                    "Order statistics fetched successfully",
                    summarize(&rows),
                ))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        abstract_trait::{
            order::repository::OrderCommandRepositoryTrait,
            order_item::OrderItemCommandRepositoryTrait,
        },
        domain::requests::order::{CreateOrderItemRecordRequest, CreateOrderRecordRequest},
        model::order::PaymentMethod,
        repository::memory::InMemoryStore,
    };

    fn service(store: &InMemoryStore) -> OrderQueryService {
        OrderQueryService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            &mut Registry::default(),
        )
    }

    async fn place(store: &InMemoryStore, buyer: Uuid, product: Uuid, cents: i64) -> Uuid {
        let order = store
            .create_order(&CreateOrderRecordRequest {
                buyer_id: buyer,
                order_number: format!("ORD-{}", Uuid::new_v4()),
                total_amount: Decimal::new(cents, 2),
                delivery_address: "Poblacion".into(),
                payment_method: PaymentMethod::Paypal,
                notes: None,
            })
            .await
            .unwrap();
        store
            .create_order_item(&CreateOrderItemRecordRequest {
                order_id: order.id,
                product_id: product,
                quantity: 1,
                unit_price: Decimal::new(cents, 2),
                subtotal: Decimal::new(cents, 2),
            })
            .await
            .unwrap();
        order.id
    }

    #[tokio::test]
    async fn buyers_only_list_their_own_orders() {
        let store = InMemoryStore::new();
        let farmer = Uuid::new_v4();
        let product = store.seed_product(farmer, "Saba", Decimal::new(500, 2), 100);
        let buyer = Uuid::new_v4();
        for _ in 0..3 {
            place(&store, buyer, product, 500).await;
        }
        place(&store, Uuid::new_v4(), product, 500).await;

        let response = service(&store)
            .find_all(
                Identity::new(buyer, Role::Buyer),
                &FindAllOrder {
                    page: 1,
                    limit: 2,
                    status: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(response.data.len(), 2);
        assert_eq!(response.pagination.total, 3);
        assert_eq!(response.pagination.total_pages, 2);
        assert!(response.data.iter().all(|o| o.buyer_id == buyer));

        let admin = service(&store)
            .find_all(Identity::new(Uuid::new_v4(), Role::Admin), &FindAllOrder::default())
            .await
            .unwrap();
        assert_eq!(admin.pagination.total, 4);
    }

    #[tokio::test]
    async fn order_detail_is_guarded_per_role() {
        let store = InMemoryStore::new();
        let farmer = Uuid::new_v4();
        let product = store.seed_product(farmer, "Ube", Decimal::new(1500, 2), 10);
        let buyer = Uuid::new_v4();
        let order = place(&store, buyer, product, 1500).await;
        let orders = service(&store);

        let detail = orders
            .find_by_id(Identity::new(buyer, Role::Buyer), order)
            .await
            .unwrap();
        assert_eq!(detail.data.order_items.len(), 1);

        orders
            .find_by_id(Identity::new(farmer, Role::Farmer), order)
            .await
            .unwrap();

        let err = orders
            .find_by_id(Identity::new(Uuid::new_v4(), Role::Buyer), order)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = orders
            .find_by_id(Identity::new(Uuid::new_v4(), Role::Farmer), order)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = orders
            .find_by_id(Identity::new(buyer, Role::Buyer), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn stats_bucket_orders_by_status() {
        let rows = vec![
            OrderAmountRow {
                status: OrderStatus::Pending,
                amount: Decimal::new(1000, 2),
            },
            OrderAmountRow {
                status: OrderStatus::Preparing,
                amount: Decimal::new(2050, 2),
            },
            OrderAmountRow {
                status: OrderStatus::Delivered,
                amount: Decimal::new(500, 2),
            },
            OrderAmountRow {
                status: OrderStatus::Cancelled,
                amount: Decimal::new(125, 2),
            },
        ];

        let stats = summarize(&rows);

        assert_eq!(stats.total_orders, 4);
        assert_eq!(stats.total_amount, Decimal::new(3675, 2));
        assert_eq!(stats.pending_orders, 1);
        assert_eq!(stats.active_orders, 1);
        assert_eq!(stats.completed_orders, 1);
        assert_eq!(stats.cancelled_orders, 1);
        assert_eq!(stats.orders_by_status.get("preparing"), Some(&1));
    }

    #[tokio::test]
    async fn farmer_stats_count_only_their_revenue() {
        let store = InMemoryStore::new();
        let farmer = Uuid::new_v4();
        let mine = store.seed_product(farmer, "Adlai", Decimal::new(800, 2), 10);
        let other = store.seed_product(Uuid::new_v4(), "Sorghum", Decimal::new(900, 2), 10);
        let buyer = Uuid::new_v4();
        place(&store, buyer, mine, 800).await;
        place(&store, buyer, other, 900).await;

        let stats = service(&store)
            .stats(Identity::new(farmer, Role::Farmer))
            .await
            .unwrap();

        assert_eq!(stats.data.total_orders, 1);
        assert_eq!(stats.data.total_amount, Decimal::new(800, 2));
    }
}
