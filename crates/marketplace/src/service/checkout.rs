use crate::{
    abstract_trait::{
        cart::DynCartRepository,
        checkout::CheckoutServiceTrait,
        order::repository::DynOrderCommandRepository,
        order_item::DynOrderItemCommandRepository,
        product::DynProductRepository,
        stats::{DynBuyerStatsRepository, DynProducerStatsRepository},
    },
    domain::{
        requests::{
            checkout::CheckoutRequest,
            order::{CreateOrderItemRecordRequest, CreateOrderRecordRequest},
            validation_messages,
        },
        response::{
            checkout::{
                CartConflict, CheckoutResponse, CheckoutSummary, FailedLine, FailureStage,
                PartialOrder,
            },
            order::OrderItemResponse,
        },
    },
    errors::CheckoutError,
    model::{cart::CartLineSnapshot, order::Order, product::ProductStatus},
};
use async_trait::async_trait;
use chrono::Utc;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use rust_decimal::Decimal;
use shared::{
    domain::ApiResponse,
    errors::RepositoryError,
    utils::{Method, Metrics, OperationTracer, generate_random_string},
};
use std::{collections::BTreeMap, future::Future, sync::Arc};
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

const ORDER_NUMBER_ATTEMPTS: usize = 3;

/// A cart line that passed validation, priced from the cart snapshot.
#[derive(Debug, Clone, PartialEq)]
struct PlannedLine {
    product_id: Uuid,
    farmer_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    subtotal: Decimal,
}

fn plan_lines(lines: &[CartLineSnapshot]) -> Result<Vec<PlannedLine>, Vec<CartConflict>> {
    let mut planned = Vec::with_capacity(lines.len());
    let mut conflicts = Vec::new();

    for line in lines {
        let product_id = line.item.product_id;
        let requested = line.item.quantity;

        let product = match &line.product {
            Some(product) if product.status == ProductStatus::Available => product,
            _ => {
                conflicts.push(CartConflict::unavailable(product_id));
                continue;
            }
        };

        if requested > product.quantity {
            conflicts.push(CartConflict::insufficient_stock(
                product_id,
                product.title.clone(),
                requested,
                product.quantity,
            ));
            continue;
        }

        planned.push(PlannedLine {
            product_id,
            farmer_id: product.farmer_id,
            quantity: requested,
            unit_price: product.price,
            subtotal: (product.price * Decimal::from(requested)).round_dp(2),
        });
    }

    if conflicts.is_empty() {
        Ok(planned)
    } else {
        Err(conflicts)
    }
}

pub fn new_order_number() -> String {
    format!(
        "ORD-{}-{}",
        Utc::now().timestamp_millis(),
        generate_random_string(5)
    )
}

/// Logs and swallows a failed follow-up write.
async fn best_effort<T, F>(step: &str, write: F)
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    if let Err(err) = write.await {
        warn!("⚠️ Best-effort step '{step}' failed: {err}");
    }
}

#[derive(Clone)]
pub struct CheckoutService {
    cart: DynCartRepository,
    products: DynProductRepository,
    order_command: DynOrderCommandRepository,
    order_item_command: DynOrderItemCommandRepository,
    buyer_stats: DynBuyerStatsRepository,
    producer_stats: DynProducerStatsRepository,
    tracer: OperationTracer,
}

pub struct CheckoutServiceDeps {
    pub cart: DynCartRepository,
    pub products: DynProductRepository,
    pub order_command: DynOrderCommandRepository,
    pub order_item_command: DynOrderItemCommandRepository,
    pub buyer_stats: DynBuyerStatsRepository,
    pub producer_stats: DynProducerStatsRepository,
}

impl CheckoutService {
    pub fn new(deps: CheckoutServiceDeps, registry: &mut Registry) -> Self {
        let CheckoutServiceDeps {
            cart,
            products,
            order_command,
            order_item_command,
            buyer_stats,
            producer_stats,
        } = deps;

        let metrics = Arc::new(Metrics::new());
        metrics.register(registry, "checkout_service", "CheckoutService");

        Self {
            cart,
            products,
            order_command,
            order_item_command,
            buyer_stats,
            producer_stats,
            tracer: OperationTracer::new("checkout-service", metrics),
        }
    }

    async fn create_order_header(
        &self,
        buyer_id: Uuid,
        req: &CheckoutRequest,
        total_amount: Decimal,
    ) -> Result<Order, RepositoryError> {
        let mut attempt = 1;

        loop {
            let record = CreateOrderRecordRequest {
                buyer_id,
                order_number: new_order_number(),
                total_amount,
                delivery_address: req.delivery_address.trim().to_string(),
                payment_method: req.payment_method,
                notes: req.notes.clone().filter(|n| !n.trim().is_empty()),
            };

            match self.order_command.create_order(&record).await {
                Err(RepositoryError::AlreadyExists(msg)) if attempt < ORDER_NUMBER_ATTEMPTS => {
                    warn!(
                        "🔁 Order number {} already taken ({msg}), retrying",
                        record.order_number
                    );
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Writes each line and takes its stock. Stops at the first failure and
    /// reports it together with every line that was not attempted.
    async fn write_lines(
        &self,
        order: &Order,
        plan: &[PlannedLine],
    ) -> Result<Vec<OrderItemResponse>, PartialOrder> {
        let mut written = Vec::with_capacity(plan.len());

        for (idx, line) in plan.iter().enumerate() {
            let failure = match self.write_line(order.id, line).await {
                Ok(item) => {
                    written.push(item);
                    continue;
                }
                Err(failure) => failure,
            };

            error!(
                "❌ Order {} stopped at product {}: {}",
                order.order_number, line.product_id, failure.reason
            );

            let mut failed_lines = vec![failure];
            failed_lines.extend(plan[idx + 1..].iter().map(|rest| FailedLine {
                product_id: rest.product_id,
                quantity: rest.quantity,
                stage: FailureStage::NotAttempted,
                reason: "not attempted after an earlier line failed".into(),
                orphan_line_id: None,
            }));

            return Err(PartialOrder {
                order_id: order.id,
                order_number: order.order_number.clone(),
                succeeded_lines: written,
                failed_lines,
            });
        }

        Ok(written)
    }

    async fn write_line(
        &self,
        order_id: Uuid,
        line: &PlannedLine,
    ) -> Result<OrderItemResponse, FailedLine> {
        let failed = |stage, reason: String, orphan_line_id| FailedLine {
            product_id: line.product_id,
            quantity: line.quantity,
            stage,
            reason,
            orphan_line_id,
        };

        let item = self
            .order_item_command
            .create_order_item(&CreateOrderItemRecordRequest {
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
                subtotal: line.subtotal,
            })
            .await
            .map_err(|err| failed(FailureStage::LineInsert, err.to_string(), None))?;

        let reason = match self
            .products
            .conditional_decrement(line.product_id, line.quantity)
            .await
        {
            Ok(decrement) if decrement.ok => return Ok(item.into()),
            Ok(_) => "insufficient stock at purchase time".to_string(),
            Err(err) => err.to_string(),
        };

        // The line must not outlive the stock it failed to take.
        let orphan = match self.order_item_command.delete_order_item(item.id).await {
            Ok(()) => None,
            Err(err) => {
                error!("❌ Could not remove order line {}: {err}", item.id);
                Some(item.id)
            }
        };

        Err(failed(FailureStage::StockDecrement, reason, orphan))
    }

    async fn run(
        &self,
        buyer_id: Uuid,
        req: &CheckoutRequest,
    ) -> Result<CheckoutResponse, CheckoutError> {
        req.validate()
            .map_err(|errors| CheckoutError::Validation(validation_messages(&errors)))?;

        let lines = self.cart.find_with_products(buyer_id).await?;
        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let plan = plan_lines(&lines).map_err(|conflicts| {
            warn!(
                "🚫 Checkout for buyer {buyer_id} blocked by {} cart conflicts",
                conflicts.len()
            );
            CheckoutError::CartConflict { conflicts }
        })?;
        if plan.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let total_amount = plan
            .iter()
            .map(|line| line.subtotal)
            .sum::<Decimal>()
            .round_dp(2);

        let order = self
            .create_order_header(buyer_id, req, total_amount)
            .await?;

        let order_items = self
            .write_lines(&order, &plan)
            .await
            .map_err(|partial| CheckoutError::PartialOrder(Box::new(partial)))?;

        best_effort("clear cart", self.cart.clear(buyer_id)).await;

        best_effort(
            "buyer stats",
            self.buyer_stats
                .apply_order(buyer_id, total_amount, &order.delivery_address),
        )
        .await;

        let mut sales: BTreeMap<Uuid, Decimal> = BTreeMap::new();
        for line in &plan {
            *sales.entry(line.farmer_id).or_default() += line.subtotal;
        }
        for (farmer_id, amount) in sales {
            best_effort(
                "producer stats",
                self.producer_stats.apply_sales(farmer_id, amount),
            )
            .await;
        }

        let summary = CheckoutSummary {
            item_count: order_items.len(),
            total_amount,
            order_number: order.order_number.clone(),
        };

        Ok(CheckoutResponse {
            order: order.into(),
            order_items,
            summary,
        })
    }
}

#[async_trait]
impl CheckoutServiceTrait for CheckoutService {
    async fn place_order(
        &self,
        buyer_id: Uuid,
        req: &CheckoutRequest,
    ) -> Result<ApiResponse<CheckoutResponse>, CheckoutError> {
        info!("🛒 Checkout started for buyer {buyer_id}");

        let tracing_ctx = self.tracer.start(
            "place_order",
            Method::Post,
            vec![
                KeyValue::new("component", "checkout"),
                KeyValue::new("buyer.id", buyer_id.to_string()),
            ],
        );

        match self.run(buyer_id, req).await {
            Ok(response) => {
                self.tracer.complete_success(
                    &tracing_ctx,
                    &format!("Order {} created", response.summary.order_number),
                );
                Ok(ApiResponse::success("Order created successfully", response))
            }
            Err(err) => {
                self.tracer.complete_error(&tracing_ctx, &err.to_string());
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::order::{OrderStatus, PaymentMethod},
        repository::memory::{Faults, InMemoryStore, StoreWrite},
    };
    use tokio::sync::Barrier;

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn service(store: &InMemoryStore) -> CheckoutService {
        let mut registry = Registry::default();
        CheckoutService::new(
            CheckoutServiceDeps {
                cart: Arc::new(store.clone()),
                products: Arc::new(store.clone()),
                order_command: Arc::new(store.clone()),
                order_item_command: Arc::new(store.clone()),
                buyer_stats: Arc::new(store.clone()),
                producer_stats: Arc::new(store.clone()),
            },
            &mut registry,
        )
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            delivery_address: "12 Mabini St, Davao".into(),
            payment_method: PaymentMethod::CashOnDelivery,
            notes: None,
        }
    }

    struct Fixture {
        store: InMemoryStore,
        buyer: Uuid,
        farmer: Uuid,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let buyer = Uuid::new_v4();
        let farmer = Uuid::new_v4();
        store.seed_buyer(buyer);
        store.seed_farmer(farmer);
        Fixture {
            store,
            buyer,
            farmer,
        }
    }

    #[tokio::test]
    async fn two_line_cart_is_placed_in_full() {
        let Fixture {
            store,
            buyer,
            farmer,
        } = fixture();
        let a = store.seed_product(farmer, "Tomatoes", money(1000), 5);
        let b = store.seed_product(farmer, "Onions", money(500), 5);
        store.seed_cart_item(buyer, a, 2);
        store.seed_cart_item(buyer, b, 3);

        let response = service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap();
        let data = response.data;

        assert_eq!(response.status, "success");
        assert_eq!(data.summary.total_amount, money(3500));
        assert_eq!(data.summary.item_count, 2);
        assert_eq!(data.order.total_amount, money(3500));
        assert_eq!(data.order.status, OrderStatus::Pending);
        assert_eq!(
            data.order_items.iter().map(|i| i.subtotal).sum::<Decimal>(),
            data.order.total_amount
        );

        assert_eq!(store.product(a).unwrap().quantity, 3);
        assert_eq!(store.product(b).unwrap().quantity, 2);
        assert!(store.cart_items(buyer).is_empty());

        let stats = store.buyer_stats(buyer).unwrap();
        assert_eq!(stats.total_orders, 1);
        assert_eq!(stats.total_spent, money(3500));
        assert_eq!(stats.delivery_address.as_deref(), Some("12 Mabini St, Davao"));
        assert_eq!(store.farmer_sales(farmer), Some(money(3500)));
    }

    #[tokio::test]
    async fn producer_sales_are_split_per_farmer() {
        let Fixture {
            store,
            buyer,
            farmer,
        } = fixture();
        let other = Uuid::new_v4();
        store.seed_farmer(other);
        let a = store.seed_product(farmer, "Garlic", money(1250), 10);
        let b = store.seed_product(other, "Ginger", money(333), 10);
        store.seed_cart_item(buyer, a, 2);
        store.seed_cart_item(buyer, b, 3);

        let response = service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap();

        assert_eq!(response.data.summary.total_amount, money(3499));
        assert_eq!(store.farmer_sales(farmer), Some(money(2500)));
        assert_eq!(store.farmer_sales(other), Some(money(999)));
    }

    #[tokio::test]
    async fn buying_the_last_units_marks_product_out_of_stock() {
        let Fixture {
            store,
            buyer,
            farmer,
        } = fixture();
        let a = store.seed_product(farmer, "Honey", money(42000), 2);
        store.seed_cart_item(buyer, a, 2);

        service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap();

        let product = store.product(a).unwrap();
        assert_eq!(product.quantity, 0);
        assert_eq!(product.status, ProductStatus::OutOfStock);
        assert_eq!(product.order_count, 1);
    }

    #[tokio::test]
    async fn insufficient_stock_is_a_conflict_without_side_effects() {
        let Fixture {
            store,
            buyer,
            farmer,
        } = fixture();
        let c = store.seed_product(farmer, "Mangoes", money(1500), 3);
        store.seed_cart_item(buyer, c, 10);

        let err = service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap_err();

        let CheckoutError::CartConflict { conflicts } = err else {
            panic!("expected a cart conflict, got {err:?}");
        };
        assert_eq!(
            conflicts,
            vec![CartConflict::insufficient_stock(c, "Mangoes", 10, 3)]
        );
        assert!(store.orders().is_empty());
        assert_eq!(store.product(c).unwrap().quantity, 3);
        assert_eq!(store.cart_items(buyer).len(), 1);
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn every_unavailable_line_is_reported() {
        let Fixture {
            store,
            buyer,
            farmer,
        } = fixture();
        let ok = store.seed_product(farmer, "Squash", money(900), 10);
        let gone = store.seed_product(farmer, "Okra", money(700), 10);
        let stopped = store.seed_product(farmer, "Bitter gourd", money(800), 10);
        store.seed_cart_item(buyer, ok, 1);
        store.seed_cart_item(buyer, gone, 1);
        store.seed_cart_item(buyer, stopped, 1);
        store.remove_product(gone);
        store.set_product_status(stopped, ProductStatus::Discontinued);

        let err = service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap_err();

        let CheckoutError::CartConflict { conflicts } = err else {
            panic!("expected a cart conflict, got {err:?}");
        };
        assert_eq!(
            conflicts,
            vec![
                CartConflict::unavailable(gone),
                CartConflict::unavailable(stopped)
            ]
        );
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn empty_cart_touches_nothing() {
        let Fixture { store, buyer, .. } = fixture();

        let err = service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::EmptyCart));
        assert!(store.writes().is_empty());
        assert_eq!(store.buyer_stats(buyer).unwrap().total_orders, 0);
    }

    #[tokio::test]
    async fn blank_address_fails_validation_before_reading_the_cart() {
        let Fixture { store, buyer, .. } = fixture();
        store.faults(|f| f.cart_load = true);

        let req = CheckoutRequest {
            delivery_address: "  ".into(),
            ..request()
        };
        let err = service(&store).place_order(buyer, &req).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Validation(ref msgs) if msgs.len() == 1));
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn failed_second_decrement_leaves_a_partial_order() {
        let Fixture {
            store,
            buyer,
            farmer,
        } = fixture();
        let a = store.seed_product(farmer, "Tomatoes", money(1000), 5);
        let b = store.seed_product(farmer, "Onions", money(500), 5);
        store.seed_cart_item(buyer, a, 2);
        store.seed_cart_item(buyer, b, 3);
        store.faults(|f| {
            f.decrement_for.insert(b);
        });

        let err = service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap_err();

        let CheckoutError::PartialOrder(partial) = err else {
            panic!("expected a partial order, got {err:?}");
        };
        assert_eq!(partial.succeeded_lines.len(), 1);
        assert_eq!(partial.succeeded_lines[0].product_id, a);
        assert_eq!(partial.failed_lines.len(), 1);
        assert_eq!(partial.failed_lines[0].product_id, b);
        assert_eq!(partial.failed_lines[0].stage, FailureStage::StockDecrement);
        assert_eq!(partial.failed_lines[0].orphan_line_id, None);

        let orders = store.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, partial.order_id);
        assert_eq!(orders[0].status, OrderStatus::Pending);

        let lines = store.order_items(partial.order_id);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, a);

        assert_eq!(store.cart_items(buyer).len(), 2);
        assert_eq!(store.product(a).unwrap().quantity, 3);
        assert_eq!(store.product(b).unwrap().quantity, 5);
        assert_eq!(store.buyer_stats(buyer).unwrap().total_orders, 0);
        assert_eq!(store.farmer_sales(farmer), Some(Decimal::ZERO));
        assert!(
            !store
                .writes()
                .iter()
                .any(|w| matches!(w, StoreWrite::ClearCart(_)))
        );
    }

    #[tokio::test]
    async fn lines_after_the_failure_are_not_attempted() {
        let Fixture {
            store,
            buyer,
            farmer,
        } = fixture();
        let a = store.seed_product(farmer, "Rice", money(5000), 5);
        let b = store.seed_product(farmer, "Beans", money(1200), 5);
        let c = store.seed_product(farmer, "Peanuts", money(900), 5);
        for product in [a, b, c] {
            store.seed_cart_item(buyer, product, 1);
        }
        store.faults(|f| {
            f.create_item_for.insert(b);
        });

        let err = service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap_err();

        let CheckoutError::PartialOrder(partial) = err else {
            panic!("expected a partial order, got {err:?}");
        };
        let stages: Vec<_> = partial
            .failed_lines
            .iter()
            .map(|line| (line.product_id, line.stage))
            .collect();
        assert_eq!(
            stages,
            vec![
                (b, FailureStage::LineInsert),
                (c, FailureStage::NotAttempted)
            ]
        );
        assert_eq!(store.product(c).unwrap().quantity, 5);
        assert_eq!(store.order_items(partial.order_id).len(), 1);
    }

    #[tokio::test]
    async fn failed_compensation_reports_the_orphan_line() {
        let Fixture {
            store,
            buyer,
            farmer,
        } = fixture();
        let a = store.seed_product(farmer, "Cacao", money(2000), 5);
        store.seed_cart_item(buyer, a, 1);
        store.faults(|f| {
            f.decrement_for.insert(a);
            f.delete_item = true;
        });

        let err = service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap_err();

        let CheckoutError::PartialOrder(partial) = err else {
            panic!("expected a partial order, got {err:?}");
        };
        let lines = store.order_items(partial.order_id);
        assert_eq!(lines.len(), 1);
        assert_eq!(partial.failed_lines[0].orphan_line_id, Some(lines[0].id));
        assert!(partial.succeeded_lines.is_empty());
    }

    #[tokio::test]
    async fn cart_is_cleared_only_after_every_line_is_written() {
        let Fixture {
            store,
            buyer,
            farmer,
        } = fixture();
        let a = store.seed_product(farmer, "Calamansi", money(150), 20);
        let b = store.seed_product(farmer, "Pechay", money(250), 20);
        store.seed_cart_item(buyer, a, 4);
        store.seed_cart_item(buyer, b, 2);

        service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap();

        let writes = store.writes();
        let clear_at = writes
            .iter()
            .position(|w| matches!(w, StoreWrite::ClearCart(_)))
            .unwrap();
        let last_order_write = writes
            .iter()
            .rposition(|w| {
                matches!(
                    w,
                    StoreWrite::CreateOrder(_)
                        | StoreWrite::CreateOrderItem(_)
                        | StoreWrite::DecrementStock(_)
                )
            })
            .unwrap();
        assert!(matches!(writes[0], StoreWrite::CreateOrder(_)));
        assert!(clear_at > last_order_write);
    }

    #[tokio::test]
    async fn best_effort_failures_do_not_fail_checkout() {
        let Fixture {
            store,
            buyer,
            farmer,
        } = fixture();
        let a = store.seed_product(farmer, "Coffee", money(30000), 5);
        store.seed_cart_item(buyer, a, 1);
        store.faults(|f| {
            f.clear_cart = true;
            f.buyer_stats = true;
            f.producer_stats = true;
        });

        let response = service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap();

        assert_eq!(response.data.summary.total_amount, money(30000));
        assert_eq!(store.product(a).unwrap().quantity, 4);
        assert_eq!(store.cart_items(buyer).len(), 1);
        assert_eq!(store.buyer_stats(buyer).unwrap().total_orders, 0);
    }

    #[tokio::test]
    async fn header_failure_is_a_store_error() {
        let Fixture {
            store,
            buyer,
            farmer,
        } = fixture();
        let a = store.seed_product(farmer, "Banana", money(600), 5);
        store.seed_cart_item(buyer, a, 1);
        store.faults(|f| f.create_order = true);

        let err = service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::Store(_)));
        assert!(store.writes().is_empty());
        assert_eq!(store.product(a).unwrap().quantity, 5);
    }

    #[tokio::test]
    async fn order_number_collisions_are_retried() {
        let Fixture {
            store,
            buyer,
            farmer,
        } = fixture();
        let a = store.seed_product(farmer, "Papaya", money(400), 5);
        store.seed_cart_item(buyer, a, 1);
        store.faults(|f| f.duplicate_order_numbers = 2);

        let response = service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap();
        assert_eq!(store.orders().len(), 1);
        assert_eq!(response.data.order.order_number, store.orders()[0].order_number);

        store.seed_cart_item(buyer, a, 1);
        store.faults(|f: &mut Faults| f.duplicate_order_numbers = ORDER_NUMBER_ATTEMPTS);
        let err = service(&store)
            .place_order(buyer, &request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Store(RepositoryError::AlreadyExists(_))
        ));
    }

    #[test]
    fn order_numbers_are_url_safe() {
        let number = new_order_number();
        let parts: Vec<&str> = number.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 5);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_checkouts_never_oversell() {
        let store = InMemoryStore::new();
        let farmer = Uuid::new_v4();
        store.seed_farmer(farmer);
        let product = store.seed_product(farmer, "Durian", money(25000), 5);

        let buyers = [Uuid::new_v4(), Uuid::new_v4()];
        for buyer in buyers {
            store.seed_buyer(buyer);
            store.seed_cart_item(buyer, product, 3);
        }
        store.hold_order_creation(Arc::new(Barrier::new(2)));

        let checkout = service(&store);
        let handles: Vec<_> = buyers
            .into_iter()
            .map(|buyer| {
                let checkout = checkout.clone();
                tokio::spawn(async move { checkout.place_order(buyer, &request()).await })
            })
            .collect();

        let mut placed = 0;
        let mut partial = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => placed += 1,
                Err(CheckoutError::PartialOrder(p)) => {
                    assert!(p.succeeded_lines.is_empty());
                    assert_eq!(p.failed_lines[0].stage, FailureStage::StockDecrement);
                    partial += 1;
                }
                Err(other) => panic!("unexpected checkout error: {other:?}"),
            }
        }

        assert_eq!((placed, partial), (1, 1));
        let left = store.product(product).unwrap();
        assert_eq!(left.quantity, 2);
        assert!(left.quantity >= 0);
    }

    #[test]
    fn planning_prices_lines_from_the_snapshot() {
        let store = InMemoryStore::new();
        let buyer = Uuid::new_v4();
        let farmer = Uuid::new_v4();
        let product = store.seed_product(farmer, "Cabbage", money(1999), 10);
        store.seed_cart_item(buyer, product, 3);

        let lines: Vec<CartLineSnapshot> = store
            .cart_items(buyer)
            .into_iter()
            .map(|item| CartLineSnapshot {
                product: store.product(item.product_id),
                item,
            })
            .collect();

        let plan = plan_lines(&lines).unwrap();
        assert_eq!(
            plan,
            vec![PlannedLine {
                product_id: product,
                farmer_id: farmer,
                quantity: 3,
                unit_price: money(1999),
                subtotal: money(5997),
            }]
        );
    }
}
