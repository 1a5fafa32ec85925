//! In-process implementation of every repository trait.
//!
//! Used by the test suites and for running the router without a database.
//! Every trait-level write is appended to a log so callers can assert on
//! ordering, and individual operations can be made to fail on demand.

use crate::{
    abstract_trait::{
        cart::CartRepositoryTrait,
        order::repository::{OrderCommandRepositoryTrait, OrderQueryRepositoryTrait},
        order_item::{OrderItemCommandRepositoryTrait, OrderItemQueryRepositoryTrait},
        product::ProductRepositoryTrait,
        stats::{BuyerStatsRepositoryTrait, ProducerStatsRepositoryTrait},
    },
    domain::requests::order::{
        CreateOrderItemRecordRequest, CreateOrderRecordRequest, FindOrdersRecordRequest,
        OrderScope, UpdateOrderStatusRecordRequest,
    },
    model::{
        cart::{CartItem, CartLineSnapshot},
        order::{Order, OrderAmountRow, OrderStatus, PaymentStatus},
        order_item::OrderItem,
        product::{ProductSnapshot, ProductStatus, StockDecrement},
    },
};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::errors::RepositoryError;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};
use tokio::sync::Barrier;
use uuid::Uuid;

/// A write that reached the store through one of the repository traits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    CreateCartItem(Uuid),
    UpdateCartItem(Uuid),
    DeleteCartItem(Uuid),
    ClearCart(Uuid),
    CreateOrder(Uuid),
    UpdateOrder(Uuid),
    CreateOrderItem(Uuid),
    DeleteOrderItem(Uuid),
    DecrementStock(Uuid),
    BuyerStats(Uuid),
    ProducerStats(Uuid),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuyerStats {
    pub total_spent: Decimal,
    pub total_orders: i32,
    pub delivery_address: Option<String>,
}

/// Operations to fail on purpose.
#[derive(Debug, Default)]
pub struct Faults {
    pub cart_load: bool,
    pub create_order: bool,
    /// Number of upcoming `create_order` calls rejected as duplicate order numbers.
    pub duplicate_order_numbers: usize,
    /// Number of upcoming `find_by_product` calls that miss an existing row.
    pub missed_cart_lookups: usize,
    pub create_item_for: HashSet<Uuid>,
    pub decrement_for: HashSet<Uuid>,
    pub delete_item: bool,
    pub clear_cart: bool,
    pub buyer_stats: bool,
    pub producer_stats: bool,
}

#[derive(Default)]
struct State {
    products: HashMap<Uuid, ProductSnapshot>,
    cart: Vec<CartItem>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    buyers: HashMap<Uuid, BuyerStats>,
    farmers: HashMap<Uuid, Decimal>,
    writes: Vec<StoreWrite>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    faults: Mutex<Faults>,
    order_barrier: Mutex<Option<Arc<Barrier>>>,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

fn injected(op: &str) -> RepositoryError {
    RepositoryError::Custom(format!("injected failure: {op}"))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_product(
        &self,
        farmer_id: Uuid,
        title: &str,
        price: Decimal,
        quantity: i32,
    ) -> Uuid {
        let product = ProductSnapshot {
            id: Uuid::new_v4(),
            farmer_id,
            title: title.to_string(),
            price,
            quantity,
            status: ProductStatus::for_quantity(quantity),
            order_count: 0,
        };
        let id = product.id;
        self.inner.state.lock().products.insert(id, product);
        id
    }

    pub fn set_product_status(&self, product_id: Uuid, status: ProductStatus) {
        if let Some(product) = self.inner.state.lock().products.get_mut(&product_id) {
            product.status = status;
        }
    }

    pub fn remove_product(&self, product_id: Uuid) {
        self.inner.state.lock().products.remove(&product_id);
    }

    pub fn seed_cart_item(&self, buyer_id: Uuid, product_id: Uuid, quantity: i32) -> Uuid {
        let now = Utc::now();
        let item = CartItem {
            id: Uuid::new_v4(),
            buyer_id,
            product_id,
            quantity,
            created_at: now,
            updated_at: now,
        };
        let id = item.id;
        self.inner.state.lock().cart.push(item);
        id
    }

    pub fn seed_buyer(&self, buyer_id: Uuid) {
        self.inner
            .state
            .lock()
            .buyers
            .insert(buyer_id, BuyerStats::default());
    }

    pub fn seed_farmer(&self, farmer_id: Uuid) {
        self.inner
            .state
            .lock()
            .farmers
            .insert(farmer_id, Decimal::ZERO);
    }

    pub fn product(&self, product_id: Uuid) -> Option<ProductSnapshot> {
        self.inner.state.lock().products.get(&product_id).cloned()
    }

    pub fn cart_items(&self, buyer_id: Uuid) -> Vec<CartItem> {
        self.inner
            .state
            .lock()
            .cart
            .iter()
            .filter(|item| item.buyer_id == buyer_id)
            .cloned()
            .collect()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.inner.state.lock().orders.clone()
    }

    pub fn order_items(&self, order_id: Uuid) -> Vec<OrderItem> {
        self.inner
            .state
            .lock()
            .order_items
            .iter()
            .filter(|item| item.order_id == order_id)
            .cloned()
            .collect()
    }

    pub fn buyer_stats(&self, buyer_id: Uuid) -> Option<BuyerStats> {
        self.inner.state.lock().buyers.get(&buyer_id).cloned()
    }

    pub fn farmer_sales(&self, farmer_id: Uuid) -> Option<Decimal> {
        self.inner.state.lock().farmers.get(&farmer_id).copied()
    }

    pub fn writes(&self) -> Vec<StoreWrite> {
        self.inner.state.lock().writes.clone()
    }

    pub fn faults(&self, configure: impl FnOnce(&mut Faults)) {
        configure(&mut self.inner.faults.lock());
    }

    /// Makes every `create_order` call wait on `barrier` first.
    pub fn hold_order_creation(&self, barrier: Arc<Barrier>) {
        *self.inner.order_barrier.lock() = Some(barrier);
    }

    fn snapshot_line(state: &State, item: &CartItem) -> CartLineSnapshot {
        CartLineSnapshot {
            item: item.clone(),
            product: state.products.get(&item.product_id).cloned(),
        }
    }
}

#[async_trait]
impl ProductRepositoryTrait for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductSnapshot>, RepositoryError> {
        Ok(self.product(id))
    }

    async fn conditional_decrement(
        &self,
        product_id: Uuid,
        amount: i32,
    ) -> Result<StockDecrement, RepositoryError> {
        if self.inner.faults.lock().decrement_for.contains(&product_id) {
            return Err(injected("conditional_decrement"));
        }

        let mut state = self.inner.state.lock();
        let Some(product) = state.products.get_mut(&product_id) else {
            return Ok(StockDecrement::rejected());
        };

        if amount <= 0 || product.status != ProductStatus::Available || product.quantity < amount {
            return Ok(StockDecrement::rejected());
        }

        product.quantity -= amount;
        product.status = ProductStatus::for_quantity(product.quantity);
        product.order_count += 1;
        let remaining = product.quantity;

        state.writes.push(StoreWrite::DecrementStock(product_id));
        Ok(StockDecrement::applied(remaining))
    }
}

#[async_trait]
impl CartRepositoryTrait for InMemoryStore {
    async fn find_with_products(
        &self,
        buyer_id: Uuid,
    ) -> Result<Vec<CartLineSnapshot>, RepositoryError> {
        if self.inner.faults.lock().cart_load {
            return Err(injected("find_with_products"));
        }

        let state = self.inner.state.lock();
        Ok(state
            .cart
            .iter()
            .filter(|item| item.buyer_id == buyer_id)
            .map(|item| Self::snapshot_line(&state, item))
            .collect())
    }

    async fn find_line(
        &self,
        buyer_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<CartLineSnapshot>, RepositoryError> {
        let state = self.inner.state.lock();
        Ok(state
            .cart
            .iter()
            .find(|item| item.id == item_id && item.buyer_id == buyer_id)
            .map(|item| Self::snapshot_line(&state, item)))
    }

    async fn find_by_product(
        &self,
        buyer_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartItem>, RepositoryError> {
        {
            let mut faults = self.inner.faults.lock();
            if faults.missed_cart_lookups > 0 {
                faults.missed_cart_lookups -= 1;
                return Ok(None);
            }
        }

        Ok(self
            .inner
            .state
            .lock()
            .cart
            .iter()
            .find(|item| item.buyer_id == buyer_id && item.product_id == product_id)
            .cloned())
    }

    async fn create_item(
        &self,
        buyer_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let mut state = self.inner.state.lock();

        if state
            .cart
            .iter()
            .any(|item| item.buyer_id == buyer_id && item.product_id == product_id)
        {
            return Err(RepositoryError::AlreadyExists(
                "cart item already exists".into(),
            ));
        }

        let now = Utc::now();
        let item = CartItem {
            id: Uuid::new_v4(),
            buyer_id,
            product_id,
            quantity,
            created_at: now,
            updated_at: now,
        };
        state.cart.push(item.clone());
        state.writes.push(StoreWrite::CreateCartItem(item.id));
        Ok(item)
    }

    async fn update_quantity(
        &self,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let mut state = self.inner.state.lock();
        let item = state
            .cart
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(RepositoryError::NotFound)?;

        item.quantity = quantity;
        item.updated_at = Utc::now();
        let updated = item.clone();

        state.writes.push(StoreWrite::UpdateCartItem(item_id));
        Ok(updated)
    }

    async fn delete_item(&self, buyer_id: Uuid, item_id: Uuid) -> Result<bool, RepositoryError> {
        let mut state = self.inner.state.lock();
        let before = state.cart.len();
        state
            .cart
            .retain(|item| !(item.id == item_id && item.buyer_id == buyer_id));

        let removed = state.cart.len() < before;
        if removed {
            state.writes.push(StoreWrite::DeleteCartItem(item_id));
        }
        Ok(removed)
    }

    async fn clear(&self, buyer_id: Uuid) -> Result<u64, RepositoryError> {
        if self.inner.faults.lock().clear_cart {
            return Err(injected("clear"));
        }

        let mut state = self.inner.state.lock();
        let before = state.cart.len();
        state.cart.retain(|item| item.buyer_id != buyer_id);
        let removed = (before - state.cart.len()) as u64;

        state.writes.push(StoreWrite::ClearCart(buyer_id));
        Ok(removed)
    }
}

#[async_trait]
impl OrderCommandRepositoryTrait for InMemoryStore {
    async fn create_order(&self, req: &CreateOrderRecordRequest) -> Result<Order, RepositoryError> {
        let barrier = self.inner.order_barrier.lock().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }

        {
            let mut faults = self.inner.faults.lock();
            if faults.create_order {
                return Err(injected("create_order"));
            }
            if faults.duplicate_order_numbers > 0 {
                faults.duplicate_order_numbers -= 1;
                return Err(RepositoryError::AlreadyExists(
                    "duplicate key value violates unique constraint \"orders_order_number_key\""
                        .into(),
                ));
            }
        }

        let mut state = self.inner.state.lock();
        if state
            .orders
            .iter()
            .any(|order| order.order_number == req.order_number)
        {
            return Err(RepositoryError::AlreadyExists(req.order_number.clone()));
        }

        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            buyer_id: req.buyer_id,
            order_number: req.order_number.clone(),
            total_amount: req.total_amount,
            delivery_address: req.delivery_address.clone(),
            payment_method: req.payment_method,
            payment_status: PaymentStatus::Pending,
            status: OrderStatus::Pending,
            notes: req.notes.clone(),
            created_at: now,
            updated_at: now,
            confirmed_at: None,
            delivered_at: None,
            cancelled_at: None,
        };

        state.orders.push(order.clone());
        state.writes.push(StoreWrite::CreateOrder(order.id));
        Ok(order)
    }

    async fn update_status(
        &self,
        req: &UpdateOrderStatusRecordRequest,
    ) -> Result<Order, RepositoryError> {
        let mut state = self.inner.state.lock();
        let order = state
            .orders
            .iter_mut()
            .find(|order| order.id == req.order_id)
            .ok_or(RepositoryError::NotFound)?;

        if order.status != req.from {
            return Err(RepositoryError::Conflict(format!(
                "Order {} is no longer {}",
                req.order_id, req.from
            )));
        }

        let now = Utc::now();
        order.status = req.status;
        order.updated_at = now;
        match req.status {
            OrderStatus::Confirmed => order.confirmed_at = Some(now),
            OrderStatus::Delivered => {
                order.delivered_at = Some(now);
                order.payment_status = PaymentStatus::Completed;
            }
            OrderStatus::Cancelled => order.cancelled_at = Some(now),
            _ => {}
        }
        let updated = order.clone();

        state.writes.push(StoreWrite::UpdateOrder(req.order_id));
        Ok(updated)
    }

    async fn update_payment_status(
        &self,
        order_id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<Order, RepositoryError> {
        let mut state = self.inner.state.lock();
        let order = state
            .orders
            .iter_mut()
            .find(|order| order.id == order_id)
            .ok_or(RepositoryError::NotFound)?;

        order.payment_status = payment_status;
        order.updated_at = Utc::now();
        let updated = order.clone();

        state.writes.push(StoreWrite::UpdateOrder(order_id));
        Ok(updated)
    }
}

fn farmer_has_line(state: &State, order_id: Uuid, farmer_id: Uuid) -> bool {
    state.order_items.iter().any(|item| {
        item.order_id == order_id
            && state
                .products
                .get(&item.product_id)
                .is_some_and(|p| p.farmer_id == farmer_id)
    })
}

fn visible(state: &State, order: &Order, scope: OrderScope) -> bool {
    match scope {
        OrderScope::Buyer(buyer_id) => order.buyer_id == buyer_id,
        OrderScope::Farmer(farmer_id) => farmer_has_line(state, order.id, farmer_id),
        OrderScope::All => true,
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for InMemoryStore {
    async fn find_all(
        &self,
        req: &FindOrdersRecordRequest,
    ) -> Result<(Vec<Order>, i64), RepositoryError> {
        let state = self.inner.state.lock();

        let mut matching: Vec<Order> = state
            .orders
            .iter()
            .filter(|order| visible(&state, order, req.scope))
            .filter(|order| req.status.is_none_or(|status| order.status == status))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(req.offset.max(0) as usize)
            .take(req.limit.max(0) as usize)
            .collect();

        Ok((page, total))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, RepositoryError> {
        Ok(self
            .inner
            .state
            .lock()
            .orders
            .iter()
            .find(|order| order.id == id)
            .cloned())
    }

    async fn contains_farmer_product(
        &self,
        order_id: Uuid,
        farmer_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        Ok(farmer_has_line(&self.inner.state.lock(), order_id, farmer_id))
    }

    async fn find_amounts(&self, scope: OrderScope) -> Result<Vec<OrderAmountRow>, RepositoryError> {
        let state = self.inner.state.lock();

        let rows = state
            .orders
            .iter()
            .filter(|order| visible(&state, order, scope))
            .map(|order| {
                let amount = match scope {
                    OrderScope::Farmer(farmer_id) => state
                        .order_items
                        .iter()
                        .filter(|item| item.order_id == order.id)
                        .filter(|item| {
                            state
                                .products
                                .get(&item.product_id)
                                .is_some_and(|p| p.farmer_id == farmer_id)
                        })
                        .map(|item| item.subtotal)
                        .sum::<Decimal>(),
                    _ => order.total_amount,
                };
                OrderAmountRow {
                    status: order.status,
                    amount,
                }
            })
            .collect();

        Ok(rows)
    }
}

#[async_trait]
impl OrderItemCommandRepositoryTrait for InMemoryStore {
    async fn create_order_item(
        &self,
        req: &CreateOrderItemRecordRequest,
    ) -> Result<OrderItem, RepositoryError> {
        if self.inner.faults.lock().create_item_for.contains(&req.product_id) {
            return Err(injected("create_order_item"));
        }

        let mut state = self.inner.state.lock();
        if !state.orders.iter().any(|order| order.id == req.order_id) {
            return Err(RepositoryError::ForeignKey(format!(
                "order {} does not exist",
                req.order_id
            )));
        }

        let item = OrderItem {
            id: Uuid::new_v4(),
            order_id: req.order_id,
            product_id: req.product_id,
            quantity: req.quantity,
            unit_price: req.unit_price,
            subtotal: req.subtotal,
            created_at: Utc::now(),
        };

        state.order_items.push(item.clone());
        state.writes.push(StoreWrite::CreateOrderItem(item.id));
        Ok(item)
    }

    async fn delete_order_item(&self, id: Uuid) -> Result<(), RepositoryError> {
        if self.inner.faults.lock().delete_item {
            return Err(injected("delete_order_item"));
        }

        let mut state = self.inner.state.lock();
        let before = state.order_items.len();
        state.order_items.retain(|item| item.id != id);
        if state.order_items.len() == before {
            return Err(RepositoryError::NotFound);
        }

        state.writes.push(StoreWrite::DeleteOrderItem(id));
        Ok(())
    }
}

#[async_trait]
impl OrderItemQueryRepositoryTrait for InMemoryStore {
    async fn find_by_order(&self, order_id: Uuid) -> Result<Vec<OrderItem>, RepositoryError> {
        Ok(self.order_items(order_id))
    }
}

#[async_trait]
impl BuyerStatsRepositoryTrait for InMemoryStore {
    async fn apply_order(
        &self,
        buyer_id: Uuid,
        amount: Decimal,
        delivery_address: &str,
    ) -> Result<(), RepositoryError> {
        if self.inner.faults.lock().buyer_stats {
            return Err(injected("apply_order"));
        }

        let mut state = self.inner.state.lock();
        let stats = state
            .buyers
            .get_mut(&buyer_id)
            .ok_or(RepositoryError::NotFound)?;

        stats.total_spent += amount;
        stats.total_orders += 1;
        stats.delivery_address = Some(delivery_address.to_string());

        state.writes.push(StoreWrite::BuyerStats(buyer_id));
        Ok(())
    }
}

#[async_trait]
impl ProducerStatsRepositoryTrait for InMemoryStore {
    async fn apply_sales(
        &self,
        producer_id: Uuid,
        amount: Decimal,
    ) -> Result<(), RepositoryError> {
        if self.inner.faults.lock().producer_stats {
            return Err(injected("apply_sales"));
        }

        let mut state = self.inner.state.lock();
        let sales = state
            .farmers
            .get_mut(&producer_id)
            .ok_or(RepositoryError::NotFound)?;
        *sales += amount;

        state.writes.push(StoreWrite::ProducerStats(producer_id));
        Ok(())
    }
}
