use crate::{
    abstract_trait::{
        cart::{DynCartRepository, DynCartService},
        checkout::DynCheckoutService,
        order::{
            repository::{DynOrderCommandRepository, DynOrderQueryRepository},
            service::{DynOrderCommandService, DynOrderQueryService},
        },
        order_item::{DynOrderItemCommandRepository, DynOrderItemQueryRepository},
        product::DynProductRepository,
        stats::{DynBuyerStatsRepository, DynProducerStatsRepository},
    },
    repository::{
        BuyerStatsRepository, CartRepository, OrderCommandRepository,
        OrderItemCommandRepository, OrderItemQueryRepository, OrderQueryRepository,
        ProducerStatsRepository, ProductRepository, memory::InMemoryStore,
    },
    service::{
        CartService, CheckoutService, CheckoutServiceDeps, OrderCommandService,
        OrderQueryService,
    },
};
use prometheus_client::registry::Registry;
use shared::config::ConnectionPool;
use std::sync::Arc;

/// Every store the services talk to, behind its trait.
#[derive(Clone)]
pub struct Repositories {
    pub cart: DynCartRepository,
    pub products: DynProductRepository,
    pub order_command: DynOrderCommandRepository,
    pub order_query: DynOrderQueryRepository,
    pub order_item_command: DynOrderItemCommandRepository,
    pub order_item_query: DynOrderItemQueryRepository,
    pub buyer_stats: DynBuyerStatsRepository,
    pub producer_stats: DynProducerStatsRepository,
}

impl Repositories {
    pub fn postgres(pool: ConnectionPool) -> Self {
        Self {
            cart: Arc::new(CartRepository::new(pool.clone())),
            products: Arc::new(ProductRepository::new(pool.clone())),
            order_command: Arc::new(OrderCommandRepository::new(pool.clone())),
            order_query: Arc::new(OrderQueryRepository::new(pool.clone())),
            order_item_command: Arc::new(OrderItemCommandRepository::new(pool.clone())),
            order_item_query: Arc::new(OrderItemQueryRepository::new(pool.clone())),
            buyer_stats: Arc::new(BuyerStatsRepository::new(pool.clone())),
            producer_stats: Arc::new(ProducerStatsRepository::new(pool)),
        }
    }

    pub fn in_memory(store: &InMemoryStore) -> Self {
        Self {
            cart: Arc::new(store.clone()),
            products: Arc::new(store.clone()),
            order_command: Arc::new(store.clone()),
            order_query: Arc::new(store.clone()),
            order_item_command: Arc::new(store.clone()),
            order_item_query: Arc::new(store.clone()),
            buyer_stats: Arc::new(store.clone()),
            producer_stats: Arc::new(store.clone()),
        }
    }
}

#[derive(Clone)]
pub struct DependenciesInject {
    pub checkout_service: DynCheckoutService,
    pub cart_service: DynCartService,
    pub order_query_service: DynOrderQueryService,
    pub order_command_service: DynOrderCommandService,
}

impl std::fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("checkout_service", &"DynCheckoutService")
            .field("cart_service", &"DynCartService")
            .field("order_query_service", &"DynOrderQueryService")
            .field("order_command_service", &"DynOrderCommandService")
            .finish()
    }
}

impl DependenciesInject {
    pub fn new(repos: Repositories, registry: &mut Registry) -> Self {
        let checkout_service: DynCheckoutService = Arc::new(CheckoutService::new(
            CheckoutServiceDeps {
                cart: repos.cart.clone(),
                products: repos.products.clone(),
                order_command: repos.order_command.clone(),
                order_item_command: repos.order_item_command.clone(),
                buyer_stats: repos.buyer_stats.clone(),
                producer_stats: repos.producer_stats.clone(),
            },
            registry,
        ));

        let cart_service: DynCartService = Arc::new(CartService::new(
            repos.cart.clone(),
            repos.products.clone(),
            registry,
        ));

        let order_query_service: DynOrderQueryService = Arc::new(OrderQueryService::new(
            repos.order_query.clone(),
            repos.order_item_query.clone(),
            registry,
        ));

        let order_command_service: DynOrderCommandService = Arc::new(OrderCommandService::new(
            repos.order_command,
            repos.order_query,
            registry,
        ));

        Self {
            checkout_service,
            cart_service,
            order_query_service,
            order_command_service,
        }
    }
}
