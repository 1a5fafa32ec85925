use crate::{
    abstract_trait::{
        cart::{CartServiceTrait, DynCartRepository},
        product::DynProductRepository,
    },
    domain::{
        requests::{
            cart::{AddCartItemRequest, UpdateCartItemRequest},
            validation_messages,
        },
        response::cart::{CartItemResponse, CartResponse, CartSummaryResponse},
    },
    model::{
        cart::{CartItem, CartLineSnapshot},
        product::{ProductSnapshot, ProductStatus},
    },
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    domain::ApiResponse,
    errors::{RepositoryError, ServiceError},
    utils::{Method, Metrics, OperationTracer},
};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct CartService {
    cart: DynCartRepository,
    products: DynProductRepository,
    tracer: OperationTracer,
}

impl CartService {
    pub fn new(
        cart: DynCartRepository,
        products: DynProductRepository,
        registry: &mut Registry,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        metrics.register(registry, "cart_service", "CartService");

        Self {
            cart,
            products,
            tracer: OperationTracer::new("cart-service", metrics),
        }
    }

    async fn merge(
        &self,
        existing: CartItem,
        quantity: i32,
        product: &ProductSnapshot,
    ) -> Result<CartItem, ServiceError> {
        let merged = existing
            .quantity
            .checked_add(quantity)
            .filter(|merged| *merged <= product.quantity)
            .ok_or_else(|| {
                ServiceError::BadRequest(format!(
                    "Cannot add {} more items. Only {} more items can be added.",
                    quantity,
                    (product.quantity - existing.quantity).max(0)
                ))
            })?;

        Ok(self.cart.update_quantity(existing.id, merged).await?)
    }

    fn attributes(buyer_id: Uuid) -> Vec<KeyValue> {
        vec![
            KeyValue::new("component", "cart"),
            KeyValue::new("buyer.id", buyer_id.to_string()),
        ]
    }
}

fn validate<T: Validate>(req: &T) -> Result<(), ServiceError> {
    req.validate()
        .map_err(|errors| ServiceError::Validation(validation_messages(&errors)))
}

#[async_trait]
impl CartServiceTrait for CartService {
    async fn get_cart(&self, buyer_id: Uuid) -> Result<ApiResponse<CartResponse>, ServiceError> {
        self.tracer
            .trace("get_cart", Method::Get, Self::attributes(buyer_id), async {
                let lines = self.cart.find_with_products(buyer_id).await?;
                let summary = CartSummaryResponse::from_lines(&lines);

                let items = lines
                    .into_iter()
                    .filter(|line| {
                        line.product
                            .as_ref()
                            .is_some_and(|p| p.status == ProductStatus::Available)
                    })
                    .map(CartItemResponse::from)
                    .collect();

                Ok(ApiResponse::success(
                    "Cart fetched successfully",
                    CartResponse { items, summary },
                ))
            })
            .await
    }

    async fn get_summary(
        &self,
        buyer_id: Uuid,
    ) -> Result<ApiResponse<CartSummaryResponse>, ServiceError> {
        self.tracer
            .trace("get_cart_summary", Method::Get, Self::attributes(buyer_id), async {
                let lines = self.cart.find_with_products(buyer_id).await?;
                Ok(ApiResponse::success(
                    "Cart summary fetched successfully",
                    CartSummaryResponse::from_lines(&lines),
                ))
            })
            .await
    }

    async fn add_item(
        &self,
        buyer_id: Uuid,
        req: &AddCartItemRequest,
    ) -> Result<ApiResponse<CartItemResponse>, ServiceError> {
        self.tracer
            .trace("add_cart_item", Method::Post, Self::attributes(buyer_id), async {
                validate(req)?;

                let product = self
                    .products
                    .find_by_id(req.product_id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound("Product not found".into()))?;

                if product.status != ProductStatus::Available {
                    return Err(ServiceError::BadRequest(
                        "Product is not available for purchase".into(),
                    ));
                }
                if req.quantity > product.quantity {
                    return Err(ServiceError::BadRequest(format!(
                        "Only {} items available in stock",
                        product.quantity
                    )));
                }
                if product.farmer_id == buyer_id {
                    return Err(ServiceError::BadRequest(
                        "You cannot add your own products to cart".into(),
                    ));
                }

                let item = match self.cart.find_by_product(buyer_id, product.id).await? {
                    Some(existing) => self.merge(existing, req.quantity, &product).await?,
                    None => match self
                        .cart
                        .create_item(buyer_id, product.id, req.quantity)
                        .await
                    {
                        Ok(item) => item,
                        Err(RepositoryError::AlreadyExists(_)) => {
                            let existing = self
                                .cart
                                .find_by_product(buyer_id, product.id)
                                .await?
                                .ok_or_else(|| {
                                    RepositoryError::Conflict(
                                        "Cart changed while adding item, please retry".into(),
                                    )
                                })?;
                            self.merge(existing, req.quantity, &product).await?
                        }
                        Err(err) => return Err(err.into()),
                    },
                };

                info!(
                    "🛒 Buyer {buyer_id} now has {} x {} in cart",
                    item.quantity, product.title
                );

                let message = format!("{} added to cart successfully", product.title);
                Ok(ApiResponse::success(
                    message,
                    CartItemResponse::from(CartLineSnapshot {
                        item,
                        product: Some(product),
                    }),
                ))
            })
            .await
    }

    async fn update_item(
        &self,
        buyer_id: Uuid,
        item_id: Uuid,
        req: &UpdateCartItemRequest,
    ) -> Result<ApiResponse<CartItemResponse>, ServiceError> {
        self.tracer
            .trace("update_cart_item", Method::Put, Self::attributes(buyer_id), async {
                validate(req)?;

                let line = self
                    .cart
                    .find_line(buyer_id, item_id)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound("Cart item not found".into()))?;

                let product = line
                    .product
                    .filter(|p| p.status == ProductStatus::Available)
                    .ok_or_else(|| {
                        ServiceError::BadRequest("Product is no longer available".into())
                    })?;

                if req.quantity > product.quantity {
                    return Err(ServiceError::BadRequest(format!(
                        "Only {} items available in stock",
                        product.quantity
                    )));
                }

                let item = self.cart.update_quantity(item_id, req.quantity).await?;

                Ok(ApiResponse::success(
                    "Cart item updated successfully",
                    CartItemResponse::from(CartLineSnapshot {
                        item,
                        product: Some(product),
                    }),
                ))
            })
            .await
    }

    async fn remove_item(
        &self,
        buyer_id: Uuid,
        item_id: Uuid,
    ) -> Result<ApiResponse<()>, ServiceError> {
        self.tracer
            .trace("remove_cart_item", Method::Delete, Self::attributes(buyer_id), async {
                if !self.cart.delete_item(buyer_id, item_id).await? {
                    return Err(ServiceError::NotFound("Cart item not found".into()));
                }
                Ok(ApiResponse::success("Item removed from cart successfully", ()))
            })
            .await
    }

    async fn clear(&self, buyer_id: Uuid) -> Result<ApiResponse<()>, ServiceError> {
        self.tracer
            .trace("clear_cart", Method::Delete, Self::attributes(buyer_id), async {
                self.cart.clear(buyer_id).await?;
                Ok(ApiResponse::success("Cart cleared successfully", ()))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::memory::InMemoryStore;
    use rust_decimal::Decimal;

    fn service(store: &InMemoryStore) -> CartService {
        CartService::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            &mut Registry::default(),
        )
    }

    fn add(product_id: Uuid, quantity: i32) -> AddCartItemRequest {
        AddCartItemRequest {
            product_id,
            quantity,
        }
    }

    #[tokio::test]
    async fn adding_the_same_product_merges_quantities() {
        let store = InMemoryStore::new();
        let buyer = Uuid::new_v4();
        let product = store.seed_product(Uuid::new_v4(), "Carrots", Decimal::new(450, 2), 10);
        let cart = service(&store);

        cart.add_item(buyer, &add(product, 2)).await.unwrap();
        let response = cart.add_item(buyer, &add(product, 3)).await.unwrap();

        assert_eq!(response.message, "Carrots added to cart successfully");
        assert_eq!(response.data.quantity, 5);
        assert_eq!(store.cart_items(buyer).len(), 1);
    }

    #[tokio::test]
    async fn concurrent_insert_of_same_product_is_merged() {
        let store = InMemoryStore::new();
        let buyer = Uuid::new_v4();
        let product = store.seed_product(Uuid::new_v4(), "Okra", Decimal::new(250, 2), 10);
        store.seed_cart_item(buyer, product, 2);
        store.faults(|f| f.missed_cart_lookups = 1);

        let response = service(&store).add_item(buyer, &add(product, 3)).await.unwrap();

        assert_eq!(response.data.quantity, 5);
        let items = store.cart_items(buyer);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[tokio::test]
    async fn merge_overflow_is_a_bad_request() {
        let store = InMemoryStore::new();
        let buyer = Uuid::new_v4();
        let product = store.seed_product(Uuid::new_v4(), "Salt", Decimal::new(100, 2), i32::MAX);
        store.seed_cart_item(buyer, product, i32::MAX - 1);

        let err = service(&store)
            .add_item(buyer, &add(product, 5))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::BadRequest(_)));
        assert_eq!(store.cart_items(buyer)[0].quantity, i32::MAX - 1);
    }

    #[tokio::test]
    async fn merge_may_not_exceed_stock() {
        let store = InMemoryStore::new();
        let buyer = Uuid::new_v4();
        let product = store.seed_product(Uuid::new_v4(), "Lettuce", Decimal::new(300, 2), 4);
        let cart = service(&store);

        cart.add_item(buyer, &add(product, 3)).await.unwrap();
        let err = cart.add_item(buyer, &add(product, 2)).await.unwrap_err();

        assert!(
            matches!(err, ServiceError::BadRequest(ref msg) if msg.contains("Only 1 more items"))
        );
        assert_eq!(store.cart_items(buyer)[0].quantity, 3);
    }

    #[tokio::test]
    async fn farmers_cannot_buy_their_own_products() {
        let store = InMemoryStore::new();
        let farmer = Uuid::new_v4();
        let product = store.seed_product(farmer, "Eggplant", Decimal::new(600, 2), 10);

        let err = service(&store)
            .add_item(farmer, &add(product, 1))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::BadRequest(_)));
        assert!(store.writes().is_empty());
    }

    #[tokio::test]
    async fn unavailable_and_missing_products_are_rejected() {
        let store = InMemoryStore::new();
        let buyer = Uuid::new_v4();
        let product = store.seed_product(Uuid::new_v4(), "Radish", Decimal::new(200, 2), 10);
        store.set_product_status(product, ProductStatus::Discontinued);
        let cart = service(&store);

        let err = cart.add_item(buyer, &add(product, 1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        let err = cart
            .add_item(buyer, &add(Uuid::new_v4(), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn zero_quantity_fails_validation() {
        let store = InMemoryStore::new();
        let err = service(&store)
            .add_item(Uuid::new_v4(), &add(Uuid::new_v4(), 0))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn update_checks_stock_and_ownership() {
        let store = InMemoryStore::new();
        let buyer = Uuid::new_v4();
        let product = store.seed_product(Uuid::new_v4(), "Sugarcane", Decimal::new(1000, 2), 6);
        let item = store.seed_cart_item(buyer, product, 1);
        let cart = service(&store);

        let updated = cart
            .update_item(buyer, item, &UpdateCartItemRequest { quantity: 6 })
            .await
            .unwrap();
        assert_eq!(updated.data.quantity, 6);

        let err = cart
            .update_item(buyer, item, &UpdateCartItemRequest { quantity: 7 })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        let err = cart
            .update_item(Uuid::new_v4(), item, &UpdateCartItemRequest { quantity: 1 })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn cart_totals_skip_unavailable_products() {
        let store = InMemoryStore::new();
        let buyer = Uuid::new_v4();
        let farmer = Uuid::new_v4();
        let fresh = store.seed_product(farmer, "Pineapple", Decimal::new(4500, 2), 10);
        let sold_out = store.seed_product(farmer, "Lanzones", Decimal::new(12000, 2), 10);
        store.seed_cart_item(buyer, fresh, 2);
        store.seed_cart_item(buyer, sold_out, 1);
        store.set_product_status(sold_out, ProductStatus::OutOfStock);

        let response = service(&store).get_cart(buyer).await.unwrap();

        assert_eq!(response.data.items.len(), 1);
        assert_eq!(response.data.summary.item_count, 2);
        assert_eq!(response.data.summary.subtotal, Decimal::new(9000, 2));
        assert_eq!(response.data.summary.total, Decimal::new(9000, 2));
    }

    #[tokio::test]
    async fn removing_someone_elses_item_is_not_found() {
        let store = InMemoryStore::new();
        let buyer = Uuid::new_v4();
        let product = store.seed_product(Uuid::new_v4(), "Yam", Decimal::new(700, 2), 3);
        let item = store.seed_cart_item(buyer, product, 1);
        let cart = service(&store);

        let err = cart.remove_item(Uuid::new_v4(), item).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        cart.remove_item(buyer, item).await.unwrap();
        assert!(store.cart_items(buyer).is_empty());
    }
}
