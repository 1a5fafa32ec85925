use crate::{
    domain::{
        requests::cart::{AddCartItemRequest, UpdateCartItemRequest},
        response::cart::{CartItemResponse, CartResponse, CartSummaryResponse},
    },
    model::cart::{CartItem, CartLineSnapshot},
};
use async_trait::async_trait;
use shared::{
    domain::ApiResponse,
    errors::{RepositoryError, ServiceError},
};
use std::sync::Arc;
use uuid::Uuid;

pub type DynCartRepository = Arc<dyn CartRepositoryTrait + Send + Sync>;
pub type DynCartService = Arc<dyn CartServiceTrait + Send + Sync>;

#[async_trait]
pub trait CartRepositoryTrait {
    async fn find_with_products(
        &self,
        buyer_id: Uuid,
    ) -> Result<Vec<CartLineSnapshot>, RepositoryError>;
    async fn find_line(
        &self,
        buyer_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<CartLineSnapshot>, RepositoryError>;
    async fn find_by_product(
        &self,
        buyer_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartItem>, RepositoryError>;
    async fn create_item(
        &self,
        buyer_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError>;
    async fn update_quantity(
        &self,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError>;
    async fn delete_item(&self, buyer_id: Uuid, item_id: Uuid) -> Result<bool, RepositoryError>;
    async fn clear(&self, buyer_id: Uuid) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait CartServiceTrait {
    async fn get_cart(&self, buyer_id: Uuid) -> Result<ApiResponse<CartResponse>, ServiceError>;
    async fn get_summary(
        &self,
        buyer_id: Uuid,
    ) -> Result<ApiResponse<CartSummaryResponse>, ServiceError>;
    async fn add_item(
        &self,
        buyer_id: Uuid,
        req: &AddCartItemRequest,
    ) -> Result<ApiResponse<CartItemResponse>, ServiceError>;
    async fn update_item(
        &self,
        buyer_id: Uuid,
        item_id: Uuid,
        req: &UpdateCartItemRequest,
    ) -> Result<ApiResponse<CartItemResponse>, ServiceError>;
    async fn remove_item(
        &self,
        buyer_id: Uuid,
        item_id: Uuid,
    ) -> Result<ApiResponse<()>, ServiceError>;
    async fn clear(&self, buyer_id: Uuid) -> Result<ApiResponse<()>, ServiceError>;
}
