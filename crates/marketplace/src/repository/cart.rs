use crate::{
    abstract_trait::cart::CartRepositoryTrait,
    model::cart::{CartItem, CartLineSnapshot, CartProductRow},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use tracing::{error, info};
use uuid::Uuid;

const CART_WITH_PRODUCT: &str = r#"
    SELECT c.id, c.buyer_id, c.product_id, c.quantity, c.created_at, c.updated_at,
           p.title       AS product_title,
           p.price       AS product_price,
           p.quantity    AS product_quantity,
           p.status      AS product_status,
           p.farmer_id   AS product_farmer_id,
           p.order_count AS product_order_count
    FROM cart_items c
    LEFT JOIN products p ON p.id = c.product_id
"#;

#[derive(Clone)]
pub struct CartRepository {
    db: ConnectionPool,
}

impl CartRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartRepositoryTrait for CartRepository {
    async fn find_with_products(
        &self,
        buyer_id: Uuid,
    ) -> Result<Vec<CartLineSnapshot>, RepositoryError> {
        let sql = format!("{CART_WITH_PRODUCT} WHERE c.buyer_id = $1 ORDER BY c.created_at, c.id");

        let rows = sqlx::query_as::<_, CartProductRow>(&sql)
            .bind(buyer_id)
            .fetch_all(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to load cart for buyer {buyer_id}: {err:?}");
                RepositoryError::from(err)
            })?;

        Ok(rows.into_iter().map(CartLineSnapshot::from).collect())
    }

    async fn find_line(
        &self,
        buyer_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<CartLineSnapshot>, RepositoryError> {
        let sql = format!("{CART_WITH_PRODUCT} WHERE c.buyer_id = $1 AND c.id = $2");

        let row = sqlx::query_as::<_, CartProductRow>(&sql)
            .bind(buyer_id)
            .bind(item_id)
            .fetch_optional(&self.db)
            .await
            .map_err(RepositoryError::from)?;

        Ok(row.map(CartLineSnapshot::from))
    }

    async fn find_by_product(
        &self,
        buyer_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<CartItem>, RepositoryError> {
        sqlx::query_as::<_, CartItem>(
            r#"
            SELECT id, buyer_id, product_id, quantity, created_at, updated_at
            FROM cart_items
            WHERE buyer_id = $1 AND product_id = $2
            "#,
        )
        .bind(buyer_id)
        .bind(product_id)
        .fetch_optional(&self.db)
        .await
        .map_err(RepositoryError::from)
    }

    async fn create_item(
        &self,
        buyer_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (id, buyer_id, product_id, quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, now(), now())
            RETURNING id, buyer_id, product_id, quantity, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(buyer_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to add product {product_id} to cart of {buyer_id}: {err:?}");
            RepositoryError::from(err)
        })?;

        info!("🛒 Cart item {} created for buyer {buyer_id}", item.id);
        Ok(item)
    }

    async fn update_quantity(
        &self,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartItem, RepositoryError> {
        sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items
            SET quantity = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, buyer_id, product_id, quantity, created_at, updated_at
            "#,
        )
        .bind(item_id)
        .bind(quantity)
        .fetch_one(&self.db)
        .await
        .map_err(|err| {
            error!("❌ Failed to update cart item {item_id}: {err:?}");
            RepositoryError::from(err)
        })
    }

    async fn delete_item(&self, buyer_id: Uuid, item_id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND buyer_id = $2")
            .bind(item_id)
            .bind(buyer_id)
            .execute(&self.db)
            .await
            .map_err(RepositoryError::from)?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, buyer_id: Uuid) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE buyer_id = $1")
            .bind(buyer_id)
            .execute(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to clear cart for buyer {buyer_id}: {err:?}");
                RepositoryError::from(err)
            })?;

        info!(
            "🧹 Cleared {} cart items for buyer {buyer_id}",
            result.rows_affected()
        );
        Ok(result.rows_affected())
    }
}
