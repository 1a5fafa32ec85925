use super::ORDER_COLUMNS;
use crate::{
    abstract_trait::order::repository::OrderQueryRepositoryTrait,
    domain::requests::order::{FindOrdersRecordRequest, OrderScope},
    model::order::{Order as OrderModel, OrderAmountRow, OrderStatus},
};
use async_trait::async_trait;
use shared::{config::ConnectionPool, errors::RepositoryError};
use sqlx::{Postgres, QueryBuilder};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrderQueryRepository {
    db: ConnectionPool,
}

impl OrderQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, scope: OrderScope, status: Option<OrderStatus>) {
    match scope {
        OrderScope::Buyer(buyer_id) => {
            qb.push(" AND o.buyer_id = ").push_bind(buyer_id);
        }
        OrderScope::Farmer(farmer_id) => {
            qb.push(
                " AND EXISTS (SELECT 1 FROM order_items oi \
                 JOIN products p ON p.id = oi.product_id \
                 WHERE oi.order_id = o.id AND p.farmer_id = ",
            )
            .push_bind(farmer_id)
            .push(")");
        }
        OrderScope::All => {}
    }

    if let Some(status) = status {
        qb.push(" AND o.status = ").push_bind(status);
    }
}

#[async_trait]
impl OrderQueryRepositoryTrait for OrderQueryRepository {
    async fn find_all(
        &self,
        req: &FindOrdersRecordRequest,
    ) -> Result<(Vec<OrderModel>, i64), RepositoryError> {
        info!("🔍 Listing orders for {:?}", req.scope);

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders o WHERE TRUE");
        push_filters(&mut count_qb, req.scope, req.status);

        let total = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to count orders: {err:?}");
                RepositoryError::from(err)
            })?;

        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {ORDER_COLUMNS} FROM orders o WHERE TRUE"));
        push_filters(&mut qb, req.scope, req.status);
        qb.push(" ORDER BY o.created_at DESC LIMIT ")
            .push_bind(req.limit)
            .push(" OFFSET ")
            .push_bind(req.offset);

        let orders = qb
            .build_query_as::<OrderModel>()
            .fetch_all(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to list orders: {err:?}");
                RepositoryError::from(err)
            })?;

        Ok((orders, total))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderModel>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");

        sqlx::query_as::<_, OrderModel>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                error!("❌ Failed to fetch order {id}: {err:?}");
                RepositoryError::from(err)
            })
    }

    async fn contains_farmer_product(
        &self,
        order_id: Uuid,
        farmer_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM order_items oi
                JOIN products p ON p.id = oi.product_id
                WHERE oi.order_id = $1 AND p.farmer_id = $2
            )
            "#,
        )
        .bind(order_id)
        .bind(farmer_id)
        .fetch_one(&self.db)
        .await
        .map_err(RepositoryError::from)
    }

    async fn find_amounts(&self, scope: OrderScope) -> Result<Vec<OrderAmountRow>, RepositoryError> {
        let query = match scope {
            OrderScope::Buyer(buyer_id) => sqlx::query_as::<_, OrderAmountRow>(
                "SELECT status, total_amount AS amount FROM orders WHERE buyer_id = $1",
            )
            .bind(buyer_id),
            OrderScope::Farmer(farmer_id) => sqlx::query_as::<_, OrderAmountRow>(
                r#"
                SELECT o.status, SUM(oi.subtotal) AS amount
                FROM orders o
                JOIN order_items oi ON oi.order_id = o.id
                JOIN products p ON p.id = oi.product_id
                WHERE p.farmer_id = $1
                GROUP BY o.id, o.status
                "#,
            )
            .bind(farmer_id),
            OrderScope::All => sqlx::query_as::<_, OrderAmountRow>(
                "SELECT status, total_amount AS amount FROM orders",
            ),
        };

        query.fetch_all(&self.db).await.map_err(|err| {
            error!("❌ Failed to aggregate orders for {scope:?}: {err:?}");
            RepositoryError::from(err)
        })
    }
}
