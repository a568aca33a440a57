// src/db/order_repo.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use crate::{
    common::error::AppError,
    db::store::{OrderTransaction, ServiceOrderStore},
    models::{
        product::Product,
        service_order::{OrderLine, OrderLineDetail, ServiceOrder, ServiceOrderData},
    },
    services::order_filter::OrderFilter,
};

const ORDER_COLUMNS: &str = "id, description, delivery_date, approved_at, payment_status, \
                             production_status, service_value, client_id";

const LINE_DETAIL_SELECT: &str = r#"
    SELECT l.order_id, l.product_id, l.quantity, p.name AS product_name
    FROM order_lines l
    JOIN products p ON p.id = l.product_id
"#;

#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceOrderStore for OrderRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<ServiceOrder>, AppError> {
        let order = sqlx::query_as::<_, ServiceOrder>(&format!(
            "SELECT {ORDER_COLUMNS} FROM service_orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    async fn list(&self) -> Result<Vec<ServiceOrder>, AppError> {
        self.search(&OrderFilter::new()).await
    }

    async fn search(&self, filter: &OrderFilter) -> Result<Vec<ServiceOrder>, AppError> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {ORDER_COLUMNS} FROM service_orders"));
        filter.push_where(&mut builder);
        builder.push(" ORDER BY id ASC");

        let orders = builder
            .build_query_as::<ServiceOrder>()
            .fetch_all(&self.pool)
            .await?;

        Ok(orders)
    }

    async fn lines_for(&self, order_ids: &[i32]) -> Result<Vec<OrderLineDetail>, AppError> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }

        let lines = sqlx::query_as::<_, OrderLineDetail>(&format!(
            "{LINE_DETAIL_SELECT} WHERE l.order_id = ANY($1) ORDER BY l.order_id, l.product_id"
        ))
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    // Os itens saem junto pelo ON DELETE CASCADE de order_lines
    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM service_orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgOrderTransaction { tx }))
    }
}

// Se for dropada sem commit, o sqlx faz rollback automático
pub struct PgOrderTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl OrderTransaction for PgOrderTransaction {
    async fn client_exists(&mut self, client_id: i32) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM clients WHERE id = $1)")
            .bind(client_id)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(exists)
    }

    async fn find_product(&mut self, product_id: i32) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, input_weight, output_weight FROM products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(product)
    }

    async fn save_order(
        &mut self,
        id: Option<i32>,
        data: ServiceOrderData,
    ) -> Result<ServiceOrder, AppError> {
        let Some(id) = id else {
            let order = sqlx::query_as::<_, ServiceOrder>(&format!(
                r#"
                INSERT INTO service_orders (
                    description, delivery_date, approved_at, payment_status,
                    production_status, service_value, client_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING {ORDER_COLUMNS}
                "#
            ))
            .bind(data.description)
            .bind(data.delivery_date)
            .bind(data.approved_at)
            .bind(data.payment_status)
            .bind(data.production_status)
            .bind(data.service_value)
            .bind(data.client_id)
            .fetch_one(&mut *self.tx)
            .await?;

            return Ok(order);
        };

        sqlx::query_as::<_, ServiceOrder>(&format!(
            r#"
            UPDATE service_orders
            SET description = $2, delivery_date = $3, approved_at = $4, payment_status = $5,
                production_status = $6, service_value = $7, client_id = $8
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(data.description)
        .bind(data.delivery_date)
        .bind(data.approved_at)
        .bind(data.payment_status)
        .bind(data.production_status)
        .bind(data.service_value)
        .bind(data.client_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ordem de serviço {}", id)))
    }

    async fn upsert_line(&mut self, line: OrderLine) -> Result<OrderLine, AppError> {
        let line = sqlx::query_as::<_, OrderLine>(
            r#"
            INSERT INTO order_lines (order_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (order_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity
            RETURNING order_id, product_id, quantity
            "#,
        )
        .bind(line.order_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(line)
    }

    async fn lines_for(&mut self, order_id: i32) -> Result<Vec<OrderLineDetail>, AppError> {
        let lines = sqlx::query_as::<_, OrderLineDetail>(&format!(
            "{LINE_DETAIL_SELECT} WHERE l.order_id = $1 ORDER BY l.product_id"
        ))
        .bind(order_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(lines)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
