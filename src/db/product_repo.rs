// src/db/product_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{map_referenced_error, store::EntityStore},
    models::product::{Product, ProductPayload},
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore<Product> for ProductRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, input_weight, output_weight FROM products WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn list(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, input_weight, output_weight FROM products ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn save(&self, id: Option<i32>, data: ProductPayload) -> Result<Product, AppError> {
        let Some(id) = id else {
            let product = sqlx::query_as::<_, Product>(
                r#"
                INSERT INTO products (name, input_weight, output_weight)
                VALUES ($1, $2, $3)
                RETURNING id, name, input_weight, output_weight
                "#,
            )
            .bind(data.name)
            .bind(data.input_weight)
            .bind(data.output_weight)
            .fetch_one(&self.pool)
            .await?;

            return Ok(product);
        };

        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $2, input_weight = $3, output_weight = $4
            WHERE id = $1
            RETURNING id, name, input_weight, output_weight
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.input_weight)
        .bind(data.output_weight)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Produto {}", id)))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_referenced_error(e, format!("O produto {} está em ordens de serviço.", id)))?;

        Ok(result.rows_affected() > 0)
    }
}
