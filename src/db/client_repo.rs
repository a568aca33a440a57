// src/db/client_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{map_referenced_error, store::EntityStore},
    models::client::{Client, ClientPayload},
};

#[derive(Clone)]
pub struct ClientRepository {
    pool: PgPool,
}

impl ClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EntityStore<Client> for ClientRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Client>, AppError> {
        let client = sqlx::query_as::<_, Client>(
            "SELECT id, name, tax_id, phone, email FROM clients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(client)
    }

    async fn list(&self) -> Result<Vec<Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, tax_id, phone, email FROM clients ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    async fn save(&self, id: Option<i32>, data: ClientPayload) -> Result<Client, AppError> {
        let Some(id) = id else {
            let client = sqlx::query_as::<_, Client>(
                r#"
                INSERT INTO clients (name, tax_id, phone, email)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, tax_id, phone, email
                "#,
            )
            .bind(data.name)
            .bind(data.tax_id)
            .bind(data.phone)
            .bind(data.email)
            .fetch_one(&self.pool)
            .await?;

            return Ok(client);
        };

        // Substitui o registro inteiro
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $2, tax_id = $3, phone = $4, email = $5
            WHERE id = $1
            RETURNING id, name, tax_id, phone, email
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.tax_id)
        .bind(data.phone)
        .bind(data.email)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Cliente {}", id)))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_referenced_error(e, format!("O cliente {} possui ordens de serviço.", id)))?;

        Ok(result.rows_affected() > 0)
    }
}
