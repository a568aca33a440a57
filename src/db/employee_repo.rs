// src/db/employee_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::store::{EmployeeStore, EntityStore},
    models::auth::{Employee, EmployeeData},
};

// O repositório de funcionários, responsável por todas as interações com a tabela 'employees'
#[derive(Clone)]
pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Converte violação do UNIQUE(username) num erro amigável
fn map_username_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UsernameAlreadyExists;
        }
    }
    e.into()
}

#[async_trait]
impl EntityStore<Employee> for EmployeeRepository {
    async fn find_by_id(&self, id: i32) -> Result<Option<Employee>, AppError> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, username, password_hash FROM employees WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }

    async fn list(&self) -> Result<Vec<Employee>, AppError> {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT id, username, password_hash FROM employees ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    async fn save(&self, id: Option<i32>, data: EmployeeData) -> Result<Employee, AppError> {
        let Some(id) = id else {
            let employee = sqlx::query_as::<_, Employee>(
                r#"
                INSERT INTO employees (username, password_hash)
                VALUES ($1, $2)
                RETURNING id, username, password_hash
                "#,
            )
            .bind(data.username)
            .bind(data.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_username_error)?;

            return Ok(employee);
        };

        sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET username = $2, password_hash = $3
            WHERE id = $1
            RETURNING id, username, password_hash
            "#,
        )
        .bind(id)
        .bind(data.username)
        .bind(data.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_username_error)?
        .ok_or_else(|| AppError::NotFound(format!("Funcionário {}", id)))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl EmployeeStore for EmployeeRepository {
    // Busca um funcionário pelo username
    async fn find_by_username(&self, username: &str) -> Result<Option<Employee>, AppError> {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT id, username, password_hash FROM employees WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(employee)
    }
}
