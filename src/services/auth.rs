// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::store::EmployeeStore,
    models::auth::{Claims, EmployeeView},
};

// bcrypt é CPU-bound: roda fora do executor assíncrono
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

    Ok(hashed)
}

#[derive(Clone)]
pub struct AuthService {
    employees: Arc<dyn EmployeeStore>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(employees: Arc<dyn EmployeeStore>, jwt_secret: String) -> Self {
        Self { employees, jwt_secret }
    }

    /// true somente se o usuário existe e a senha confere com o hash.
    /// Usuário inexistente ou senha errada dão false, nunca erro.
    pub async fn verify(&self, username: &str, password: &str) -> Result<bool, AppError> {
        let Some(employee) = self.employees.find_by_username(username).await? else {
            return Ok(false);
        };

        let password_clone = password.to_owned();
        let password_hash_clone = employee.password_hash.clone();

        // Executa a verificação em um thread separado
        let outcome = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))?;

        match outcome {
            Ok(valid) => Ok(valid),
            Err(e) => {
                tracing::warn!("Hash inválido para o funcionário {}: {}", employee.id, e);
                Ok(false)
            }
        }
    }

    /// Consulta "este username já existe?". Devolve a visão sem hash.
    pub async fn exists(&self, username: &str) -> Result<EmployeeView, AppError> {
        self.employees
            .find_by_username(username)
            .await?
            .map(EmployeeView::from)
            .ok_or_else(|| AppError::NotFound(format!("Funcionário '{}'", username)))
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        if !self.verify(username, password).await? {
            return Err(AppError::InvalidCredentials);
        }

        let employee = self
            .employees
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        tracing::info!("🔑 Login do funcionário {}", employee.id);
        self.create_token(employee.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<EmployeeView, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Funcionário removido depois da emissão do token não passa
        self.employees
            .find_by_id(token_data.claims.sub)
            .await?
            .map(EmployeeView::from)
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, employee_id: i32) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: employee_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
