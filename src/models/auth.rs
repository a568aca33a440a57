// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::store::Record;

// Representa um funcionário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i32,
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,
}

// O que o store grava: a senha já chega em hash
#[derive(Debug, Clone)]
pub struct EmployeeData {
    pub username: String,
    pub password_hash: String,
}

impl Record for Employee {
    type Data = EmployeeData;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_data(id: i32, data: EmployeeData) -> Self {
        Self {
            id,
            username: data.username,
            password_hash: data.password_hash,
        }
    }
}

// Visão pública do funcionário. Nunca carrega o hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeView {
    #[schema(example = 3)]
    pub id: i32,
    #[schema(example = "joao.silva")]
    pub username: String,
}

impl From<Employee> for EmployeeView {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            username: employee.username,
        }
    }
}

// Dados para cadastro/atualização de funcionário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeePayload {
    #[validate(length(min = 3, max = 100, message = "O usuário deve ter entre 3 e 100 caracteres."))]
    #[schema(example = "joao.silva")]
    pub username: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    #[schema(example = "s3nh@Forte")]
    pub password: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "joao.silva")]
    pub username: String,
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "s3nh@Forte")]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,   // ID do funcionário
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
}
