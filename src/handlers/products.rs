// src/handlers/products.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::product::{Product, ProductPayload},
};

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = ProductPayload,
    responses((status = 201, description = "Produto criado", body = Product)),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state.product_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses((status = 200, description = "Lista de produtos", body = [Product])),
    security(("api_jwt" = []))
)]
pub async fn list_products(State(app_state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(app_state.product_service.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Não encontrado")
    ),
    params(("id" = i32, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Product>, AppError> {
    Ok(Json(app_state.product_service.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Products",
    request_body = ProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 404, description = "Não encontrado")
    ),
    params(("id" = i32, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>, AppError> {
    payload.validate()?;

    Ok(Json(app_state.product_service.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Products",
    responses(
        (status = 204, description = "Produto removido"),
        (status = 404, description = "Não encontrado"),
        (status = 409, description = "Produto usado em ordens de serviço")
    ),
    params(("id" = i32, Path, description = "ID do produto")),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.product_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
