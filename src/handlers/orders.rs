// src/handlers/orders.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedEmployee,
    models::service_order::{OrderSearchParams, SaveOrderPayload, ServiceOrderDetail},
};

// POST /api/orders
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = SaveOrderPayload,
    responses(
        (status = 201, description = "OS criada com seus itens", body = ServiceOrderDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente ou produto inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    AuthenticatedEmployee(employee): AuthenticatedEmployee,
    Json(payload): Json<SaveOrderPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let order = app_state.order_service.save(None, payload).await?;
    tracing::debug!("OS {} aberta por {}", order.order.id, employee.username);

    Ok((StatusCode::CREATED, Json(order)))
}

// GET /api/orders
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "Orders",
    responses((status = 200, description = "Todas as OS", body = [ServiceOrderDetail])),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<ServiceOrderDetail>>, AppError> {
    Ok(Json(app_state.order_service.list().await?))
}

// GET /api/orders/search?valueMin=..&productionStatus=..
#[utoipa::path(
    get,
    path = "/api/orders/search",
    tag = "Orders",
    params(OrderSearchParams),
    responses(
        (status = 200, description = "OS que atendem a todos os filtros", body = [ServiceOrderDetail]),
        (status = 400, description = "Intervalo inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn search_orders(
    State(app_state): State<AppState>,
    Query(params): Query<OrderSearchParams>,
) -> Result<Json<Vec<ServiceOrderDetail>>, AppError> {
    Ok(Json(app_state.order_service.search(&params).await?))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = "Orders",
    responses(
        (status = 200, description = "OS com itens", body = ServiceOrderDetail),
        (status = 404, description = "Não encontrada")
    ),
    params(("id" = i32, Path, description = "ID da OS")),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ServiceOrderDetail>, AppError> {
    Ok(Json(app_state.order_service.get(id).await?))
}

// PUT /api/orders/{id}: substitui a OS e faz upsert dos itens enviados
#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    tag = "Orders",
    request_body = SaveOrderPayload,
    responses(
        (status = 200, description = "OS atualizada", body = ServiceOrderDetail),
        (status = 404, description = "OS, cliente ou produto inexistente")
    ),
    params(("id" = i32, Path, description = "ID da OS")),
    security(("api_jwt" = []))
)]
pub async fn update_order(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<SaveOrderPayload>,
) -> Result<Json<ServiceOrderDetail>, AppError> {
    payload.validate()?;

    Ok(Json(app_state.order_service.save(Some(id), payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    tag = "Orders",
    responses(
        (status = 204, description = "OS removida junto com os itens"),
        (status = 404, description = "Não encontrada")
    ),
    params(("id" = i32, Path, description = "ID da OS")),
    security(("api_jwt" = []))
)]
pub async fn delete_order(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.order_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
