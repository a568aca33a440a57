// src/handlers/clients.rs

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
    models::client::{Client, ClientPayload},
};

#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = ClientPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    Json(payload): Json<ClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let client = app_state.client_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    responses((status = 200, description = "Lista de clientes", body = [Client])),
    security(("api_jwt" = []))
)]
pub async fn list_clients(State(app_state): State<AppState>) -> Result<Json<Vec<Client>>, AppError> {
    Ok(Json(app_state.client_service.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    responses(
        (status = 200, description = "Cliente", body = Client),
        (status = 404, description = "Não encontrado")
    ),
    params(("id" = i32, Path, description = "ID do cliente")),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Client>, AppError> {
    Ok(Json(app_state.client_service.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    request_body = ClientPayload,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 404, description = "Não encontrado")
    ),
    params(("id" = i32, Path, description = "ID do cliente")),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ClientPayload>,
) -> Result<Json<Client>, AppError> {
    payload.validate()?;

    Ok(Json(app_state.client_service.update(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    responses(
        (status = 204, description = "Cliente removido"),
        (status = 404, description = "Não encontrado"),
        (status = 409, description = "Cliente possui ordens de serviço")
    ),
    params(("id" = i32, Path, description = "ID do cliente")),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.client_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
