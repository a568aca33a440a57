// src/handlers/employees.rs

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
    models::auth::{EmployeePayload, EmployeeView},
};

// POST /api/employees (público: é o cadastro inicial)
#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Employees",
    request_body = EmployeePayload,
    responses(
        (status = 201, description = "Funcionário cadastrado", body = EmployeeView),
        (status = 409, description = "Nome de usuário já existe")
    )
)]
pub async fn create_employee(
    State(app_state): State<AppState>,
    Json(payload): Json<EmployeePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let employee = app_state.employee_service.save(None, payload).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

// GET /api/employees/username/{username}
#[utoipa::path(
    get,
    path = "/api/employees/username/{username}",
    tag = "Employees",
    responses(
        (status = 200, description = "Usuário existe", body = EmployeeView),
        (status = 404, description = "Usuário não existe")
    ),
    params(("username" = String, Path, description = "Nome de usuário"))
)]
pub async fn find_by_username(
    State(app_state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<EmployeeView>, AppError> {
    Ok(Json(app_state.auth_service.exists(&username).await?))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    responses((status = 200, description = "Lista de funcionários", body = [EmployeeView])),
    security(("api_jwt" = []))
)]
pub async fn list_employees(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<EmployeeView>>, AppError> {
    Ok(Json(app_state.employee_service.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "Employees",
    responses(
        (status = 200, description = "Funcionário", body = EmployeeView),
        (status = 404, description = "Não encontrado")
    ),
    params(("id" = i32, Path, description = "ID do funcionário")),
    security(("api_jwt" = []))
)]
pub async fn get_employee(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EmployeeView>, AppError> {
    Ok(Json(app_state.employee_service.get(id).await?))
}

#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "Employees",
    request_body = EmployeePayload,
    responses(
        (status = 200, description = "Funcionário atualizado", body = EmployeeView),
        (status = 404, description = "Não encontrado"),
        (status = 409, description = "Nome de usuário já existe")
    ),
    params(("id" = i32, Path, description = "ID do funcionário")),
    security(("api_jwt" = []))
)]
pub async fn update_employee(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<EmployeePayload>,
) -> Result<Json<EmployeeView>, AppError> {
    payload.validate()?;

    Ok(Json(app_state.employee_service.save(Some(id), payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "Employees",
    responses(
        (status = 204, description = "Funcionário removido"),
        (status = 404, description = "Não encontrado")
    ),
    params(("id" = i32, Path, description = "ID do funcionário")),
    security(("api_jwt" = []))
)]
pub async fn delete_employee(
    State(app_state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, AppError> {
    app_state.employee_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
