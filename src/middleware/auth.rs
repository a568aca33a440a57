// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::auth::EmployeeView};

// Exige "Authorization: Bearer <token>" válido nas rotas protegidas
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidToken)?;

    let employee = app_state.auth_service.validate_token(token).await?;

    // Insere o funcionário nos "extensions" da requisição
    request.extensions_mut().insert(employee);
    Ok(next.run(request).await)
}

// Extrator para obter o funcionário autenticado diretamente nos handlers
pub struct AuthenticatedEmployee(pub EmployeeView);

impl<S> FromRequestParts<S> for AuthenticatedEmployee
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<EmployeeView>()
            .cloned()
            .map(AuthenticatedEmployee)
            .ok_or(AppError::InvalidToken)
    }
}
