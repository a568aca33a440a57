// src/routes.rs

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers};

pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(app_state.settings.cors_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Rotas públicas: login, cadastro e consulta de usuário
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/employees", post(handlers::employees::create_employee))
        .route(
            "/api/employees/username/{username}",
            get(handlers::employees::find_by_username),
        );

    // Todo o resto exige token
    let protected_routes = Router::new()
        .route("/api/auth/me", get(handlers::auth::get_me))
        .route("/api/employees", get(handlers::employees::list_employees))
        .route(
            "/api/employees/{id}",
            get(handlers::employees::get_employee)
                .put(handlers::employees::update_employee)
                .delete(handlers::employees::delete_employee),
        )
        .route(
            "/api/clients",
            post(handlers::clients::create_client).get(handlers::clients::list_clients),
        )
        .route(
            "/api/clients/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route(
            "/api/products",
            post(handlers::products::create_product).get(handlers::products::list_products),
        )
        .route(
            "/api/products/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route(
            "/api/orders",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route("/api/orders/search", get(handlers::orders::search_orders))
        .route(
            "/api/orders/{id}",
            get(handlers::orders::get_order)
                .put(handlers::orders::update_order)
                .delete(handlers::orders::delete_order),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            crate::middleware::auth::auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
