// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Employees ---
        handlers::employees::create_employee,
        handlers::employees::find_by_username,
        handlers::employees::list_employees,
        handlers::employees::get_employee,
        handlers::employees::update_employee,
        handlers::employees::delete_employee,

        // --- Clients ---
        handlers::clients::create_client,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Products ---
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::list_orders,
        handlers::orders::search_orders,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::delete_order,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::EmployeeView,
            models::auth::EmployeePayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Cadastros ---
            models::client::Client,
            models::client::ClientPayload,
            models::product::Product,
            models::product::ProductPayload,

            // --- Orders ---
            models::service_order::ProductionStatus,
            models::service_order::ServiceOrder,
            models::service_order::OrderLine,
            models::service_order::OrderLineDetail,
            models::service_order::ServiceOrderDetail,
            models::service_order::OrderLineInput,
            models::service_order::SaveOrderPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Login e dados do funcionário autenticado"),
        (name = "Employees", description = "Cadastro de funcionários"),
        (name = "Clients", description = "Cadastro de clientes"),
        (name = "Products", description = "Cadastro de produtos"),
        (name = "Orders", description = "Ordens de serviço, itens e busca avançada")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_search_route_and_jwt_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/orders/search"));
        assert!(doc.paths.paths.contains_key("/api/employees/username/{username}"));

        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("api_jwt"));
        assert!(components.schemas.contains_key("ServiceOrderDetail"));
    }
}
