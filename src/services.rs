pub mod auth;
pub mod crud_service;
pub mod employee_service;
pub mod order_filter;
pub mod order_service;
