pub mod auth;
pub mod clients;
pub mod employees;
pub mod orders;
pub mod products;
