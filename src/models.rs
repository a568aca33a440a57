pub mod auth;
pub mod client;
pub mod product;
pub mod service_order;
