pub mod store;
pub mod memory;
pub use memory::MemoryStore;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod employee_repo;
pub use employee_repo::EmployeeRepository;
pub mod order_repo;
pub use order_repo::OrderRepository;

use crate::common::error::AppError;

// DELETE barrado por FK vira conflito; o resto segue como erro de banco
pub(crate) fn map_referenced_error(e: sqlx::Error, message: String) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_foreign_key_violation() {
            return AppError::ResourceInUse(message);
        }
    }
    e.into()
}
