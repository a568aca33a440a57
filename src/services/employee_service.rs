// src/services/employee_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::store::EmployeeStore,
    models::auth::{EmployeeData, EmployeePayload, EmployeeView},
    services::auth::hash_password,
};

// Cadastro de funcionários. A senha só entra no store já em hash
// e nenhuma resposta carrega o hash.
#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
    bcrypt_cost: u32,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>, bcrypt_cost: u32) -> Self {
        Self { store, bcrypt_cost }
    }

    pub async fn get(&self, id: i32) -> Result<EmployeeView, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .map(EmployeeView::from)
            .ok_or_else(|| AppError::NotFound(format!("Funcionário {}", id)))
    }

    pub async fn list(&self) -> Result<Vec<EmployeeView>, AppError> {
        let employees = self.store.list().await?;
        Ok(employees.into_iter().map(EmployeeView::from).collect())
    }

    /// Insere (id vazio) ou substitui o funcionário, sempre com um hash novo.
    pub async fn save(&self, id: Option<i32>, payload: EmployeePayload) -> Result<EmployeeView, AppError> {
        let password_hash = hash_password(&payload.password, self.bcrypt_cost).await?;
        let data = EmployeeData {
            username: payload.username,
            password_hash,
        };

        let employee = self.store.save(id, data).await?;
        tracing::info!("👤 Funcionário {} gravado.", employee.id);
        Ok(employee.into())
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("Funcionário {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{store::EntityStore, MemoryStore};
    use crate::models::auth::Employee;

    fn payload(username: &str, password: &str) -> EmployeePayload {
        EmployeePayload { username: username.into(), password: password.into() }
    }

    #[tokio::test]
    async fn stores_only_a_bcrypt_hash() {
        let store = Arc::new(MemoryStore::new());
        let svc = EmployeeService::new(store.clone(), 4);

        let view = svc.save(None, payload("ana", "senha123")).await.unwrap();

        let stored = EntityStore::<Employee>::find_by_id(store.as_ref(), view.id)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.password_hash, "senha123");
        assert!(bcrypt::verify("senha123", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let svc = EmployeeService::new(Arc::new(MemoryStore::new()), 4);
        svc.save(None, payload("ana", "senha123")).await.unwrap();

        let err = svc.save(None, payload("ana", "outra123")).await.unwrap_err();
        assert!(matches!(err, AppError::UsernameAlreadyExists));
    }

    #[tokio::test]
    async fn update_keeps_the_id_and_rehashes() {
        let svc = EmployeeService::new(Arc::new(MemoryStore::new()), 4);
        let first = svc.save(None, payload("ana", "senha123")).await.unwrap();

        let renamed = svc.save(Some(first.id), payload("ana.souza", "nova1234")).await.unwrap();
        assert_eq!(renamed.id, first.id);
        assert_eq!(svc.list().await.unwrap(), vec![renamed]);

        svc.delete(first.id).await.unwrap();
        assert!(matches!(svc.get(first.id).await, Err(AppError::NotFound(_))));
    }
}
