// src/services/crud_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::store::{EntityStore, Record},
};

// Serviço de cadastro simples (clientes, produtos): leitura por id,
// listagem, criação, substituição e exclusão.
#[derive(Clone)]
pub struct CrudService<R: Record> {
    store: Arc<dyn EntityStore<R>>,
    entity: &'static str,
}

impl<R: Record> CrudService<R> {
    pub fn new(store: Arc<dyn EntityStore<R>>, entity: &'static str) -> Self {
        Self { store, entity }
    }

    pub async fn get(&self, id: i32) -> Result<R, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", self.entity, id)))
    }

    pub async fn list(&self) -> Result<Vec<R>, AppError> {
        self.store.list().await
    }

    pub async fn create(&self, data: R::Data) -> Result<R, AppError> {
        let record = self.store.save(None, data).await?;
        tracing::info!("{} {} criado.", self.entity, record.id());
        Ok(record)
    }

    pub async fn update(&self, id: i32, data: R::Data) -> Result<R, AppError> {
        let record = self.store.save(Some(id), data).await?;
        tracing::info!("{} {} atualizado.", self.entity, id);
        Ok(record)
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("{} {}", self.entity, id)));
        }
        tracing::info!("{} {} removido.", self.entity, id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::MemoryStore,
        models::product::{Product, ProductPayload},
    };
    use rust_decimal::Decimal;

    fn service() -> CrudService<Product> {
        CrudService::new(Arc::new(MemoryStore::new()), "Produto")
    }

    fn payload(name: &str) -> ProductPayload {
        ProductPayload {
            name: name.to_string(),
            input_weight: Some(Decimal::new(1250, 2)),
            output_weight: None,
        }
    }

    #[tokio::test]
    async fn create_get_update_delete_cycle() {
        let svc = service();

        let created = svc.create(payload("Chapa")).await.unwrap();
        assert_eq!(svc.get(created.id).await.unwrap(), created);

        let updated = svc.update(created.id, payload("Chapa 3mm")).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Chapa 3mm");

        svc.delete(created.id).await.unwrap();
        assert!(matches!(svc.get(created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn missing_records_are_not_found() {
        let svc = service();
        assert!(matches!(svc.delete(8).await, Err(AppError::NotFound(_))));
        assert!(matches!(svc.update(8, payload("x")).await, Err(AppError::NotFound(_))));
        assert!(svc.list().await.unwrap().is_empty());
    }
}
