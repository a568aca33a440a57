// src/db/memory.rs
//
// Store em memória: mesmo contrato do Postgres, sem banco. Usado em
// desenvolvimento (STORAGE_BACKEND=memory) e nos testes.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    common::error::AppError,
    db::store::{EmployeeStore, EntityStore, OrderTransaction, Record, ServiceOrderStore},
    models::{
        auth::Employee,
        client::Client,
        product::Product,
        service_order::{
            OrderLine, OrderLineDetail, OrderLineKey, ServiceOrder, ServiceOrderData,
        },
    },
    services::order_filter::OrderFilter,
};

#[derive(Debug, Clone)]
pub struct Table<R> {
    rows: BTreeMap<i32, R>,
    last_id: i32,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self { rows: BTreeMap::new(), last_id: 0 }
    }
}

impl<R: Clone> Table<R> {
    fn get(&self, id: i32) -> Option<R> {
        self.rows.get(&id).cloned()
    }

    fn values(&self) -> impl Iterator<Item = &R> {
        self.rows.values()
    }

    fn contains(&self, id: i32) -> bool {
        self.rows.contains_key(&id)
    }

    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn remove(&mut self, id: i32) -> bool {
        self.rows.remove(&id).is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryState {
    clients: Table<Client>,
    products: Table<Product>,
    employees: Table<Employee>,
    orders: Table<ServiceOrder>,
    lines: BTreeMap<OrderLineKey, OrderLine>,
}

impl MemoryState {
    fn save_order(&mut self, id: Option<i32>, data: ServiceOrderData) -> Result<ServiceOrder, AppError> {
        let id = match id {
            Some(id) if self.orders.contains(id) => id,
            Some(id) => return Err(AppError::NotFound(format!("Ordem de serviço {}", id))),
            None => self.orders.next_id(),
        };
        let order = ServiceOrder::from_data(id, data);
        self.orders.rows.insert(id, order.clone());
        Ok(order)
    }

    fn line_details(&self, order_ids: &[i32]) -> Vec<OrderLineDetail> {
        self.lines
            .values()
            .filter(|line| order_ids.contains(&line.order_id))
            .map(|line| OrderLineDetail {
                line: line.clone(),
                product_name: self
                    .products
                    .get(line.product_id)
                    .map(|p| p.name)
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// Dá ao impl genérico de `EntityStore` acesso à tabela de cada registro,
/// com as regras de integridade que o banco faria via constraints.
pub trait HasTable<R: Record> {
    fn table(&self) -> &Table<R>;
    fn table_mut(&mut self) -> &mut Table<R>;

    fn check_save(&self, _id: Option<i32>, _data: &R::Data) -> Result<(), AppError> {
        Ok(())
    }

    fn check_delete(&self, _id: i32) -> Result<(), AppError> {
        Ok(())
    }

    fn label() -> &'static str;
}

impl HasTable<Client> for MemoryState {
    fn table(&self) -> &Table<Client> {
        &self.clients
    }

    fn table_mut(&mut self) -> &mut Table<Client> {
        &mut self.clients
    }

    fn check_delete(&self, id: i32) -> Result<(), AppError> {
        if self.orders.values().any(|o| o.client_id == Some(id)) {
            return Err(AppError::ResourceInUse(format!(
                "O cliente {} possui ordens de serviço.",
                id
            )));
        }
        Ok(())
    }

    fn label() -> &'static str {
        "Cliente"
    }
}

impl HasTable<Product> for MemoryState {
    fn table(&self) -> &Table<Product> {
        &self.products
    }

    fn table_mut(&mut self) -> &mut Table<Product> {
        &mut self.products
    }

    fn check_delete(&self, id: i32) -> Result<(), AppError> {
        if self.lines.keys().any(|k| k.product_id == id) {
            return Err(AppError::ResourceInUse(format!(
                "O produto {} está em ordens de serviço.",
                id
            )));
        }
        Ok(())
    }

    fn label() -> &'static str {
        "Produto"
    }
}

impl HasTable<Employee> for MemoryState {
    fn table(&self) -> &Table<Employee> {
        &self.employees
    }

    fn table_mut(&mut self) -> &mut Table<Employee> {
        &mut self.employees
    }

    // Mesmo efeito do UNIQUE(username) da migration
    fn check_save(&self, id: Option<i32>, data: &<Employee as Record>::Data) -> Result<(), AppError> {
        let taken = self
            .employees
            .values()
            .any(|e| e.username == data.username && Some(e.id) != id);
        if taken {
            return Err(AppError::UsernameAlreadyExists);
        }
        Ok(())
    }

    fn label() -> &'static str {
        "Funcionário"
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<R> EntityStore<R> for MemoryStore
where
    R: Record,
    MemoryState: HasTable<R>,
{
    async fn find_by_id(&self, id: i32) -> Result<Option<R>, AppError> {
        let state = self.state.lock().await;
        Ok(<MemoryState as HasTable<R>>::table(&state).get(id))
    }

    async fn list(&self) -> Result<Vec<R>, AppError> {
        let state = self.state.lock().await;
        Ok(<MemoryState as HasTable<R>>::table(&state).values().cloned().collect())
    }

    async fn save(&self, id: Option<i32>, data: R::Data) -> Result<R, AppError> {
        let mut state = self.state.lock().await;
        <MemoryState as HasTable<R>>::check_save(&state, id, &data)?;

        let table = <MemoryState as HasTable<R>>::table_mut(&mut state);
        let id = match id {
            Some(id) if table.contains(id) => id,
            Some(id) => {
                return Err(AppError::NotFound(format!(
                    "{} {}",
                    <MemoryState as HasTable<R>>::label(),
                    id
                )))
            }
            None => table.next_id(),
        };

        let record = R::from_data(id, data);
        table.rows.insert(id, record.clone());
        Ok(record)
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;
        if !<MemoryState as HasTable<R>>::table(&state).contains(id) {
            return Ok(false);
        }
        <MemoryState as HasTable<R>>::check_delete(&state, id)?;
        Ok(<MemoryState as HasTable<R>>::table_mut(&mut state).remove(id))
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<Employee>, AppError> {
        let state = self.state.lock().await;
        Ok(state.employees.values().find(|e| e.username == username).cloned())
    }
}

#[async_trait]
impl ServiceOrderStore for MemoryStore {
    async fn find_by_id(&self, id: i32) -> Result<Option<ServiceOrder>, AppError> {
        let state = self.state.lock().await;
        Ok(state.orders.get(id))
    }

    async fn list(&self) -> Result<Vec<ServiceOrder>, AppError> {
        let state = self.state.lock().await;
        Ok(state.orders.values().cloned().collect())
    }

    async fn search(&self, filter: &OrderFilter) -> Result<Vec<ServiceOrder>, AppError> {
        let state = self.state.lock().await;
        Ok(state.orders.values().filter(|o| filter.matches(o)).cloned().collect())
    }

    async fn lines_for(&self, order_ids: &[i32]) -> Result<Vec<OrderLineDetail>, AppError> {
        let state = self.state.lock().await;
        Ok(state.line_details(order_ids))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut state = self.state.lock().await;
        if !state.orders.remove(id) {
            return Ok(false);
        }
        state.lines.retain(|key, _| key.order_id != id);
        Ok(true)
    }

    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryOrderTransaction { guard, working }))
    }
}

/// Segura o lock do store durante a transação e trabalha numa cópia.
/// O commit troca o estado; descartar a transação mantém o original.
pub struct MemoryOrderTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl OrderTransaction for MemoryOrderTransaction {
    async fn client_exists(&mut self, client_id: i32) -> Result<bool, AppError> {
        Ok(self.working.clients.contains(client_id))
    }

    async fn find_product(&mut self, product_id: i32) -> Result<Option<Product>, AppError> {
        Ok(self.working.products.get(product_id))
    }

    async fn save_order(
        &mut self,
        id: Option<i32>,
        data: ServiceOrderData,
    ) -> Result<ServiceOrder, AppError> {
        self.working.save_order(id, data)
    }

    async fn upsert_line(&mut self, line: OrderLine) -> Result<OrderLine, AppError> {
        if !self.working.orders.contains(line.order_id) {
            return Err(AppError::NotFound(format!("Ordem de serviço {}", line.order_id)));
        }
        if !self.working.products.contains(line.product_id) {
            return Err(AppError::NotFound(format!("Produto {}", line.product_id)));
        }
        self.working.lines.insert(line.key(), line.clone());
        Ok(line)
    }

    async fn lines_for(&mut self, order_id: i32) -> Result<Vec<OrderLineDetail>, AppError> {
        Ok(self.working.line_details(&[order_id]))
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryOrderTransaction { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        client::ClientPayload, product::ProductPayload, service_order::ProductionStatus,
    };
    use rust_decimal::Decimal;

    fn client_store(store: &MemoryStore) -> &dyn EntityStore<Client> {
        store
    }

    fn product_store(store: &MemoryStore) -> &dyn EntityStore<Product> {
        store
    }

    fn client(name: &str) -> ClientPayload {
        ClientPayload { name: name.into(), tax_id: None, phone: None, email: None }
    }

    fn order_data(client_id: Option<i32>) -> ServiceOrderData {
        ServiceOrderData {
            description: None,
            delivery_date: None,
            approved_at: None,
            payment_status: false,
            production_status: ProductionStatus::Queued,
            service_value: Decimal::from(100),
            client_id,
        }
    }

    #[tokio::test]
    async fn assigns_ids_and_replaces_whole_records() {
        let store = MemoryStore::new();
        let clients = client_store(&store);

        let a = clients.save(None, client("A")).await.unwrap();
        let b = clients.save(None, client("B")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        let mut replacement = client("A2");
        replacement.email = Some("a2@x.com".into());
        let updated = clients.save(Some(a.id), replacement).await.unwrap();
        assert_eq!(updated.name, "A2");
        assert_eq!(updated.email.as_deref(), Some("a2@x.com"));

        let names: Vec<_> = clients.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["A2", "B"]);
    }

    #[tokio::test]
    async fn replacing_a_missing_id_is_not_found() {
        let store = MemoryStore::new();
        let err = client_store(&store).save(Some(42), client("X")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_reports_absence_and_protects_referenced_client() {
        let store = MemoryStore::new();
        let clients = client_store(&store);
        let c = clients.save(None, client("A")).await.unwrap();

        let mut tx = ServiceOrderStore::begin(&store).await.unwrap();
        tx.save_order(None, order_data(Some(c.id))).await.unwrap();
        tx.commit().await.unwrap();

        let err = clients.delete(c.id).await.unwrap_err();
        assert!(matches!(err, AppError::ResourceInUse(_)));
        assert!(!clients.delete(999).await.unwrap());
    }

    #[tokio::test]
    async fn dropped_transaction_leaves_no_trace() {
        let store = MemoryStore::new();
        {
            let mut tx = ServiceOrderStore::begin(&store).await.unwrap();
            tx.save_order(None, order_data(None)).await.unwrap();
        }
        assert!(ServiceOrderStore::list(&store).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_an_order_cascades_to_its_lines() {
        let store = MemoryStore::new();
        let p = product_store(&store)
            .save(None, ProductPayload { name: "Chapa".into(), input_weight: None, output_weight: None })
            .await
            .unwrap();

        let mut tx = ServiceOrderStore::begin(&store).await.unwrap();
        let order = tx.save_order(None, order_data(None)).await.unwrap();
        tx.upsert_line(OrderLine { order_id: order.id, product_id: p.id, quantity: 2 })
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(product_store(&store).delete(p.id).await.is_err());
        assert!(ServiceOrderStore::delete(&store, order.id).await.unwrap());
        assert!(store.lines_for(&[order.id]).await.unwrap().is_empty());
        assert!(product_store(&store).delete(p.id).await.unwrap());
    }
}
