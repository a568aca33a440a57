// src/db/store.rs
//
// Contratos de persistência. Os serviços só conhecem estes traits;
// Postgres e memória são implementações intercambiáveis.

use async_trait::async_trait;

use crate::{
    common::error::AppError,
    models::{
        auth::Employee,
        product::Product,
        service_order::{OrderLine, OrderLineDetail, ServiceOrder, ServiceOrderData},
    },
    services::order_filter::OrderFilter,
};

/// Registro com id atribuído pelo store e um conjunto de dados substituível.
pub trait Record: Clone + Send + Sync + 'static {
    type Data: Clone + Send + Sync + 'static;

    fn id(&self) -> i32;
    fn from_data(id: i32, data: Self::Data) -> Self;
}

/// CRUD por chave. `save` insere quando não há id e substitui o registro
/// inteiro quando há (NotFound se o id não existir). Sem controle de
/// concorrência: o último a gravar vence.
#[async_trait]
pub trait EntityStore<R: Record>: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<R>, AppError>;
    async fn list(&self) -> Result<Vec<R>, AppError>;
    async fn save(&self, id: Option<i32>, data: R::Data) -> Result<R, AppError>;
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
}

#[async_trait]
pub trait EmployeeStore: EntityStore<Employee> {
    async fn find_by_username(&self, username: &str) -> Result<Option<Employee>, AppError>;
}

#[async_trait]
pub trait ServiceOrderStore: Send + Sync {
    async fn find_by_id(&self, id: i32) -> Result<Option<ServiceOrder>, AppError>;
    async fn list(&self) -> Result<Vec<ServiceOrder>, AppError>;
    async fn search(&self, filter: &OrderFilter) -> Result<Vec<ServiceOrder>, AppError>;
    /// Itens de várias OS de uma vez, ordenados por (order_id, product_id).
    async fn lines_for(&self, order_ids: &[i32]) -> Result<Vec<OrderLineDetail>, AppError>;
    /// Remove a OS e, em cascata, os seus itens.
    async fn delete(&self, id: i32) -> Result<bool, AppError>;
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>, AppError>;
}

/// Unidade de trabalho da gravação de uma OS. Nada fica visível antes de
/// `commit`; descartar a transação desfaz tudo.
#[async_trait]
pub trait OrderTransaction: Send {
    async fn client_exists(&mut self, client_id: i32) -> Result<bool, AppError>;
    async fn find_product(&mut self, product_id: i32) -> Result<Option<Product>, AppError>;
    async fn save_order(
        &mut self,
        id: Option<i32>,
        data: ServiceOrderData,
    ) -> Result<ServiceOrder, AppError>;
    /// Insere o par (OS, produto) ou substitui a quantidade se já existir.
    async fn upsert_line(&mut self, line: OrderLine) -> Result<OrderLine, AppError>;
    async fn lines_for(&mut self, order_id: i32) -> Result<Vec<OrderLineDetail>, AppError>;
    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}
