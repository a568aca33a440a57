// src/services/order_service.rs

use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;

use crate::{
    common::error::AppError,
    db::store::ServiceOrderStore,
    models::service_order::{
        OrderLine, OrderLineDetail, OrderLineKey, OrderSearchParams, SaveOrderPayload,
        ServiceOrder, ServiceOrderDetail,
    },
    services::order_filter::OrderFilter,
};

#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn ServiceOrderStore>,
}

impl OrderService {
    pub fn new(store: Arc<dyn ServiceOrderStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: i32) -> Result<ServiceOrderDetail, AppError> {
        let order = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ordem de serviço {}", id)))?;

        let lines = self.store.lines_for(&[id]).await?;
        Ok(ServiceOrderDetail { order, lines })
    }

    pub async fn list(&self) -> Result<Vec<ServiceOrderDetail>, AppError> {
        let orders = self.store.list().await?;
        self.attach_lines(orders).await
    }

    /// Busca avançada: todos os filtros informados combinados com AND.
    pub async fn search(&self, params: &OrderSearchParams) -> Result<Vec<ServiceOrderDetail>, AppError> {
        let filter = OrderFilter::from_params(params)?;
        tracing::debug!("Busca de OS com {} predicado(s)", filter.predicates().len());

        let orders = self.store.search(&filter).await?;
        self.attach_lines(orders).await
    }

    /// Grava a OS e faz upsert dos seus itens numa única transação.
    ///
    /// Itens que não vierem no payload continuam gravados (upsert, não
    /// sincronização). Produto ou cliente inexistente aborta tudo.
    pub async fn save(
        &self,
        id: Option<i32>,
        payload: SaveOrderPayload,
    ) -> Result<ServiceOrderDetail, AppError> {
        let (mut data, requested_lines) = payload.into_parts();

        // OS nova sem data de aprovação recebe o horário atual
        if id.is_none() && data.approved_at.is_none() {
            data.approved_at = Some(Utc::now());
        }

        let mut tx = self.store.begin().await?;

        if let Some(client_id) = data.client_id {
            if !tx.client_exists(client_id).await? {
                return Err(AppError::NotFound(format!("Cliente {}", client_id)));
            }
        }

        // 1. A OS primeiro, para ter o id definitivo
        let order = tx.save_order(id, data).await?;

        // 2. Um item por (OS, produto); repetido no payload, vale a última quantidade
        let mut lines: BTreeMap<OrderLineKey, i32> = BTreeMap::new();
        for input in requested_lines {
            lines.insert(OrderLineKey::new(order.id, input.product_id), input.quantity);
        }

        for (key, quantity) in lines {
            if tx.find_product(key.product_id).await?.is_none() {
                // Sem commit: o drop da transação desfaz a OS também
                return Err(AppError::NotFound(format!("Produto {}", key.product_id)));
            }
            tx.upsert_line(OrderLine {
                order_id: key.order_id,
                product_id: key.product_id,
                quantity,
            })
            .await?;
        }

        // 3. Devolve a OS com todos os itens que ela tem agora
        let lines = tx.lines_for(order.id).await?;
        tx.commit().await?;

        tracing::info!("📋 OS {} gravada com {} item(ns).", order.id, lines.len());
        Ok(ServiceOrderDetail { order, lines })
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if !self.store.delete(id).await? {
            return Err(AppError::NotFound(format!("Ordem de serviço {}", id)));
        }
        tracing::info!("🗑️ OS {} removida.", id);
        Ok(())
    }

    async fn attach_lines(&self, orders: Vec<ServiceOrder>) -> Result<Vec<ServiceOrderDetail>, AppError> {
        let ids: Vec<i32> = orders.iter().map(|o| o.id).collect();

        let mut by_order: BTreeMap<i32, Vec<OrderLineDetail>> = BTreeMap::new();
        for line in self.store.lines_for(&ids).await? {
            by_order.entry(line.line.order_id).or_default().push(line);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let lines = by_order.remove(&order.id).unwrap_or_default();
                ServiceOrderDetail { order, lines }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{store::EntityStore, MemoryStore},
        models::{
            client::{Client, ClientPayload},
            product::{Product, ProductPayload},
            service_order::{OrderLineInput, ProductionStatus},
        },
    };
    use chrono::{NaiveDate, TimeZone};
    use rust_decimal::Decimal;

    struct Fixture {
        store: Arc<MemoryStore>,
        service: OrderService,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let service = OrderService::new(store.clone());
            Self { store, service }
        }

        async fn product(&self, name: &str) -> Product {
            EntityStore::<Product>::save(
                self.store.as_ref(),
                None,
                ProductPayload { name: name.into(), input_weight: None, output_weight: None },
            )
            .await
            .unwrap()
        }

        async fn client(&self, name: &str) -> Client {
            EntityStore::<Client>::save(
                self.store.as_ref(),
                None,
                ClientPayload { name: name.into(), tax_id: None, phone: None, email: None },
            )
            .await
            .unwrap()
        }
    }

    fn payload(value: i64, lines: &[(i32, i32)]) -> SaveOrderPayload {
        SaveOrderPayload {
            description: Some("Corte de chapa".into()),
            delivery_date: NaiveDate::from_ymd_opt(2025, 5, 10),
            approved_at: None,
            payment_status: false,
            production_status: None,
            service_value: Decimal::from(value),
            client_id: None,
            lines: lines
                .iter()
                .map(|&(product_id, quantity)| OrderLineInput { product_id, quantity })
                .collect(),
        }
    }

    #[tokio::test]
    async fn creates_one_line_per_requested_product() {
        let fx = Fixture::new();
        let a = fx.product("Chapa").await;
        let b = fx.product("Tubo").await;
        let c = fx.product("Barra").await;

        let saved = fx
            .service
            .save(None, payload(500, &[(a.id, 2), (b.id, 1), (c.id, 7)]))
            .await
            .unwrap();

        assert_eq!(saved.lines.len(), 3);
        for line in &saved.lines {
            assert_eq!(line.line.order_id, saved.order.id);
        }
        let keys: Vec<_> = saved.lines.iter().map(|l| (l.line.product_id, l.line.quantity)).collect();
        assert_eq!(keys, vec![(a.id, 2), (b.id, 1), (c.id, 7)]);
        assert_eq!(saved.lines[1].product_name, "Tubo");
        assert_eq!(saved.order.production_status, ProductionStatus::Queued);
        assert!(saved.order.approved_at.is_some());

        assert_eq!(fx.service.get(saved.order.id).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn unknown_product_rolls_back_the_whole_order() {
        let fx = Fixture::new();
        let a = fx.product("Chapa").await;

        let err = fx
            .service
            .save(None, payload(100, &[(a.id, 1), (999, 3)]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert!(fx.service.list().await.unwrap().is_empty());
        assert!(fx.store.lines_for(&[1]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_client_is_rejected_before_anything_is_written() {
        let fx = Fixture::new();
        let mut p = payload(100, &[]);
        p.client_id = Some(77);

        assert!(matches!(fx.service.save(None, p).await, Err(AppError::NotFound(_))));
        assert!(fx.service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn resaving_upserts_and_keeps_missing_lines() {
        let fx = Fixture::new();
        let a = fx.product("Chapa").await;
        let b = fx.product("Tubo").await;
        let client = fx.client("Metalúrgica").await;

        let mut first = payload(100, &[(a.id, 1), (b.id, 2)]);
        first.client_id = Some(client.id);
        let saved = fx.service.save(None, first).await.unwrap();
        let id = saved.order.id;

        // Só o produto A, com nova quantidade: B continua lá
        let resaved = fx.service.save(Some(id), payload(150, &[(a.id, 5)])).await.unwrap();
        let lines: Vec<_> = resaved.lines.iter().map(|l| (l.line.product_id, l.line.quantity)).collect();
        assert_eq!(lines, vec![(a.id, 5), (b.id, 2)]);
        assert_eq!(resaved.order.service_value, Decimal::from(150));
        // Substituição completa: o cliente não veio no payload
        assert_eq!(resaved.order.client_id, None);

        // Lista vazia não dá erro
        let empty = fx.service.save(Some(id), payload(150, &[])).await.unwrap();
        assert_eq!(empty.lines.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_products_in_one_request_collapse_to_last_quantity() {
        let fx = Fixture::new();
        let a = fx.product("Chapa").await;

        let saved = fx.service.save(None, payload(100, &[(a.id, 1), (a.id, 9)])).await.unwrap();
        assert_eq!(saved.lines.len(), 1);
        assert_eq!(saved.lines[0].line.quantity, 9);
    }

    #[tokio::test]
    async fn supplied_approval_date_is_kept_and_missing_id_is_not_found() {
        let fx = Fixture::new();
        let approved = Utc.with_ymd_and_hms(2024, 12, 1, 9, 30, 0).unwrap();

        let mut p = payload(100, &[]);
        p.approved_at = Some(approved);
        let saved = fx.service.save(None, p).await.unwrap();
        assert_eq!(saved.order.approved_at, Some(approved));

        assert!(matches!(
            fx.service.save(Some(404), payload(1, &[])).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn search_returns_matching_orders_with_lines() {
        let fx = Fixture::new();
        let a = fx.product("Chapa").await;
        for value in [10, 20, 30] {
            fx.service.save(None, payload(value, &[(a.id, 1)])).await.unwrap();
        }

        let found = fx
            .service
            .search(&OrderSearchParams {
                value_min: Some(Decimal::from(15)),
                value_max: Some(Decimal::from(25)),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].order.service_value, Decimal::from(20));
        assert_eq!(found[0].lines.len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_order_and_lines() {
        let fx = Fixture::new();
        let a = fx.product("Chapa").await;
        let saved = fx.service.save(None, payload(10, &[(a.id, 1)])).await.unwrap();

        fx.service.delete(saved.order.id).await.unwrap();
        assert!(matches!(fx.service.get(saved.order.id).await, Err(AppError::NotFound(_))));
        assert!(fx.store.lines_for(&[saved.order.id]).await.unwrap().is_empty());
        assert!(matches!(fx.service.delete(saved.order.id).await, Err(AppError::NotFound(_))));
    }
}
