// src/services/order_filter.rs
//
// Filtro dinâmico da busca avançada de OS. Cada predicado é um dado simples:
// o Postgres recebe o WHERE gerado e o store em memória avalia `matches`.
// As duas formas precisam concordar.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::service_order::{OrderSearchParams, ProductionStatus, ServiceOrder},
};

#[derive(Debug, Clone, PartialEq)]
pub enum OrderPredicate {
    DeliveryFrom(NaiveDate),
    DeliveryUntil(NaiveDate),
    ValueMin(Decimal),
    ValueMax(Decimal),
    PaymentStatus(bool),
    ProductionStatus(ProductionStatus),
    /// Trecho já em minúsculas
    DescriptionContains(String),
}

impl OrderPredicate {
    /// Coluna nula nunca satisfaz o predicado, igual ao SQL.
    pub fn matches(&self, order: &ServiceOrder) -> bool {
        match self {
            OrderPredicate::DeliveryFrom(start) => order.delivery_date.is_some_and(|d| d >= *start),
            OrderPredicate::DeliveryUntil(end) => order.delivery_date.is_some_and(|d| d <= *end),
            OrderPredicate::ValueMin(min) => order.service_value >= *min,
            OrderPredicate::ValueMax(max) => order.service_value <= *max,
            OrderPredicate::PaymentStatus(paid) => order.payment_status == *paid,
            OrderPredicate::ProductionStatus(status) => order.production_status == *status,
            OrderPredicate::DescriptionContains(needle) => order
                .description
                .as_deref()
                .is_some_and(|text| text.to_lowercase().contains(needle.as_str())),
        }
    }

    fn push_sql(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            OrderPredicate::DeliveryFrom(start) => {
                builder.push("delivery_date >= ").push_bind(*start);
            }
            OrderPredicate::DeliveryUntil(end) => {
                builder.push("delivery_date <= ").push_bind(*end);
            }
            OrderPredicate::ValueMin(min) => {
                builder.push("service_value >= ").push_bind(*min);
            }
            OrderPredicate::ValueMax(max) => {
                builder.push("service_value <= ").push_bind(*max);
            }
            OrderPredicate::PaymentStatus(paid) => {
                builder.push("payment_status = ").push_bind(*paid);
            }
            OrderPredicate::ProductionStatus(status) => {
                builder.push("production_status = ").push_bind(*status);
            }
            OrderPredicate::DescriptionContains(needle) => {
                builder
                    .push("LOWER(description) LIKE ")
                    .push_bind(format!("%{}%", escape_like(needle)))
                    .push(" ESCAPE '\\'");
            }
        }
    }
}

// %, _ e \ digitados pelo usuário são literais
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Conjunção de predicados. Sem predicados, tudo passa.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    predicates: Vec<OrderPredicate>,
}

impl OrderFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, predicate: OrderPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[OrderPredicate] {
        &self.predicates
    }

    pub fn matches(&self, order: &ServiceOrder) -> bool {
        self.predicates.iter().all(|p| p.matches(order))
    }

    /// Acrescenta ` WHERE a AND b ...` ao builder. Nada quando vazio.
    pub fn push_where(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            builder.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_sql(builder);
        }
    }

    /// Monta o filtro a partir dos parâmetros da busca. Status de produção
    /// desconhecido é ignorado; intervalos invertidos são rejeitados.
    pub fn from_params(params: &OrderSearchParams) -> Result<Self, AppError> {
        if let (Some(start), Some(end)) = (params.delivery_from, params.delivery_until) {
            if start > end {
                return Err(AppError::InvalidArgument(format!(
                    "deliveryFrom ({}) é posterior a deliveryUntil ({}).",
                    start, end
                )));
            }
        }
        if let (Some(min), Some(max)) = (params.value_min, params.value_max) {
            if min > max {
                return Err(AppError::InvalidArgument(format!(
                    "valueMin ({}) é maior que valueMax ({}).",
                    min, max
                )));
            }
        }

        if params.order_id.is_some()
            || params.client_name.is_some()
            || params.client_tax_id.is_some()
            || params.approved_at.is_some()
        {
            tracing::debug!(
                order_id = ?params.order_id,
                client_name = ?params.client_name,
                client_tax_id = ?params.client_tax_id,
                approved_at = ?params.approved_at,
                "Parâmetros de busca aceitos mas não aplicados"
            );
        }

        let mut filter = OrderFilter::new();

        if let Some(start) = params.delivery_from {
            filter = filter.and(OrderPredicate::DeliveryFrom(start));
        }
        if let Some(end) = params.delivery_until {
            filter = filter.and(OrderPredicate::DeliveryUntil(end));
        }
        if let Some(min) = params.value_min {
            filter = filter.and(OrderPredicate::ValueMin(min));
        }
        if let Some(max) = params.value_max {
            filter = filter.and(OrderPredicate::ValueMax(max));
        }
        if let Some(paid) = params.payment_status {
            filter = filter.and(OrderPredicate::PaymentStatus(paid));
        }
        if let Some(token) = params.production_status.as_deref().filter(|t| !t.trim().is_empty()) {
            match token.parse::<ProductionStatus>() {
                Ok(status) => filter = filter.and(OrderPredicate::ProductionStatus(status)),
                Err(_) => tracing::debug!(token, "Status de produção desconhecido, filtro ignorado"),
            }
        }
        if let Some(text) = params.description.as_deref().filter(|t| !t.trim().is_empty()) {
            filter = filter.and(OrderPredicate::DescriptionContains(text.to_lowercase()));
        }

        Ok(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: i32, value: i64, description: &str) -> ServiceOrder {
        ServiceOrder {
            id,
            description: Some(description.to_string()),
            delivery_date: NaiveDate::from_ymd_opt(2025, 1, id as u32),
            approved_at: None,
            payment_status: id % 2 == 0,
            production_status: ProductionStatus::Queued,
            service_value: Decimal::from(value),
            client_id: None,
        }
    }

    fn run(filter: &OrderFilter, orders: &[ServiceOrder]) -> Vec<i32> {
        orders.iter().filter(|o| filter.matches(o)).map(|o| o.id).collect()
    }

    #[test]
    fn value_range_keeps_only_the_middle_order() {
        let orders = vec![order(1, 10, "a"), order(2, 20, "b"), order(3, 30, "c")];
        let params = OrderSearchParams {
            value_min: Some(Decimal::from(15)),
            value_max: Some(Decimal::from(25)),
            ..Default::default()
        };

        let filter = OrderFilter::from_params(&params).unwrap();
        assert_eq!(run(&filter, &orders), vec![2]);
    }

    #[test]
    fn description_is_case_insensitive_substring() {
        let orders = vec![order(1, 10, "Corte de chapa"), order(2, 10, "Dobra")];

        let corte = OrderFilter::from_params(&OrderSearchParams {
            description: Some("corte".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(run(&corte, &orders), vec![1]);

        let solda = OrderFilter::from_params(&OrderSearchParams {
            description: Some("solda".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(run(&solda, &orders).is_empty());
    }

    #[test]
    fn unknown_production_status_is_ignored() {
        let mut orders = vec![order(1, 10, "a"), order(2, 20, "b")];
        orders[1].production_status = ProductionStatus::Ready;

        let unknown = OrderFilter::from_params(&OrderSearchParams {
            production_status: Some("XYZ".into()),
            ..Default::default()
        })
        .unwrap();
        let omitted = OrderFilter::from_params(&OrderSearchParams::default()).unwrap();

        assert!(unknown.predicates().is_empty());
        assert_eq!(run(&unknown, &orders), run(&omitted, &orders));

        let ready = OrderFilter::from_params(&OrderSearchParams {
            production_status: Some("pronto".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(run(&ready, &orders), vec![2]);
    }

    #[test]
    fn delivery_range_and_payment_are_combined_with_and() {
        let orders: Vec<_> = (1..=6).map(|i| order(i, 10, "x")).collect();
        let filter = OrderFilter::from_params(&OrderSearchParams {
            delivery_from: NaiveDate::from_ymd_opt(2025, 1, 2),
            delivery_until: NaiveDate::from_ymd_opt(2025, 1, 5),
            payment_status: Some(true),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(run(&filter, &orders), vec![2, 4]);
    }

    #[test]
    fn missing_delivery_date_never_matches_a_date_bound() {
        let mut o = order(1, 10, "x");
        o.delivery_date = None;
        let filter = OrderFilter::new().and(OrderPredicate::DeliveryUntil(
            NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        ));
        assert!(!filter.matches(&o));
    }

    #[test]
    fn unwired_parameters_do_not_filter() {
        let filter = OrderFilter::from_params(&OrderSearchParams {
            order_id: Some(99),
            client_name: Some("Acme".into()),
            client_tax_id: Some("00.000.000/0001-00".into()),
            approved_at: Some("2025-03-20".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(filter.predicates().is_empty());
    }

    #[test]
    fn blank_description_and_status_are_skipped() {
        let filter = OrderFilter::from_params(&OrderSearchParams {
            description: Some("   ".into()),
            production_status: Some(" ".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(filter.predicates().is_empty());

        let orders = vec![order(1, 10, "Corte de chapa"), order(2, 20, "Solda")];
        assert_eq!(run(&filter, &orders), vec![1, 2]);
    }

    #[test]
    fn inverted_ranges_are_rejected() {
        let err = OrderFilter::from_params(&OrderSearchParams {
            value_min: Some(Decimal::from(50)),
            value_max: Some(Decimal::from(10)),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));

        let err = OrderFilter::from_params(&OrderSearchParams {
            delivery_from: NaiveDate::from_ymd_opt(2025, 2, 1),
            delivery_until: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
    }

    #[test]
    fn renders_where_clause_with_bound_parameters() {
        let filter = OrderFilter::from_params(&OrderSearchParams {
            value_min: Some(Decimal::from(15)),
            payment_status: Some(false),
            production_status: Some("fila".into()),
            description: Some("50%_off".into()),
            ..Default::default()
        })
        .unwrap();

        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM service_orders");
        filter.push_where(&mut builder);

        assert_eq!(
            builder.sql(),
            "SELECT id FROM service_orders WHERE service_value >= $1 AND payment_status = $2 \
             AND production_status = $3 AND LOWER(description) LIKE $4 ESCAPE '\\'"
        );
    }

    #[test]
    fn empty_filter_renders_no_where() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT id FROM service_orders");
        OrderFilter::new().push_where(&mut builder);
        assert_eq!(builder.sql(), "SELECT id FROM service_orders");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }
}
