// src/models/service_order.rs

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::common::validation::validate_money;

// --- Enums ---

// Mapeia o CREATE TYPE production_status do banco.
// Os tokens são os mesmos que o frontend já usa.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "production_status")]
pub enum ProductionStatus {
    #[default]
    #[serde(rename = "FILA")]
    #[sqlx(rename = "FILA")]
    Queued,
    #[serde(rename = "PRODUCAO")]
    #[sqlx(rename = "PRODUCAO")]
    InProduction,
    #[serde(rename = "PRONTO")]
    #[sqlx(rename = "PRONTO")]
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProductionStatus(pub String);

impl FromStr for ProductionStatus {
    type Err = UnknownProductionStatus;

    // Sem diferenciar maiúsculas: "pronto", "Pronto" e "PRONTO" são iguais
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FILA" => Ok(ProductionStatus::Queued),
            "PRODUCAO" => Ok(ProductionStatus::InProduction),
            "PRONTO" => Ok(ProductionStatus::Ready),
            _ => Err(UnknownProductionStatus(s.to_string())),
        }
    }
}

// --- Ordem de Serviço ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrder {
    #[schema(example = 1024)]
    pub id: i32,
    #[schema(example = "Corte de chapa 3mm")]
    pub description: Option<String>,
    #[schema(value_type = Option<String>, format = Date, example = "2025-03-20")]
    pub delivery_date: Option<NaiveDate>,
    pub approved_at: Option<DateTime<Utc>>,
    #[schema(example = false)]
    pub payment_status: bool,
    pub production_status: ProductionStatus,
    #[schema(example = "1500.00")]
    pub service_value: Decimal,
    // Apenas a referência por id. O cliente não é embutido.
    #[schema(example = 1)]
    pub client_id: Option<i32>,
}

// Campos gravados da OS (substituição completa no update)
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOrderData {
    pub description: Option<String>,
    pub delivery_date: Option<NaiveDate>,
    pub approved_at: Option<DateTime<Utc>>,
    pub payment_status: bool,
    pub production_status: ProductionStatus,
    pub service_value: Decimal,
    pub client_id: Option<i32>,
}

impl ServiceOrder {
    pub fn from_data(id: i32, data: ServiceOrderData) -> Self {
        Self {
            id,
            description: data.description,
            delivery_date: data.delivery_date,
            approved_at: data.approved_at,
            payment_status: data.payment_status,
            production_status: data.production_status,
            service_value: data.service_value,
            client_id: data.client_id,
        }
    }
}

// --- Itens da OS (associação OS x Produto) ---

// Chave composta da linha. Igualdade por valor, usada como chave de mapa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrderLineKey {
    pub order_id: i32,
    pub product_id: i32,
}

impl OrderLineKey {
    pub fn new(order_id: i32, product_id: i32) -> Self {
        Self { order_id, product_id }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub order_id: i32,
    pub product_id: i32,
    #[schema(example = 4)]
    pub quantity: i32,
}

impl OrderLine {
    pub fn key(&self) -> OrderLineKey {
        OrderLineKey::new(self.order_id, self.product_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub line: OrderLine,
    #[schema(example = "Chapa de aço 3mm")]
    pub product_name: String,
}

// O que a API devolve: cabeçalho da OS + itens resolvidos
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOrderDetail {
    #[serde(flatten)]
    pub order: ServiceOrder,
    pub lines: Vec<OrderLineDetail>,
}

// --- Payloads ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineInput {
    #[schema(example = 7)]
    pub product_id: i32,

    #[validate(range(min = 1, message = "A quantidade deve ser no mínimo 1."))]
    #[schema(example = 4)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveOrderPayload {
    #[validate(length(max = 2000, message = "Descrição muito longa."))]
    #[schema(example = "Corte de chapa 3mm")]
    pub description: Option<String>,

    #[schema(value_type = Option<String>, format = Date, example = "2025-03-20")]
    pub delivery_date: Option<NaiveDate>,

    // Se vier vazio numa OS nova, o servidor usa o horário atual
    pub approved_at: Option<DateTime<Utc>>,

    #[serde(default)]
    #[schema(example = false)]
    pub payment_status: bool,

    #[schema(example = "FILA")]
    pub production_status: Option<ProductionStatus>,

    #[validate(custom(function = "validate_money"))]
    #[schema(example = "1500.00")]
    pub service_value: Decimal,

    #[schema(example = 1)]
    pub client_id: Option<i32>,

    #[serde(default)]
    #[validate(nested)]
    #[schema(example = json!([{"productId": 7, "quantity": 4}]))]
    pub lines: Vec<OrderLineInput>,
}

impl SaveOrderPayload {
    pub fn into_parts(self) -> (ServiceOrderData, Vec<OrderLineInput>) {
        let data = ServiceOrderData {
            description: self.description,
            delivery_date: self.delivery_date,
            approved_at: self.approved_at,
            payment_status: self.payment_status,
            production_status: self.production_status.unwrap_or_default(),
            service_value: self.service_value,
            client_id: self.client_id,
        };
        (data, self.lines)
    }
}

// --- Busca avançada ---

// Todos opcionais. orderId, clientName, clientTaxId e approvedAt são aceitos
// mas não entram no filtro.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderSearchParams {
    pub order_id: Option<i32>,
    pub client_name: Option<String>,
    pub client_tax_id: Option<String>,
    // Só vai para o log: aceita data ("2025-03-20") ou data e hora, sem interpretar
    #[param(example = "2025-03-20")]
    pub approved_at: Option<String>,
    #[param(value_type = Option<String>, format = Date, example = "2025-01-01")]
    pub delivery_from: Option<NaiveDate>,
    #[param(value_type = Option<String>, format = Date, example = "2025-12-31")]
    pub delivery_until: Option<NaiveDate>,
    #[param(value_type = Option<String>, example = "100.00")]
    pub value_min: Option<Decimal>,
    #[param(value_type = Option<String>, example = "5000.00")]
    pub value_max: Option<Decimal>,
    pub payment_status: Option<bool>,
    #[param(example = "PRODUCAO")]
    pub production_status: Option<String>,
    #[param(example = "chapa")]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn production_status_parses_case_insensitively() {
        assert_eq!("pronto".parse::<ProductionStatus>(), Ok(ProductionStatus::Ready));
        assert_eq!(" Producao ".parse::<ProductionStatus>(), Ok(ProductionStatus::InProduction));
        assert_eq!("FILA".parse::<ProductionStatus>(), Ok(ProductionStatus::Queued));
        assert!("XYZ".parse::<ProductionStatus>().is_err());
    }

    #[test]
    fn order_detail_serializes_lines_without_back_reference() {
        let detail = ServiceOrderDetail {
            order: ServiceOrder {
                id: 5,
                description: Some("Dobra".into()),
                delivery_date: NaiveDate::from_ymd_opt(2025, 3, 20),
                approved_at: None,
                payment_status: true,
                production_status: ProductionStatus::InProduction,
                service_value: Decimal::new(150050, 2),
                client_id: Some(2),
            },
            lines: vec![OrderLineDetail {
                line: OrderLine { order_id: 5, product_id: 9, quantity: 3 },
                product_name: "Tubo".into(),
            }],
        };

        let value = serde_json::to_value(&detail).unwrap();
        assert_eq!(value["id"], 5);
        assert_eq!(value["clientId"], 2);
        assert_eq!(value["productionStatus"], "PRODUCAO");
        assert_eq!(value["deliveryDate"], "2025-03-20");
        assert_eq!(value["lines"][0]["productId"], 9);
        assert_eq!(value["lines"][0]["productName"], "Tubo");
        assert!(value.get("client").is_none());
    }

    #[test]
    fn payload_defaults_status_and_lines() {
        let payload: SaveOrderPayload = serde_json::from_value(json!({
            "description": "Solda",
            "serviceValue": 300
        }))
        .unwrap();

        let (data, lines) = payload.into_parts();
        assert_eq!(data.production_status, ProductionStatus::Queued);
        assert!(!data.payment_status);
        assert!(lines.is_empty());
    }
}
