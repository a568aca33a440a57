// src/models/product.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::{common::validation::validate_weight, db::store::Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "Chapa de aço 3mm")]
    pub name: String,
    // Peso bruto recebido e peso final após o processo (kg)
    #[schema(example = "12.50")]
    pub input_weight: Option<Decimal>,
    #[schema(example = "11.80")]
    pub output_weight: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, max = 255, message = "O nome do produto deve ter entre 1 e 255 caracteres."))]
    #[schema(example = "Chapa de aço 3mm")]
    pub name: String,

    #[validate(custom(function = "validate_weight"))]
    #[schema(example = "12.50")]
    pub input_weight: Option<Decimal>,

    #[validate(custom(function = "validate_weight"))]
    #[schema(example = "11.80")]
    pub output_weight: Option<Decimal>,
}

impl Record for Product {
    type Data = ProductPayload;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_data(id: i32, data: ProductPayload) -> Self {
        Self {
            id,
            name: data.name,
            input_weight: data.input_weight,
            output_weight: data.output_weight,
        }
    }
}
