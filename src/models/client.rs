// src/models/client.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::db::store::Record;

// Cliente não embute suas ordens de serviço: a referência vive só na OS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Metalúrgica Paulista LTDA")]
    pub name: String,
    #[schema(example = "12.345.678/0001-90")]
    pub tax_id: Option<String>,
    #[schema(example = "(11) 4002-8922")]
    pub phone: Option<String>,
    #[schema(example = "compras@paulista.com.br")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    #[validate(length(min = 1, max = 255, message = "O nome do cliente deve ter entre 1 e 255 caracteres."))]
    #[schema(example = "Metalúrgica Paulista LTDA")]
    pub name: String,

    #[validate(length(min = 14, max = 18, message = "CNPJ inválido."))]
    #[schema(example = "12.345.678/0001-90")]
    pub tax_id: Option<String>,

    #[validate(length(max = 30, message = "Telefone muito longo."))]
    #[schema(example = "(11) 4002-8922")]
    pub phone: Option<String>,

    #[validate(
        email(message = "O e-mail fornecido é inválido."),
        length(max = 255, message = "E-mail muito longo.")
    )]
    #[schema(example = "compras@paulista.com.br")]
    pub email: Option<String>,
}

impl Record for Client {
    type Data = ClientPayload;

    fn id(&self) -> i32 {
        self.id
    }

    fn from_data(id: i32, data: ClientPayload) -> Self {
        Self {
            id,
            name: data.name,
            tax_id: data.tax_id,
            phone: data.phone,
            email: data.email,
        }
    }
}
