// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{bail, Context};
use axum::http::HeaderValue;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{ClientRepository, EmployeeRepository, MemoryStore, OrderRepository, ProductRepository},
    models::{client::Client, product::Product},
    services::{
        auth::AuthService, crud_service::CrudService, employee_service::EmployeeService,
        order_service::OrderService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" => Ok(StorageBackend::Postgres),
            "memory" => Ok(StorageBackend::Memory),
            other => bail!("STORAGE_BACKEND desconhecido: '{}' (use postgres ou memory)", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub cors_origin: HeaderValue,
    pub bcrypt_cost: u32,
}

impl Settings {
    /// Lê as variáveis de ambiente (o .env já foi carregado no main).
    pub fn from_env() -> anyhow::Result<Self> {
        let storage_backend: StorageBackend = var_or("STORAGE_BACKEND", StorageBackend::Postgres)?;

        let database_url = env::var("DATABASE_URL").ok();
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL deve ser definida");
        }

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let cors_origin = env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".into());
        let cors_origin = cors_origin
            .parse::<HeaderValue>()
            .with_context(|| format!("CORS_ORIGIN inválido: {}", cors_origin))?;

        Ok(Self {
            storage_backend,
            database_url,
            database_max_connections: var_or("DATABASE_MAX_CONNECTIONS", 5)?,
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            cors_origin,
            bcrypt_cost: var_or("BCRYPT_COST", 10)?,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            storage_backend: StorageBackend::Memory,
            database_url: None,
            database_max_connections: 1,
            jwt_secret: "segredo-de-teste".into(),
            bind_addr: "127.0.0.1:0".into(),
            cors_origin: HeaderValue::from_static("http://localhost:3000"),
            bcrypt_cost: 4,
        }
    }
}

fn var_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{} inválido ('{}'): {}", key, raw, e)),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub client_service: CrudService<Client>,
    pub product_service: CrudService<Product>,
    pub employee_service: EmployeeService,
    pub auth_service: AuthService,
    pub order_service: OrderService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        if settings.storage_backend == StorageBackend::Memory {
            tracing::warn!("⚠️ Usando armazenamento em memória: nada será persistido.");
            return Ok(Self::in_memory(settings));
        }

        let database_url = settings
            .database_url
            .as_deref()
            .context("DATABASE_URL deve ser definida")?;

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!()
            .run(&db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados")?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        // --- Monta o gráfico de dependências ---
        let employee_repo = Arc::new(EmployeeRepository::new(db_pool.clone()));

        Ok(Self {
            client_service: CrudService::<Client>::new(
                Arc::new(ClientRepository::new(db_pool.clone())),
                "Cliente",
            ),
            product_service: CrudService::<Product>::new(
                Arc::new(ProductRepository::new(db_pool.clone())),
                "Produto",
            ),
            employee_service: EmployeeService::new(employee_repo.clone(), settings.bcrypt_cost),
            auth_service: AuthService::new(employee_repo, settings.jwt_secret.clone()),
            order_service: OrderService::new(Arc::new(OrderRepository::new(db_pool))),
            settings: Arc::new(settings),
        })
    }

    // Todos os serviços sobre o mesmo store, como o banco faria
    pub fn in_memory(settings: Settings) -> Self {
        let store = Arc::new(MemoryStore::new());

        Self {
            client_service: CrudService::<Client>::new(store.clone(), "Cliente"),
            product_service: CrudService::<Product>::new(store.clone(), "Produto"),
            employee_service: EmployeeService::new(store.clone(), settings.bcrypt_cost),
            auth_service: AuthService::new(store.clone(), settings.jwt_secret.clone()),
            order_service: OrderService::new(store),
            settings: Arc::new(settings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_backend_parses_known_names() {
        assert_eq!("Postgres".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
        assert_eq!(" memory ".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("sqlite".parse::<StorageBackend>().is_err());
    }
}
