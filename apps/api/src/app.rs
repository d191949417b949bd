use crate::{
    auth::TokenVerifier,
    config::{Config, StoreBackend},
    error::Result,
    routes::{api_routes, json_config},
    services::SearchHistoryService,
    store::{HistoryStore, MemoryHistoryStore, PgHistoryStore},
};
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use log::{info, warn};
use std::{net::TcpListener, sync::Arc};

pub struct Application {
    port: u16,
    host: String,
    config: Config,
}

impl Application {
    /// Create a new application instance
    pub fn new(config: &Config) -> Self {
        Self {
            port: config.port,
            host: config.host.clone(),
            config: config.clone(),
        }
    }

    /// Build and run the server
    pub async fn run(&self) -> Result<()> {
        let bind_address = format!("{}:{}", self.host, self.port);
        let listener = TcpListener::bind(&bind_address)?;
        info!("Server is running on http://{}", bind_address);

        self.run_with_listener(listener).await
    }

    /// Serve on an already-bound listener.
    pub async fn run_with_listener(&self, listener: TcpListener) -> Result<()> {
        let store = open_store(&self.config).await?;

        let verifier = web::Data::new(TokenVerifier::new(&self.config.jwt_secret));
        let search_history_service = web::Data::new(SearchHistoryService::new(store));
        let json_limit = self.config.json_limit;

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header();

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .app_data(json_config(json_limit))
                .app_data(verifier.clone())
                .app_data(search_history_service.clone())
                .configure(api_routes)
        })
        .listen(listener)?
        .run()
        .await?;

        Ok(())
    }
}

async fn open_store(config: &Config) -> Result<Arc<dyn HistoryStore>> {
    match config.store_backend() {
        StoreBackend::Postgres(url) => {
            let store = PgHistoryStore::connect(&url, config.database_max_connections)
                .await
                .context("Failed to connect to the search history database")?;
            info!("Connected to PostgreSQL search history store");
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory search history store; records are lost on restart");
            Ok(Arc::new(MemoryHistoryStore::new()))
        }
    }
}
