//! Generic CRUD REST backend: paginated, searchable and sortable listings
//! plus create, update, delete and autocompletion over registered resources.

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, middleware, web};

#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "data")]
use crate::domain::field::Resource;
#[cfg(feature = "data")]
use crate::domain::item::Item;
#[cfg(feature = "data")]
use crate::domain::metadata::{ResourceOverrides, ResourceRegistry};
#[cfg(feature = "data")]
use crate::domain::permission::PermissionRegistry;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "data")]
use crate::query::errors::QueryError;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;
#[cfg(feature = "server")]
use crate::routes::api::resource_scope;

#[cfg(feature = "data")]
pub mod db;
#[cfg(feature = "data")]
pub mod domain;
#[cfg(feature = "data")]
pub mod dto;
#[cfg(feature = "data")]
pub mod models;
#[cfg(feature = "data")]
pub mod query;
#[cfg(feature = "data")]
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
#[cfg(feature = "data")]
pub mod schema;
#[cfg(feature = "data")]
pub mod services;

/// Shared handler state: who may do what, and the resources on offer.
#[cfg(feature = "data")]
#[derive(Debug)]
pub struct AppState {
    pub permissions: PermissionRegistry,
    pub resources: ResourceRegistry,
}

#[cfg(feature = "data")]
impl AppState {
    /// Registers the bundled resources, applying `overrides` keyed by table.
    pub fn new(
        permissions: PermissionRegistry,
        overrides: &std::collections::HashMap<String, ResourceOverrides>,
    ) -> Result<Self, QueryError> {
        let mut resources = ResourceRegistry::new();
        resources.register::<Item>(overrides.get(Item::TABLE))?;

        Ok(Self {
            permissions,
            resources,
        })
    }
}

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    let permissions = PermissionRegistry::from_grants(&server_config.permissions);
    let state = AppState::new(permissions, &server_config.resources)
        .map_err(|e| std::io::Error::other(format!("Invalid resource configuration: {e}")))?;
    let state = web::Data::new(state);

    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = web::Data::new(DieselRepository::new(pool));

    let bind_address = (server_config.address.clone(), server_config.port);
    let api_prefix = server_config.api_prefix.clone();

    log::info!("Serving resources under {api_prefix} on {bind_address:?}");

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .service(web::scope(&api_prefix).service(resource_scope::<Item>()))
            .app_data(repo.clone())
            .app_data(state.clone())
    })
    .bind(bind_address)?
    .run()
    .await
}
