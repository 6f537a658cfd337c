//! Server construction and middleware wiring.

mod config;

pub use config::{AppConfig, ConfigError};

use std::sync::Arc;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi as _;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::{ComplaintLifecycleService, CredentialAccountService};
use crate::inbound::http::accounts::{login, register};
use crate::inbound::http::categories::list_categories;
use crate::inbound::http::complaints::{
    all_complaints, complaint_detail, dashboard_stats, my_complaints, submit_complaint,
    update_status,
};
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;
use crate::middleware::Trace;
use crate::outbound::auth::{BcryptPasswordHasher, JwtTokenCodec};
use crate::outbound::persistence::{
    DbPool, DieselCategoryRepository, DieselComplaintRepository, DieselUserRepository, PoolConfig,
    migrations,
};
use crate::outbound::storage::DiskAttachmentStore;

/// Register the `/api` routes.
///
/// The literal `/api/complaints/...` routes are registered before the
/// `{id}` route; Actix matches in registration order.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(register)
            .service(login)
            .service(list_categories)
            .service(submit_complaint)
            .service(my_complaints)
            .service(dashboard_stats)
            .service(all_complaints)
            .service(update_status)
            .service(complaint_detail),
    );
}

/// Wire the Diesel repositories, crypto adapters, and services into the
/// handler state.
fn build_http_state(config: &AppConfig, pool: DbPool) -> HttpState {
    let users = Arc::new(DieselUserRepository::new(pool.clone()));
    let hasher = Arc::new(BcryptPasswordHasher::new());
    let tokens = Arc::new(JwtTokenCodec::new(&config.jwt_secret));

    let accounts = Arc::new(CredentialAccountService::new(
        users,
        hasher,
        tokens.clone(),
    ));
    let complaints = Arc::new(ComplaintLifecycleService::new(
        Arc::new(DieselComplaintRepository::new(pool.clone())),
        Arc::new(DiskAttachmentStore::new(config.upload_dir.clone())),
    ));
    let categories = Arc::new(DieselCategoryRepository::new(pool));

    HttpState::new(accounts, complaints, categories, tokens)
}

/// Run migrations, build the pool and state, and serve until shutdown.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    migrations::run_pending(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;

    let pool = DbPool::new(
        PoolConfig::new(&config.database_url).with_max_size(config.pool_size),
    )
    .await
    .map_err(std::io::Error::other)?;

    let state = web::Data::new(build_http_state(&config, pool));
    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays reachable.
    let server_health_state = health_state.clone();
    let upload_dir = config.upload_dir.clone();

    let server = HttpServer::new(move || {
        #[cfg_attr(not(debug_assertions), expect(unused_mut, reason = "mutated in debug builds"))]
        let mut app = App::new()
            .app_data(state.clone())
            .app_data(server_health_state.clone())
            .configure(configure_api)
            .service(ready)
            .service(live)
            .service(Files::new("/uploads", upload_dir.clone()))
            .wrap(Cors::permissive())
            .wrap(Trace);

        #[cfg(debug_assertions)]
        {
            app = app.service(
                SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
            );
        }

        app
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    server.run().await
}
