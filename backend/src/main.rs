//! Backend entry-point: wires config, persistence, services, and REST routes.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use chrono::Duration;
use ortho_config::OrthoConfig as _;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use dicri_backend::ApiDoc;
use dicri_backend::RequestLog;
use dicri_backend::bootstrap::prepare_database;
use dicri_backend::config::AppConfig;
use dicri_backend::domain::{AccountService, CaseFileService};
use dicri_backend::inbound::http::{self, state::HttpState};
use dicri_backend::outbound::auth::{Argon2PasswordHasher, JwtTokenCodec};
use dicri_backend::outbound::persistence::pool::DbPool;
use dicri_backend::outbound::persistence::{DieselCaseFileRepository, DieselUserRepository};

/// Resolve the token signing secret, allowing an ephemeral one in dev only.
fn token_secret(config: &AppConfig) -> std::io::Result<String> {
    match config.token_secret() {
        Some(secret) => Ok(secret.to_owned()),
        None if cfg!(debug_assertions) => {
            warn!("using ephemeral token secret (dev only); tokens die with the process");
            Ok(uuid::Uuid::new_v4().to_string())
        }
        None => Err(std::io::Error::other(
            "DICRI_TOKEN_SECRET must be set; refusing to start without a signing secret",
        )),
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::load().map_err(std::io::Error::other)?;
    let secret = token_secret(&config)?;

    prepare_database(config.database_url())
        .await
        .map_err(std::io::Error::other)?;

    let pool = DbPool::connect(config.database_url(), config.pool_size())
        .await
        .map_err(std::io::Error::other)?;

    let tokens = Arc::new(JwtTokenCodec::new(
        secret.as_bytes(),
        Duration::seconds(config.token_ttl_seconds()),
    ));
    let accounts = AccountService::new(
        Arc::new(DieselUserRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher),
        tokens.clone(),
    );
    let case_files = CaseFileService::new(Arc::new(DieselCaseFileRepository::new(pool)));
    let state = HttpState::new(accounts, case_files, tokens);

    let bind_addr = config.bind_addr().to_owned();
    HttpServer::new(move || {
        let app = App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(RequestLog)
            .service(http::routes());

        #[cfg(debug_assertions)]
        let app =
            app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

        app
    })
    .bind(bind_addr)?
    .run()
    .await
}
