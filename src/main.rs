use actix_web::middleware::{Logger, NormalizePath};
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod docs;
mod error;
mod model;
mod models;
mod reports;
mod routes;
mod store;
mod utils;

#[cfg(test)]
mod test_support;

use config::Config;
use routes::RateLimits;
use store::Store;
use utils::email_index::EmailIndex;

use crate::auth::password::hash_password;
use crate::docs::ApiDoc;
use tracing::{error, info};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

const EMAIL_WARMUP_BATCH: usize = 250;

#[get("/")]
async fn index() -> impl Responder {
    "Paydesk API is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(addr = %config.server_addr, "Server starting...");

    let store = Data::new(Store::new());
    if config.seed_demo_data {
        let admin_hash = hash_password("admin").context("hashing the demo admin password")?;
        store.seed_demo_data(admin_hash).context("seeding demo data")?;
    }

    let emails = Data::new(EmailIndex::default());

    let store_for_warmup = store.clone();
    let emails_for_warmup = emails.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = emails_for_warmup
            .warmup(&store_for_warmup, EMAIL_WARMUP_BATCH)
            .await
        {
            error!(error = ?e, "Failed to warm up email index");
        }
    });

    // Built once so every worker shares the same per-IP buckets
    let limits = RateLimits::new(&config);
    let server_addr = config.server_addr.clone();
    let config_data = Data::new(config.clone());

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(emails.clone())
            .app_data(config_data.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config, &limits))
    })
    .bind(&server_addr)
    .with_context(|| format!("binding {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
