//! Funnel Forge billing service entry point.
//!
//! Loads configuration, connects the PostgreSQL pool, wires the
//! adapters into the billing router, and serves it.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use funnel_forge::adapters::email::{ResendConfig, ResendEmailSender};
use funnel_forge::adapters::http::{billing_router, BillingAppState};
use funnel_forge::adapters::mamopay::{MamoPayConfig, MamoPayGateway};
use funnel_forge::adapters::postgres::{
    PostgresAffiliateLinkRepository, PostgresPaymentRepository, PostgresProvisioningStore,
    PostgresSubscriptionRepository, PostgresUserRepository,
};
use funnel_forge::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    init_tracing(&config.server.log_level);

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let gateway = MamoPayGateway::new(
        MamoPayConfig::new(config.payment.mamopay_api_key.clone())
            .with_base_url(config.payment.mamopay_api_base_url.clone()),
    );
    let email = ResendEmailSender::new(ResendConfig::new(
        config.email.resend_api_key.clone(),
        config.email.from_header(),
    ));

    let state = BillingAppState {
        users: Arc::new(PostgresUserRepository::new(pool.clone())),
        payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        affiliate_links: Arc::new(PostgresAffiliateLinkRepository::new(pool.clone())),
        store: Arc::new(PostgresProvisioningStore::new(pool)),
        gateway: Arc::new(gateway),
        email: Arc::new(email),
        verification_secret: config.auth.verification_secret.clone(),
    };

    let app = billing_router()
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Funnel Forge billing service listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
