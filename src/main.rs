//! Sick Fits storefront server
//!
//! Serves the GraphQL API over HTTP.
//! Reads configuration from TOML file (~/.config/sick-fits/config.toml).

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics_exporter_prometheus::PrometheusBuilder;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use sick_fits::application::{AccountService, CartService, CatalogService, CheckoutService};
use sick_fits::config::{config_path, AppConfig, LoggingConfig};
use sick_fits::domain::{Mailer, RepositoryProvider};
use sick_fits::infrastructure::database::migrator::Migrator;
use sick_fits::infrastructure::{LogMailer, SmtpMailer, StripeGateway};
use sick_fits::interfaces::http::health::HealthState;
use sick_fits::shared::{listen_for_shutdown_signals, ShutdownSignal, SystemClock};
use sick_fits::{
    build_schema, create_router, init_database, AppState, SeaOrmRepositoryProvider, Services,
};

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let path = config_path();
    let (app_cfg, load_error) = match AppConfig::load(&path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_tracing(&app_cfg.logging);
    match load_error {
        None if path.exists() => info!("Configuration loaded from {}", path.display()),
        None => info!("No config file at {}, using defaults", path.display()),
        Some(e) => error!("Failed to load config: {}. Using defaults.", e),
    }

    info!("Starting Sick Fits storefront backend...");
    if app_cfg.uses_default_jwt_secret() {
        warn!("security.jwt_secret is the built-in default; set a real secret before going live");
    }

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = if app_cfg.server.metrics_enabled {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!("Failed to install Prometheus recorder: {}", e);
                None
            }
        }
    } else {
        None
    };

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&app_cfg.database_config()).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

    // ── Outbound collaborators ─────────────────────────────────
    let mailer: Arc<dyn Mailer> = if app_cfg.mail.enabled {
        info!(host = %app_cfg.mail.smtp_host, port = app_cfg.mail.smtp_port, "Using SMTP mailer");
        Arc::new(SmtpMailer::new(&app_cfg.smtp_config())?)
    } else {
        info!("Mail disabled, outgoing messages will be logged");
        Arc::new(LogMailer)
    };

    let payments = StripeGateway::new(app_cfg.stripe_config());
    if !payments.is_configured() {
        warn!("No Stripe secret key configured, createOrder will fail");
    }

    // ── Application services ───────────────────────────────────
    let accounts = Arc::new(AccountService::new(
        repos.clone(),
        mailer,
        Arc::new(SystemClock),
        app_cfg.account_settings(),
    ));

    if app_cfg.admin.password.is_empty() {
        info!("No bootstrap admin password configured, skipping admin creation");
    } else {
        match accounts
            .ensure_admin(&app_cfg.admin.name, &app_cfg.admin.email, &app_cfg.admin.password)
            .await
        {
            Ok(Some(admin)) => {
                info!(user_id = %admin.id, "Default admin created: {}", admin.email);
                warn!("Please change the admin password immediately!");
            }
            Ok(None) => {}
            Err(e) => error!("Failed to create admin user: {}", e),
        }
    }

    let schema = build_schema(Services {
        accounts: accounts.clone(),
        catalog: Arc::new(CatalogService::new(repos.clone())),
        cart: Arc::new(CartService::new(repos.clone())),
        checkout: Arc::new(CheckoutService::new(
            repos,
            Arc::new(payments),
            app_cfg.checkout_settings(),
        )),
    });

    let router = create_router(
        AppState {
            schema,
            accounts,
            health: HealthState {
                db: Some(db.clone()),
                started_at: Arc::new(Instant::now()),
            },
            metrics: prometheus_handle,
        },
        &app_cfg.mail.frontend_url,
    );

    // ── Shutdown signalling ────────────────────────────────────
    let shutdown = ShutdownSignal::new();
    tokio::spawn(listen_for_shutdown_signals(shutdown.clone()));

    let addr = app_cfg.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("GraphQL endpoint listening on http://{}/graphql", addr);

    let server_shutdown = shutdown.clone();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        server_shutdown.wait().await;
        info!("HTTP server received shutdown signal");
    });
    let server = tokio::spawn(async move { server.await });

    // Drain in-flight requests, bounded by the configured timeout.
    let grace = Duration::from_secs(app_cfg.server.shutdown_timeout);
    let result = tokio::select! {
        result = server => Some(result),
        _ = async {
            shutdown.wait().await;
            tokio::time::sleep(grace).await;
        } => None,
    };
    match result {
        Some(Ok(Ok(()))) => info!("HTTP server stopped"),
        Some(Ok(Err(e))) => error!("HTTP server error: {}", e),
        Some(Err(e)) => error!("HTTP server task panicked: {}", e),
        None => warn!("Graceful shutdown timed out after {}s", grace.as_secs()),
    }

    info!("Performing final cleanup...");
    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("Database connection closed");
    }

    info!("Sick Fits shutdown complete");
    Ok(())
}
