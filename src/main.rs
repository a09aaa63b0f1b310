use clap::Parser;
use jwt_simple::algorithms::HS256Key;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playoga_billing::config::Config;
use playoga_billing::db::{AppState, create_pool, init_db, queries};
use playoga_billing::handlers;
use playoga_billing::models::{CreateCoupon, DiscountType};
use playoga_billing::payments::RazorpayClient;

#[derive(Parser, Debug)]
#[command(name = "playoga-billing")]
#[command(about = "Subscription purchase pipeline for the Playoga app")]
struct Cli {
    /// Seed the database with dev coupons (dev mode only)
    #[arg(long)]
    seed: bool,
}

/// Seeds a couple of coupons for exercising checkout locally.
fn seed_dev_coupons(state: &AppState) {
    let conn = state
        .db
        .get()
        .expect("Failed to get db connection for seeding");

    let existing: i64 = conn
        .query_row("SELECT COUNT(*) FROM coupons", [], |row| row.get(0))
        .expect("Failed to count coupons");
    if existing > 0 {
        tracing::info!("Coupons already exist, skipping seed");
        return;
    }

    let now = chrono::Utc::now().timestamp();

    let percent = queries::create_coupon(
        &conn,
        &CreateCoupon {
            code: "WELCOME10".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: 10.0,
            max_discount: None,
            valid_from: now,
            valid_until: None,
            max_uses: None,
        },
    )
    .expect("Failed to seed percentage coupon");

    let fixed = queries::create_coupon(
        &conn,
        &CreateCoupon {
            code: "FLAT200".to_string(),
            discount_type: DiscountType::Fixed,
            discount_value: 200.0,
            max_discount: None,
            valid_from: now,
            valid_until: Some(now + 30 * 86400),
            max_uses: Some(100),
        },
    )
    .expect("Failed to seed fixed coupon");

    tracing::info!("Seeded dev coupons: {} and {}", percent.code, fixed.code);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playoga_billing=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    if config.dev_mode {
        tracing::info!("Running in DEVELOPMENT mode");
    }

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let razorpay = match (&config.razorpay_key_id, &config.razorpay_key_secret) {
        (Some(key_id), Some(key_secret)) => Some(RazorpayClient::new(key_id, key_secret)),
        _ => {
            tracing::warn!(
                "Razorpay credentials not configured; order creation and payment verification will fail"
            );
            None
        }
    };

    let state = AppState {
        db: db_pool,
        auth_key: HS256Key::from_bytes(config.auth_jwt_secret.as_bytes()),
        razorpay,
        pricing: config.pricing,
    };

    if cli.seed {
        if !config.dev_mode {
            tracing::warn!("--seed flag ignored: not in dev mode (set PLAYOGA_ENV=dev)");
        } else {
            seed_dev_coupons(&state);
        }
    }

    // Checkout runs inside a mobile webview on a different origin, so the
    // API answers preflights permissively.
    let app = handlers::router()
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Playoga billing server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}
