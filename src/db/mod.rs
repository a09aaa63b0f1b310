mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use jwt_simple::algorithms::HS256Key;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::payments::RazorpayClient;
use crate::pricing::PricingConfig;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Verification key for bearer tokens from the identity provider
    pub auth_key: HS256Key,
    /// None when Razorpay credentials are not configured
    pub razorpay: Option<RazorpayClient>,
    pub pricing: PricingConfig,
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path);
    Pool::builder().max_size(10).build(manager)
}
