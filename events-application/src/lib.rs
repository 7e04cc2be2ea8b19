pub mod account_deletion;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod reporter;
pub mod store;
pub mod telemetry;

pub use account_deletion::{AccountDeletionHandler, BatchDeleteConfig};
pub use bootstrap::{UserDataStores, build_registry, build_router};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use reporter::TracingErrorReporter;
