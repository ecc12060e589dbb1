pub mod config;
pub mod env;
pub mod error;

pub use config::{load_dotenv, QueryWindow, ReportConfig};
pub use error::ConfigError;
