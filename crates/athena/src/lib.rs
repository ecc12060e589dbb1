pub mod config;
pub mod client;
pub mod state;
pub mod query;
pub mod poller;

pub use config::AthenaConfig;
pub use client::{AthenaClient, AthenaError, QueryService};
pub use state::{QueryState, QueryStatus};
pub use query::{columns, ApiActivityQuery, QueryRequest};
pub use poller::{wait_for_completion, PollPolicy};
