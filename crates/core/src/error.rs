use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid timestamp for {key}: {value}")]
    InvalidTimestamp { key: String, value: String },

    #[error("query window is empty: start {start} is not before end {end}")]
    EmptyWindow { start: String, end: String },
}
