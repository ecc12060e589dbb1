use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("object not found: s3://{bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("AWS SDK error: {0}")]
    AwsSdk(String),

    #[error("failed to read object body: {0}")]
    Body(String),

    #[error("invalid presign expiry: {0}")]
    Presign(String),
}
