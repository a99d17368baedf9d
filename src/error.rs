use thiserror::Error;

/// Errors raised by the decision core.
///
/// Only two conditions surface to callers as errors: a reservation lock that
/// could not be acquired in time (transient, retryable by the caller) and a
/// request that is malformed enough to reject outright. Everything else is
/// expressed as a normal decision.
#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("lock acquisition for customer {customer_id} exceeded {timeout_ms}ms")]
    LockTimeout { customer_id: String, timeout_ms: u64 },
    #[error("transaction error: {0}")]
    TransactionError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PaymentError>;
