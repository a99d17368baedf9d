use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::time::Duration;

/// Policy constants consumed by the decision core.
///
/// Every threshold, budget and interval the engine, ledger and rate limiter
/// rely on lives here, so tests and deployments can tune them without
/// touching the rules themselves. `Default` mirrors the values the original
/// service shipped with.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Amounts strictly above this are flagged for manual review.
    pub review_threshold: Decimal,
    /// Hard upper bound for a single payment; larger requests are rejected.
    pub max_payment_amount: Decimal,
    /// Balance assigned to an account on first access.
    pub initial_balance: Decimal,
    /// Budget for acquiring a per-customer reservation lock.
    pub lock_timeout_ms: u64,
    /// Lifetime of a cached idempotency record.
    pub idempotency_ttl_secs: u64,
    /// Admissions per key within one rate-limit window.
    pub rate_limit_per_window: usize,
    pub rate_limit_window_ms: u64,
    /// Cadence of the background expiry sweep.
    pub sweep_interval_secs: u64,
    /// Customer id the simulated risk provider treats as high risk.
    pub high_risk_customer: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            review_threshold: dec!(100.0),
            max_payment_amount: dec!(1000000.0),
            initial_balance: dec!(300.0),
            lock_timeout_ms: 5_000,
            idempotency_ttl_secs: 86_400,
            rate_limit_per_window: 5,
            rate_limit_window_ms: 1_000,
            sweep_interval_secs: 60,
            high_risk_customer: "c_123".to_string(),
        }
    }
}

impl PolicyConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn idempotency_ttl(&self) -> Duration {
        Duration::from_secs(self.idempotency_ttl_secs)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}
