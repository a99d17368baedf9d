use crate::domain::ports::RiskProvider;
use crate::domain::risk::{AccountRisk, LocationRisk, RiskSignals, TransactionPattern, VelocityCheck};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal_macros::dec;

/// Deterministic stand-in for a real risk engine.
///
/// Signals are synthesized from the customer id alone, with no stored
/// state, so every evaluation of the same id sees the same snapshot:
///
/// - the configured high-risk sentinel id gets disputes, device change,
///   elevated velocity and flagged suspicious activity;
/// - ids prefixed `new_` look like young accounts paying unusual amounts;
/// - ids prefixed `intl_` trip the location checks;
/// - everything else is all-clear.
pub struct SimulatedRiskProvider {
    high_risk_customer: String,
}

impl SimulatedRiskProvider {
    pub fn new(high_risk_customer: impl Into<String>) -> Self {
        Self {
            high_risk_customer: high_risk_customer.into(),
        }
    }
}

#[async_trait]
impl RiskProvider for SimulatedRiskProvider {
    async fn signals(&self, customer_id: &str) -> Result<RiskSignals> {
        let mut signals = RiskSignals::default();

        if customer_id == self.high_risk_customer {
            signals.recent_disputes = 2;
            signals.device_change = true;
            signals.velocity = VelocityCheck {
                last_24h_count: 15,
                last_24h_amount: dec!(2000.0),
            };
            signals.account = AccountRisk {
                previous_failures: 3,
                suspicious_activity: true,
                ..AccountRisk::default()
            };
        } else if customer_id.starts_with("new_") {
            signals.account = AccountRisk {
                account_age_days: 5,
                ..AccountRisk::default()
            };
            signals.pattern = TransactionPattern {
                unusual_amount: true,
                ..TransactionPattern::default()
            };
        } else if customer_id.starts_with("intl_") {
            signals.location = LocationRisk {
                unusual_country: true,
                location_mismatch: true,
            };
        }

        Ok(signals)
    }
}
