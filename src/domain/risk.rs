use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A read-only snapshot of fraud/risk indicators for one customer.
///
/// The shape is fixed: every evaluation sees the same named fields, and a
/// provider fills them in. `Default` is the all-clear profile.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct RiskSignals {
    /// Payment disputes in the last 30 days.
    pub recent_disputes: u32,
    /// New device detected for this customer.
    pub device_change: bool,
    pub velocity: VelocityCheck,
    pub location: LocationRisk,
    pub account: AccountRisk,
    pub pattern: TransactionPattern,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct VelocityCheck {
    pub last_24h_count: u32,
    pub last_24h_amount: Decimal,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct LocationRisk {
    pub unusual_country: bool,
    /// IP location does not match the card country.
    pub location_mismatch: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct AccountRisk {
    pub account_age_days: u32,
    pub previous_failures: u32,
    pub suspicious_activity: bool,
}

impl Default for AccountRisk {
    fn default() -> Self {
        Self {
            account_age_days: 365,
            previous_failures: 0,
            suspicious_activity: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
pub struct TransactionPattern {
    pub unusual_time: bool,
    pub unusual_amount: bool,
    pub high_risk_merchant: bool,
}
