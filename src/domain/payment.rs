use crate::config::PolicyConfig;
use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::time::{SystemTime, UNIX_EPOCH};

/// Represents a monetary value held by an account.
///
/// This is a wrapper around `rust_decimal::Decimal` to enforce domain-specific
/// rules and provide type safety for financial calculations.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct Balance(pub Decimal);

/// Represents a positive monetary amount for payments.
///
/// Ensures that payment amounts are always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::TransactionError(
                "amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl From<Amount> for Balance {
    fn from(amount: Amount) -> Self {
        Self(amount.0)
    }
}

impl Balance {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Balance {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Balance {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Balance {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Balance {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

/// Currencies the service accepts. An unknown code fails deserialization,
/// which keeps the allow-list enforcement at the wire boundary.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
pub enum Currency {
    USD,
    EUR,
    GBP,
    JPY,
}

/// A validated payment intent submitted for a decision.
///
/// Field names serialize camelCase to match the service's wire shape.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub customer_id: String,
    pub payee_id: String,
    pub amount: Amount,
    pub currency: Currency,
    pub idempotency_key: String,
}

impl PaymentRequest {
    /// Checks the bounds the transport layer is expected to enforce.
    ///
    /// Amount positivity and the currency allow-list are already guaranteed
    /// by the types; this adds the identifier and upper-bound checks.
    pub fn validate(&self, config: &PolicyConfig) -> Result<(), PaymentError> {
        if self.customer_id.is_empty() {
            return Err(PaymentError::TransactionError(
                "customerId must not be empty".to_string(),
            ));
        }
        if self.payee_id.is_empty() {
            return Err(PaymentError::TransactionError(
                "payeeId must not be empty".to_string(),
            ));
        }
        if self.idempotency_key.is_empty() {
            return Err(PaymentError::TransactionError(
                "idempotencyKey must not be empty".to_string(),
            ));
        }
        if self.amount.value() > config.max_payment_amount {
            return Err(PaymentError::TransactionError(format!(
                "amount exceeds maximum of {}",
                config.max_payment_amount
            )));
        }
        Ok(())
    }
}

/// The engine's classification of a payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Allow,
    Review,
    Block,
}

impl Decision {
    fn severity(self) -> u8 {
        match self {
            Decision::Allow => 0,
            Decision::Review => 1,
            Decision::Block => 2,
        }
    }

    /// Raises the decision to `to` if it is more severe. Rules may escalate
    /// but never de-escalate: once blocked, a decision stays blocked.
    pub fn escalate(&mut self, to: Decision) {
        if to.severity() > self.severity() {
            *self = to;
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Allow => "allow",
            Decision::Review => "review",
            Decision::Block => "block",
        }
    }
}

/// Canonical reason codes attached to decisions.
pub mod reasons {
    pub const INSUFFICIENT_BALANCE: &str = "insufficient_balance";
    pub const AMOUNT_ABOVE_DAILY_THRESHOLD: &str = "amount_above_daily_threshold";
    pub const RECENT_DISPUTES: &str = "recent_disputes";
    pub const TRANSACTION_ALLOWED: &str = "transaction_allowed";
}

/// One step of an evaluation's audit trail.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TraceStep {
    pub step: String,
    pub detail: String,
    pub timestamp_ms: u64,
}

impl TraceStep {
    pub fn new(step: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            detail: detail.into(),
            timestamp_ms: now_ms(),
        }
    }
}

/// The full outcome of one evaluation: decision, non-empty reasons, the
/// ordered trace, and the request id. Immutable once constructed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResult {
    pub decision: Decision,
    pub reasons: Vec<String>,
    pub trace: Vec<TraceStep>,
    pub request_id: String,
}

/// Mints a request identifier of the form `req_<hex>`.
pub fn new_request_id() -> String {
    format!("req_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

/// Mints a case identifier of the form `case_<hex>` for manual follow-up.
pub fn new_case_id() -> String {
    format!("case_{}", &uuid::Uuid::new_v4().simple().to_string()[..6])
}

/// Shortens a customer id for log output so PII never lands in logs.
pub fn redact_customer_id(customer_id: &str) -> String {
    let prefix: String = customer_id.chars().take(2).collect();
    format!("{prefix}***")
}

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
