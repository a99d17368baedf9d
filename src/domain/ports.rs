use super::payment::{DecisionResult, PaymentRequest};
use super::risk::RiskSignals;
use crate::error::Result;
use async_trait::async_trait;

/// Source of risk signals for a customer.
///
/// The in-tree implementation synthesizes signals deterministically from the
/// id; a real risk engine can swap in behind this port without touching the
/// decision rules.
#[async_trait]
pub trait RiskProvider: Send + Sync {
    async fn signals(&self, customer_id: &str) -> Result<RiskSignals>;
}

/// Anything that can turn a payment request into a decision.
///
/// Alternative decision paths (for example an LLM-assisted one) must sit
/// behind this trait and delegate to the deterministic engine when they
/// fail, so callers never observe the difference.
#[async_trait]
pub trait DecisionMaker: Send + Sync {
    async fn evaluate(&self, request: &PaymentRequest) -> Result<DecisionResult>;
}

pub type RiskProviderBox = Box<dyn RiskProvider>;
pub type DecisionMakerBox = Box<dyn DecisionMaker>;
