use crate::config::PolicyConfig;
use crate::domain::payment::{
    Balance, Decision, DecisionResult, PaymentRequest, TraceStep, new_case_id, new_request_id,
    reasons, redact_customer_id,
};
use crate::domain::ports::{DecisionMaker, RiskProvider, RiskProviderBox};
use crate::error::Result;
use crate::infrastructure::ledger::AccountLedger;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// The deterministic rule evaluator.
///
/// `DecisionEngine` combines the customer's balance, the synthesized risk
/// signals and the policy thresholds into one of three decisions, recording
/// every step in the trace. It holds no mutable state of its own beyond the
/// shared ledger, so it is safely callable as the fallback target for any
/// alternative decision path.
///
/// Rule order is fixed: the threshold and dispute checks run first and can
/// escalate to review; the balance check runs last and escalates to block,
/// so insufficient balance always dominates a mere review flag. Only an
/// allow decision reaches the ledger's atomic reservation.
pub struct DecisionEngine {
    ledger: Arc<AccountLedger>,
    risk: RiskProviderBox,
    review_threshold: Decimal,
}

impl DecisionEngine {
    pub fn new(ledger: Arc<AccountLedger>, risk: RiskProviderBox, config: &PolicyConfig) -> Self {
        Self {
            ledger,
            risk,
            review_threshold: config.review_threshold,
        }
    }
}

#[async_trait]
impl DecisionMaker for DecisionEngine {
    async fn evaluate(&self, request: &PaymentRequest) -> Result<DecisionResult> {
        let request_id = new_request_id();
        let mut trace = vec![TraceStep::new("plan", "check balance, risk, and limits")];
        let mut decision = Decision::Allow;
        let mut decision_reasons: Vec<String> = Vec::new();

        let balance = self.ledger.get_balance(&request.customer_id).await;
        trace.push(TraceStep::new(
            "tool:get_balance",
            format!("balance={:.2}", balance.0),
        ));

        let risk = self.risk.signals(&request.customer_id).await?;
        let risk_detail =
            serde_json::to_string(&risk).unwrap_or_else(|_| format!("{risk:?}"));
        trace.push(TraceStep::new("tool:get_risk_signals", risk_detail));

        if request.amount.value() > self.review_threshold {
            decision.escalate(Decision::Review);
            decision_reasons.push(reasons::AMOUNT_ABOVE_DAILY_THRESHOLD.to_string());
        }
        if risk.recent_disputes > 0 {
            decision.escalate(Decision::Review);
            decision_reasons.push(reasons::RECENT_DISPUTES.to_string());
        }
        // Balance check last: block dominates any review reason above.
        if balance < Balance::from(request.amount) {
            decision.escalate(Decision::Block);
            decision_reasons.push(reasons::INSUFFICIENT_BALANCE.to_string());
        }

        if decision == Decision::Allow {
            let reserved = self
                .ledger
                .reserve(&request.customer_id, request.amount)
                .await?;
            if reserved {
                decision_reasons.push(reasons::TRANSACTION_ALLOWED.to_string());
                trace.push(TraceStep::new(
                    "reserve",
                    format!("amount={} reserved", request.amount.value()),
                ));
            } else {
                // Lost the race against a concurrent reservation. Balance
                // truth at reservation time is authoritative: the accumulated
                // reasons no longer apply.
                decision = Decision::Block;
                decision_reasons = vec![reasons::INSUFFICIENT_BALANCE.to_string()];
                trace.push(TraceStep::new("reserve", "reservation failed"));
            }
        }

        if decision != Decision::Allow {
            let case_id = new_case_id();
            trace.push(TraceStep::new(
                "tool:create_case",
                format!("case_id={case_id}"),
            ));
            tracing::info!(
                customer = %redact_customer_id(&request.customer_id),
                case_id,
                "case created for manual follow-up"
            );
        }

        trace.push(TraceStep::new("tool:recommend", decision.as_str()));
        tracing::info!(
            request_id,
            customer = %redact_customer_id(&request.customer_id),
            decision = decision.as_str(),
            reasons = ?decision_reasons,
            "payment decided"
        );

        Ok(DecisionResult {
            decision,
            reasons: decision_reasons,
            trace,
            request_id,
        })
    }
}
