use paynow::application::engine::DecisionEngine;
use paynow::config::PolicyConfig;
use paynow::domain::payment::{Amount, Balance, Currency, Decision, PaymentRequest, reasons};
use paynow::domain::ports::DecisionMaker;
use paynow::infrastructure::ledger::AccountLedger;
use paynow::infrastructure::risk::SimulatedRiskProvider;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

fn setup() -> (Arc<AccountLedger>, DecisionEngine) {
    let config = PolicyConfig::default();
    let ledger = Arc::new(AccountLedger::new(&config));
    let engine = DecisionEngine::new(
        Arc::clone(&ledger),
        Box::new(SimulatedRiskProvider::new(config.high_risk_customer.clone())),
        &config,
    );
    (ledger, engine)
}

fn request(customer_id: &str, amount: Decimal, idempotency_key: &str) -> PaymentRequest {
    PaymentRequest {
        customer_id: customer_id.to_string(),
        payee_id: "m_001".to_string(),
        amount: Amount::new(amount).unwrap(),
        currency: Currency::USD,
        idempotency_key: idempotency_key.to_string(),
    }
}

#[tokio::test]
async fn test_large_amount_with_funds_goes_to_review() {
    let (ledger, engine) = setup();
    ledger.seed_balance("c_456", Balance::new(dec!(300.0))).await;

    let result = engine
        .evaluate(&request("c_456", dec!(150.0), "k1"))
        .await
        .unwrap();

    assert_eq!(result.decision, Decision::Review);
    assert_eq!(result.reasons, vec![reasons::AMOUNT_ABOVE_DAILY_THRESHOLD]);
    // A review never moves money.
    assert_eq!(ledger.get_balance("c_456").await, Balance::new(dec!(300.0)));
}

#[tokio::test]
async fn test_balance_check_dominates_review_flags() {
    let (ledger, engine) = setup();
    ledger.seed_balance("c_456", Balance::new(dec!(10.0))).await;

    let result = engine
        .evaluate(&request("c_456", dec!(50.0), "k2"))
        .await
        .unwrap();

    assert_eq!(result.decision, Decision::Block);
    assert_eq!(result.reasons, vec![reasons::INSUFFICIENT_BALANCE]);
}

#[tokio::test]
async fn test_sentinel_disputes_trigger_review() {
    let (ledger, engine) = setup();
    ledger.seed_balance("c_123", Balance::new(dec!(300.0))).await;

    let result = engine
        .evaluate(&request("c_123", dec!(50.0), "k3"))
        .await
        .unwrap();

    assert_eq!(result.decision, Decision::Review);
    assert_eq!(result.reasons, vec![reasons::RECENT_DISPUTES]);
}

#[tokio::test]
async fn test_small_clean_payment_is_allowed_and_debited() {
    let (ledger, engine) = setup();

    let result = engine
        .evaluate(&request("c_456", dec!(50.0), "k4"))
        .await
        .unwrap();

    assert_eq!(result.decision, Decision::Allow);
    assert_eq!(result.reasons, vec![reasons::TRANSACTION_ALLOWED]);
    assert_eq!(ledger.get_balance("c_456").await, Balance::new(dec!(250.0)));
}

#[tokio::test]
async fn test_review_and_block_results_carry_a_case_trace() {
    let (ledger, engine) = setup();
    ledger.seed_balance("c_poor", Balance::new(dec!(1.0))).await;

    for req in [
        request("c_123", dec!(50.0), "k5"),
        request("c_poor", dec!(5.0), "k6"),
    ] {
        let result = engine.evaluate(&req).await.unwrap();
        assert_ne!(result.decision, Decision::Allow);
        let case_step = result
            .trace
            .iter()
            .find(|s| s.step == "tool:create_case")
            .expect("review/block must record a case");
        assert!(case_step.detail.starts_with("case_id=case_"));
    }
}

#[tokio::test]
async fn test_allowed_results_have_no_case_trace() {
    let (_ledger, engine) = setup();
    let result = engine
        .evaluate(&request("c_456", dec!(50.0), "k7"))
        .await
        .unwrap();
    assert!(result.trace.iter().all(|s| s.step != "tool:create_case"));
}
