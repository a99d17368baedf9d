//! Application layer containing the core decision logic.
//!
//! This module defines the `DecisionEngine`, the deterministic rule
//! evaluator that turns a payment request into an allow/review/block
//! decision with reasons and a trace.

pub mod engine;
