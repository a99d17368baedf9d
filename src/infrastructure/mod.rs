//! Concrete adapters: the in-memory account ledger, the per-key rate
//! limiter, and the simulated risk-signal provider.

pub mod ledger;
pub mod rate_limiter;
pub mod risk;
