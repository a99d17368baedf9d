use crate::config::PolicyConfig;
use crate::domain::payment::{Amount, Balance, DecisionResult, redact_customer_id};
use crate::error::{PaymentError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

/// One per-customer reservation lock, created on demand.
///
/// `last_used` feeds the background sweep: an entry that is uncontended and
/// untouched past the staleness window gets dropped from the registry.
struct LockEntry {
    handle: Arc<Mutex<()>>,
    last_used: Instant,
}

struct IdempotencyRecord {
    response: DecisionResult,
    created_at: Instant,
    ttl: Duration,
}

impl IdempotencyRecord {
    fn expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// In-memory account store with atomic balance reservation.
///
/// All shared state lives behind the ledger's own synchronization: callers
/// never see the raw maps. Balance mutation goes through [`reserve`], which
/// serializes concurrent reservations for one customer behind that
/// customer's lock while leaving other customers unaffected.
///
/// [`reserve`]: AccountLedger::reserve
pub struct AccountLedger {
    balances: RwLock<HashMap<String, Balance>>,
    locks: Mutex<HashMap<String, LockEntry>>,
    idempotency: RwLock<HashMap<String, IdempotencyRecord>>,
    /// Serializes sweeps, distinct from any per-customer lock so maintenance
    /// never blocks a live reservation.
    maintenance: Mutex<()>,
    initial_balance: Balance,
    lock_timeout: Duration,
}

impl AccountLedger {
    pub fn new(config: &PolicyConfig) -> Self {
        Self {
            balances: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
            idempotency: RwLock::new(HashMap::new()),
            maintenance: Mutex::new(()),
            initial_balance: Balance::new(config.initial_balance),
            lock_timeout: config.lock_timeout(),
        }
    }

    /// Returns the customer's balance, creating the account with the
    /// configured initial balance on first access.
    ///
    /// Creation is race-free: concurrent first-accesses resolve through a
    /// single `entry` insertion under the write lock, so both observe the
    /// same initialized value.
    pub async fn get_balance(&self, customer_id: &str) -> Balance {
        {
            let balances = self.balances.read().await;
            if let Some(balance) = balances.get(customer_id) {
                return *balance;
            }
        }
        let mut balances = self.balances.write().await;
        *balances
            .entry(customer_id.to_string())
            .or_insert(self.initial_balance)
    }

    /// Overwrites a customer's balance. Seeding hook for tests and demos;
    /// production mutation goes through `reserve` only.
    pub async fn seed_balance(&self, customer_id: &str, balance: Balance) {
        let mut balances = self.balances.write().await;
        balances.insert(customer_id.to_string(), balance);
    }

    /// Atomically debits `amount` from the customer's balance.
    ///
    /// Acquires the customer's reservation lock within the configured
    /// timeout (`LockTimeout` on expiry), re-reads the balance under the
    /// lock, and debits only if sufficient. Returns `false` without touching
    /// the balance otherwise. This is the single point that prevents
    /// double-spend: reservations for one customer are strictly serialized.
    pub async fn reserve(&self, customer_id: &str, amount: Amount) -> Result<bool> {
        let handle = self.lock_handle(customer_id).await;
        let _guard = time::timeout(self.lock_timeout, handle.lock())
            .await
            .map_err(|_| {
                tracing::warn!(
                    customer = %redact_customer_id(customer_id),
                    timeout_ms = self.lock_timeout.as_millis() as u64,
                    "reservation lock acquisition timed out"
                );
                PaymentError::LockTimeout {
                    customer_id: customer_id.to_string(),
                    timeout_ms: self.lock_timeout.as_millis() as u64,
                }
            })?;

        let debit = Balance::from(amount);
        let mut balances = self.balances.write().await;
        let balance = balances
            .entry(customer_id.to_string())
            .or_insert(self.initial_balance);
        if *balance >= debit {
            *balance -= debit;
            tracing::debug!(
                customer = %redact_customer_id(customer_id),
                amount = %amount.value(),
                remaining = %balance.0,
                "reservation debited"
            );
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Fetches the customer's lock handle, creating it on first use.
    /// Insert-if-absent under the registry mutex guarantees exactly one
    /// lock per customer id.
    async fn lock_handle(&self, customer_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        let entry = locks
            .entry(customer_id.to_string())
            .or_insert_with(|| LockEntry {
                handle: Arc::new(Mutex::new(())),
                last_used: Instant::now(),
            });
        entry.last_used = Instant::now();
        entry.handle.clone()
    }

    /// Caches the full decision response under the client's idempotency key.
    pub async fn save_idempotency(&self, key: &str, response: &DecisionResult, ttl: Duration) {
        let mut cache = self.idempotency.write().await;
        cache.insert(
            key.to_string(),
            IdempotencyRecord {
                response: response.clone(),
                created_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Returns the cached response for `key`, or `None` on a miss.
    ///
    /// An entry past its TTL behaves as a miss and is lazily purged.
    pub async fn get_idempotency(&self, key: &str) -> Option<DecisionResult> {
        {
            let cache = self.idempotency.read().await;
            match cache.get(key) {
                Some(record) if !record.expired() => return Some(record.response.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        // Expired under the read lock; re-check under the write lock in case
        // the entry was overwritten in between.
        let mut cache = self.idempotency.write().await;
        if let Some(record) = cache.get(key) {
            if record.expired() {
                cache.remove(key);
            } else {
                return Some(record.response.clone());
            }
        }
        None
    }

    /// Removes expired idempotency records and stale, uncontended lock
    /// entries. Runs under the maintenance lock; never takes a per-customer
    /// reservation lock, so live reservations are unaffected beyond the map
    /// accesses themselves.
    pub async fn sweep(&self) {
        let _maintenance = self.maintenance.lock().await;

        let mut expired = 0usize;
        {
            let mut cache = self.idempotency.write().await;
            cache.retain(|_, record| {
                let keep = !record.expired();
                if !keep {
                    expired += 1;
                }
                keep
            });
        }

        let mut stale = 0usize;
        {
            let mut locks = self.locks.lock().await;
            let staleness = self.lock_timeout;
            locks.retain(|_, entry| {
                // strong_count > 1 means a reservation still holds a clone.
                let keep = Arc::strong_count(&entry.handle) > 1
                    || entry.last_used.elapsed() <= staleness;
                if !keep {
                    stale += 1;
                }
                keep
            });
        }

        if expired > 0 || stale > 0 {
            tracing::debug!(expired, stale, "sweep purged entries");
        }
    }

    /// Spawns the periodic expiry sweep on its own task. The returned handle
    /// shuts it down cleanly.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> SweeperHandle {
        let ledger = Arc::clone(self);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // An interval's first tick completes immediately; consume it so
            // the first sweep happens one full interval in.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => ledger.sweep().await,
                    _ = shutdown_rx.changed() => break,
                }
            }
        });
        SweeperHandle {
            shutdown: shutdown_tx,
            task,
        }
    }
}

/// Owner handle for the background sweep task.
pub struct SweeperHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper to stop and waits for it to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}
