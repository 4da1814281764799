//! Subscription ledger
//!
//! Owns the persisted tier record. Purchases are simulated: `upgrade` always
//! succeeds and `restore` reports the local state.

use chrono::{DateTime, Duration, FixedOffset, Months, Utc};
use tracing::info;

use super::types::{SubscriptionPhase, SubscriptionRecord, SubscriptionTier};
use crate::clock::SharedClock;
use crate::storage::{self, SharedStore, SUBSCRIPTION_KEY};

/// Length of the one-time free trial
pub const TRIAL_DAYS: i64 = 7;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

pub struct SubscriptionLedger {
    record: SubscriptionRecord,
    store: SharedStore,
    clock: SharedClock,
}

impl SubscriptionLedger {
    /// Load the ledger, defaulting to a free account
    pub fn load(store: SharedStore, clock: SharedClock) -> Self {
        let record = storage::load_or_default(store.as_ref(), SUBSCRIPTION_KEY, Default::default);
        Self {
            record,
            store,
            clock,
        }
    }

    pub fn record(&self) -> &SubscriptionRecord {
        &self.record
    }

    pub fn tier(&self) -> SubscriptionTier {
        self.record.tier
    }

    /// Tier check only; an elapsed `end_date` does not downgrade
    pub fn is_premium(&self) -> bool {
        self.record.tier == SubscriptionTier::Premium
    }

    /// Whole days left in the current period, rounded up, never negative
    pub fn days_remaining(&self) -> Option<u32> {
        let end = self.record.end_date?;
        let left_ms = (end - self.now_utc()).num_milliseconds();
        if left_ms <= 0 {
            return Some(0);
        }
        let days = (left_ms + DAY_MS - 1) / DAY_MS;
        Some(u32::try_from(days).unwrap_or(u32::MAX))
    }

    pub fn can_start_trial(&self) -> bool {
        !self.record.trial_used
    }

    /// Switch to premium for a trial week or a calendar month
    pub fn upgrade(&mut self, with_trial: bool) -> bool {
        let now = self.clock.now();
        let starts_trial = with_trial && !self.record.trial_used;

        let end = if starts_trial {
            now + Duration::days(TRIAL_DAYS)
        } else {
            add_one_month(now)
        };

        self.record = SubscriptionRecord {
            tier: SubscriptionTier::Premium,
            start_date: Some(now.with_timezone(&Utc)),
            end_date: Some(end.with_timezone(&Utc)),
            trial_used: self.record.trial_used || starts_trial,
        };
        self.persist();

        info!(
            trial = starts_trial,
            ends = %end,
            "Upgraded to premium"
        );
        true
    }

    /// Drop back to free; trial eligibility is not restored
    pub fn cancel(&mut self) {
        self.record.tier = SubscriptionTier::Free;
        self.record.end_date = None;
        self.persist();
        info!("Subscription canceled");
    }

    /// Stand-in for a store purchase restore
    pub fn restore(&self) -> bool {
        self.is_premium()
    }

    pub fn phase(&self) -> SubscriptionPhase {
        phase_at(&self.record, self.now_utc())
    }

    fn now_utc(&self) -> DateTime<Utc> {
        self.clock.now().with_timezone(&Utc)
    }

    fn persist(&self) {
        storage::persist_or_warn(self.store.as_ref(), SUBSCRIPTION_KEY, &self.record);
    }
}

/// Calendar month ahead, clamped to the last day of a shorter month
fn add_one_month(now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    now.checked_add_months(Months::new(1))
        .unwrap_or_else(|| now + Duration::days(30))
}

fn phase_at(record: &SubscriptionRecord, now: DateTime<Utc>) -> SubscriptionPhase {
    if record.tier == SubscriptionTier::Free {
        return SubscriptionPhase::Free;
    }

    let Some(end) = record.end_date else {
        return SubscriptionPhase::Subscribed { ends_at: None };
    };

    if end <= now {
        return SubscriptionPhase::Expired { since: end };
    }

    // A trial window is exactly TRIAL_DAYS long; paid months are never 7 days
    let is_trial_window = record.trial_used
        && record
            .start_date
            .is_some_and(|start| end - start == Duration::days(TRIAL_DAYS));

    if is_trial_window {
        SubscriptionPhase::Trialing { ends_at: end }
    } else {
        SubscriptionPhase::Subscribed { ends_at: Some(end) }
    }
}
