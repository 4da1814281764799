//! Usage metering
//!
//! Counts metered actions per period. Monthly counters cover transcriptions and
//! analyses, the daily counter covers chat messages.
//!
//! Note: period boundaries follow the clock's local calendar, so limits reset at
//! local midnight rather than UTC midnight.

use chrono::{DateTime, FixedOffset};
use std::str::FromStr;
use tracing::{debug, info};

use super::tiers::TierLimits;
use super::types::{Feature, Quota, Remaining, UsageRecord, YearMonth};
use crate::clock::SharedClock;
use crate::storage::{self, SharedStore, USAGE_KEY};

pub struct UsageMeter {
    record: UsageRecord,
    store: SharedStore,
    clock: SharedClock,
}

impl UsageMeter {
    /// Load counters and roll over any period that elapsed while closed
    pub fn load(store: SharedStore, clock: SharedClock) -> Self {
        let today = clock.now().date_naive();
        let record =
            storage::load_or_default(store.as_ref(), USAGE_KEY, || UsageRecord::fresh(today));
        let mut meter = Self {
            record,
            store,
            clock,
        };
        meter.refresh();
        meter
    }

    /// Reset counters whose period has changed since the last check
    ///
    /// Returns whether anything was reset. Calling it again within the same
    /// day and month is a no-op.
    pub fn rollover_if_needed(&mut self, now: DateTime<FixedOffset>) -> bool {
        let today = now.date_naive();
        let this_month = YearMonth::of(today);
        let mut changed = false;

        if self.record.last_reset_date != today {
            debug!(
                from = %self.record.last_reset_date,
                to = %today,
                chat = self.record.chat_messages_today,
                "Daily rollover"
            );
            self.record.chat_messages_today = 0;
            self.record.last_reset_date = today;
            changed = true;
        }

        if self.record.month_reset_date != this_month {
            info!(
                from = %self.record.month_reset_date,
                to = %this_month,
                transcriptions = self.record.transcriptions_this_month,
                analyses = self.record.analysis_this_month,
                "Monthly rollover"
            );
            self.record.transcriptions_this_month = 0;
            self.record.analysis_this_month = 0;
            self.record.month_reset_date = this_month;
            changed = true;
        }

        if changed {
            self.persist();
        }
        changed
    }

    /// Current counters after rollover
    pub fn snapshot(&mut self) -> UsageRecord {
        self.refresh();
        self.record.clone()
    }

    /// Current count for a feature after rollover
    pub fn count(&mut self, feature: Feature) -> u32 {
        self.refresh();
        self.record.count(feature)
    }

    /// Quota left for a feature under the given limits
    pub fn remaining(&mut self, feature: Feature, limits: &TierLimits) -> Remaining {
        match limits.quota(feature) {
            Quota::Unlimited => Remaining::Unlimited,
            Quota::Limited(limit) => {
                Remaining::Count(limit.saturating_sub(self.count(feature)))
            }
        }
    }

    /// Record one use of a feature by name; unknown names are ignored
    pub fn track(&mut self, feature: &str) {
        match Feature::from_str(feature) {
            Ok(feature) => self.track_feature(feature),
            Err(e) => debug!(error = %e, "Ignoring usage for unmetered feature"),
        }
    }

    /// Record one use of a feature
    pub fn track_feature(&mut self, feature: Feature) {
        self.refresh();
        let counter = self.record.counter_mut(feature);
        *counter = counter.saturating_add(1);
        let used = *counter;
        self.persist();
        debug!(feature = %feature, used, "Incremented usage");
    }

    fn refresh(&mut self) {
        let now = self.clock.now();
        self.rollover_if_needed(now);
    }

    fn persist(&self) {
        storage::persist_or_warn(self.store.as_ref(), USAGE_KEY, &self.record);
    }
}
