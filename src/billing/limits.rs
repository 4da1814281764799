//! Entitlement checks
//!
//! Combines the subscription ledger and the usage meter into the single
//! decision point every gated action consults before running. Usage is
//! recorded with [`Entitlements::track`] only after the action succeeded.

use std::str::FromStr;
use tracing::{debug, info};

use super::subscription::SubscriptionLedger;
use super::tiers::{TierDefinition, TierLimits};
use super::types::{
    Feature, FeatureAllowance, LimitCheckResult, LimitDenialReason, Period, Quota, Remaining,
    SubscriptionInfo, SubscriptionTier,
};
use super::usage::UsageMeter;
use crate::clock::SharedClock;
use crate::storage::SharedStore;

/// Remaining count at which the UI starts warning
pub const LOW_USAGE_THRESHOLD: u32 = 3;

/// Deep link the UI turns into the paywall
const UPGRADE_URL: &str = "voicenotes://upgrade";

/// How the facade treats a premium record whose period has ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntitlementPolicy {
    /// When false, any premium tier is unrestricted regardless of `end_date`
    pub enforce_expiry: bool,
}

pub struct Entitlements {
    ledger: SubscriptionLedger,
    meter: UsageMeter,
    free_limits: TierLimits,
    policy: EntitlementPolicy,
}

impl Entitlements {
    pub fn new(ledger: SubscriptionLedger, meter: UsageMeter, policy: EntitlementPolicy) -> Self {
        Self {
            ledger,
            meter,
            free_limits: TierLimits::for_tier(SubscriptionTier::Free),
            policy,
        }
    }

    /// Load ledger and meter from the store
    pub fn load(store: SharedStore, clock: SharedClock, policy: EntitlementPolicy) -> Self {
        let ledger = SubscriptionLedger::load(store.clone(), clock.clone());
        let meter = UsageMeter::load(store, clock);
        Self::new(ledger, meter, policy)
    }

    /// Override the free-tier quotas
    pub fn with_free_limits(mut self, limits: TierLimits) -> Self {
        self.free_limits = limits;
        self
    }

    pub fn ledger(&self) -> &SubscriptionLedger {
        &self.ledger
    }

    /// Whether the user bypasses all quotas
    pub fn is_unrestricted(&self) -> bool {
        if self.policy.enforce_expiry {
            self.ledger.phase().is_active()
        } else {
            self.ledger.is_premium()
        }
    }

    /// Limits that apply right now
    pub fn effective_limits(&self) -> TierLimits {
        if self.is_unrestricted() {
            TierLimits::for_tier(SubscriptionTier::Premium)
        } else {
            self.free_limits.clone()
        }
    }

    /// Check a feature by name; names outside the metered set are always allowed
    pub fn can_use_feature(&mut self, feature: &str) -> bool {
        match Feature::from_str(feature) {
            Ok(feature) => self.can_use(feature),
            Err(_) => true,
        }
    }

    pub fn can_use(&mut self, feature: Feature) -> bool {
        self.remaining(feature).is_available()
    }

    /// Remaining quota by name; names outside the metered set are unlimited
    pub fn remaining_usage(&mut self, feature: &str) -> Remaining {
        match Feature::from_str(feature) {
            Ok(feature) => self.remaining(feature),
            Err(_) => Remaining::Unlimited,
        }
    }

    pub fn remaining(&mut self, feature: Feature) -> Remaining {
        if self.is_unrestricted() {
            return Remaining::Unlimited;
        }
        self.meter.remaining(feature, &self.free_limits)
    }

    /// Check a feature and explain a denial
    pub fn check(&mut self, feature: Feature) -> LimitCheckResult {
        let remaining = self.remaining(feature);
        if remaining.is_available() {
            return LimitCheckResult::Allowed { remaining };
        }

        let used = self.meter.count(feature);
        let reason = match self.free_limits.quota(feature) {
            Quota::Limited(0) | Quota::Unlimited => LimitDenialReason::FeatureNotIncluded {
                feature,
                required_tier: SubscriptionTier::Premium,
            },
            Quota::Limited(limit) => match feature.period() {
                Period::Monthly => LimitDenialReason::MonthlyLimitReached {
                    feature,
                    limit,
                    used,
                },
                Period::Daily => LimitDenialReason::DailyLimitReached {
                    feature,
                    limit,
                    used,
                },
            },
        };

        info!(feature = %feature, reason = %reason, "Feature denied");
        LimitCheckResult::Denied {
            reason,
            upgrade_url: Some(UPGRADE_URL.to_string()),
        }
    }

    /// Record one successful use of a feature by name
    pub fn track(&mut self, feature: &str) {
        self.meter.track(feature);
    }

    pub fn track_feature(&mut self, feature: Feature) {
        self.meter.track_feature(feature);
    }

    pub fn upgrade(&mut self, with_trial: bool) -> bool {
        self.ledger.upgrade(with_trial)
    }

    pub fn cancel(&mut self) {
        self.ledger.cancel();
    }

    pub fn restore(&self) -> bool {
        self.ledger.restore()
    }

    /// Snapshot of tier, period and quotas for display
    pub fn info(&mut self) -> SubscriptionInfo {
        let allowances = Feature::ALL
            .iter()
            .map(|&feature| {
                let remaining = self.remaining(feature);
                let running_low = remaining
                    .count()
                    .is_some_and(|n| n > 0 && n <= LOW_USAGE_THRESHOLD);
                FeatureAllowance {
                    feature,
                    remaining,
                    running_low,
                }
            })
            .collect();

        let record = self.ledger.record().clone();
        let info = SubscriptionInfo {
            tier: record.tier,
            phase: self.ledger.phase(),
            start_date: record.start_date,
            end_date: record.end_date,
            days_remaining: self.ledger.days_remaining(),
            can_start_trial: self.ledger.can_start_trial(),
            definition: TierDefinition::for_tier(record.tier),
            usage: self.meter.snapshot(),
            allowances,
        };
        debug!(tier = %info.tier, "Built subscription info");
        info
    }
}
