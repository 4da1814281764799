//! Billing module for subscription management and usage tracking
//!
//! This module handles:
//! - Subscription tier management (Free/Premium, one-time trial)
//! - Monthly and daily usage counters with period rollover
//! - Limit enforcement before gated actions

mod limits;
mod subscription;
mod tiers;
mod types;
mod usage;

pub use limits::{EntitlementPolicy, Entitlements, LOW_USAGE_THRESHOLD};
pub use subscription::{SubscriptionLedger, TRIAL_DAYS};
pub use tiers::{TierDefinition, TierLimits};
pub use types::{
    Feature, FeatureAllowance, LimitCheckResult, LimitDenialReason, Period, Quota, Remaining,
    SubscriptionInfo, SubscriptionPhase, SubscriptionRecord, SubscriptionTier, UnknownFeature,
    UsageRecord, YearMonth,
};
pub use usage::UsageMeter;
