//! Commands for subscription management and quota checks

use std::str::FromStr;
use tracing::info;

use crate::billing::{Feature, LimitCheckResult, Remaining, SubscriptionInfo};
use crate::state::AppState;
use crate::utils::lock_or_recover;

/// Get full subscription info with limits and usage
pub fn get_subscription_info(state: &AppState) -> SubscriptionInfo {
    lock_or_recover(&state.entitlements).info()
}

/// Check if a feature would be allowed right now
///
/// Names outside the metered set are always allowed.
pub fn check_feature(state: &AppState, feature: &str) -> LimitCheckResult {
    match Feature::from_str(feature) {
        Ok(feature) => lock_or_recover(&state.entitlements).check(feature),
        Err(_) => LimitCheckResult::Allowed {
            remaining: Remaining::Unlimited,
        },
    }
}

/// Start the 7-day trial, or a paid month once the trial has been used
pub fn start_trial(state: &AppState) -> SubscriptionInfo {
    let mut entitlements = lock_or_recover(&state.entitlements);
    entitlements.upgrade(true);
    entitlements.info()
}

/// Start a paid month
pub fn upgrade_subscription(state: &AppState) -> SubscriptionInfo {
    let mut entitlements = lock_or_recover(&state.entitlements);
    entitlements.upgrade(false);
    entitlements.info()
}

pub fn cancel_subscription(state: &AppState) -> SubscriptionInfo {
    let mut entitlements = lock_or_recover(&state.entitlements);
    entitlements.cancel();
    entitlements.info()
}

/// Reports whether a premium entitlement is on record
pub fn restore_purchases(state: &AppState) -> bool {
    let restored = lock_or_recover(&state.entitlements).restore();
    info!(restored, "Restore purchases");
    restored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::{LimitDenialReason, SubscriptionPhase, SubscriptionTier};
    use crate::commands::testing::harness;

    #[test]
    fn test_fresh_install_info() {
        let h = harness();
        let info = get_subscription_info(&h.state);
        assert_eq!(info.tier, SubscriptionTier::Free);
        assert!(info.can_start_trial);
        assert_eq!(info.days_remaining, None);
        assert_eq!(info.allowances.len(), 3);
    }

    #[test]
    fn test_check_feature_names() {
        let h = harness();
        assert!(check_feature(&h.state, "transcription").is_allowed());
        assert!(check_feature(&h.state, "export").is_allowed());

        let analysis = check_feature(&h.state, "analysis");
        assert!(matches!(
            analysis.denial_reason(),
            Some(LimitDenialReason::FeatureNotIncluded { .. })
        ));
    }

    #[test]
    fn test_trial_then_cancel() {
        let h = harness();
        let info = start_trial(&h.state);
        assert_eq!(info.tier, SubscriptionTier::Premium);
        assert_eq!(info.days_remaining, Some(7));
        assert!(matches!(info.phase, SubscriptionPhase::Trialing { .. }));
        assert!(restore_purchases(&h.state));
        assert!(check_feature(&h.state, "analysis").is_allowed());

        let info = cancel_subscription(&h.state);
        assert_eq!(info.tier, SubscriptionTier::Free);
        assert!(!info.can_start_trial);
        assert!(!restore_purchases(&h.state));

        let info = start_trial(&h.state);
        assert!(matches!(info.phase, SubscriptionPhase::Subscribed { .. }));
    }

    #[test]
    fn test_upgrade_subscription() {
        let h = harness();
        let info = upgrade_subscription(&h.state);
        assert_eq!(info.tier, SubscriptionTier::Premium);
        assert!(info.can_start_trial);
        assert_eq!(info.days_remaining, Some(31));
    }
}
