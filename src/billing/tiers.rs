//! Static tier catalogue

use serde::Serialize;

use super::types::{Feature, Quota, SubscriptionTier};

pub const FREE_TRANSCRIPTIONS_PER_MONTH: u32 = 3;
pub const FREE_ANALYSIS_PER_MONTH: u32 = 0;
pub const FREE_CHAT_MESSAGES_PER_DAY: u32 = 10;
pub const FREE_HISTORY_DAYS: u32 = 7;

pub const PREMIUM_PRICE_CENTS: u32 = 799;
pub const PREMIUM_PRICE_ID: &str = "voice_notes_premium_monthly";

/// Per-period quotas for a tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierLimits {
    pub transcriptions_per_month: Quota,
    pub analysis_per_month: Quota,
    pub chat_messages_per_day: Quota,
    /// How far back notes are listed
    pub history_days: Quota,
}

impl TierLimits {
    /// Get limits for a given tier
    pub fn for_tier(tier: SubscriptionTier) -> Self {
        match tier {
            SubscriptionTier::Free => Self {
                transcriptions_per_month: Quota::Limited(FREE_TRANSCRIPTIONS_PER_MONTH),
                analysis_per_month: Quota::Limited(FREE_ANALYSIS_PER_MONTH),
                chat_messages_per_day: Quota::Limited(FREE_CHAT_MESSAGES_PER_DAY),
                history_days: Quota::Limited(FREE_HISTORY_DAYS),
            },
            SubscriptionTier::Premium => Self {
                transcriptions_per_month: Quota::Unlimited,
                analysis_per_month: Quota::Unlimited,
                chat_messages_per_day: Quota::Unlimited,
                history_days: Quota::Unlimited,
            },
        }
    }

    /// Get the quota for a metered feature
    pub fn quota(&self, feature: Feature) -> Quota {
        match feature {
            Feature::Transcription => self.transcriptions_per_month,
            Feature::Analysis => self.analysis_per_month,
            Feature::Chat => self.chat_messages_per_day,
        }
    }
}

/// Display and pricing data for a tier
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierDefinition {
    pub id: SubscriptionTier,
    pub name: &'static str,
    pub price_cents: u32,
    pub price_id: Option<&'static str>,
    pub limits: TierLimits,
    pub features: Vec<&'static str>,
}

impl TierDefinition {
    pub fn for_tier(tier: SubscriptionTier) -> Self {
        match tier {
            SubscriptionTier::Free => Self {
                id: tier,
                name: "Free",
                price_cents: 0,
                price_id: None,
                limits: TierLimits::for_tier(tier),
                features: vec![
                    "3 transcriptions per month",
                    "Basic summary",
                    "7 days of history",
                    "Limited chat",
                ],
            },
            SubscriptionTier::Premium => Self {
                id: tier,
                name: "Premium",
                price_cents: PREMIUM_PRICE_CENTS,
                price_id: Some(PREMIUM_PRICE_ID),
                limits: TierLimits::for_tier(tier),
                features: vec![
                    "Unlimited transcriptions",
                    "All analysis packs",
                    "Unlimited history",
                    "Unlimited AI chat",
                    "Note export",
                    "Priority support",
                ],
            },
        }
    }

    /// Both tiers, cheapest first
    pub fn catalogue() -> [Self; 2] {
        [
            Self::for_tier(SubscriptionTier::Free),
            Self::for_tier(SubscriptionTier::Premium),
        ]
    }
}
