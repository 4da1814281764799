//! Billing data types

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::tiers::TierDefinition;

/// Subscription tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Premium,
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Premium => write!(f, "premium"),
        }
    }
}

/// Metered feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Transcription,
    Analysis,
    Chat,
}

impl Feature {
    pub const ALL: [Feature; 3] = [Feature::Transcription, Feature::Analysis, Feature::Chat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transcription => "transcription",
            Self::Analysis => "analysis",
            Self::Chat => "chat",
        }
    }

    /// Period over which the feature's counter accumulates
    pub fn period(&self) -> Period {
        match self {
            Self::Transcription | Self::Analysis => Period::Monthly,
            Self::Chat => Period::Daily,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFeature(pub String);

impl fmt::Display for UnknownFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown feature: {}", self.0)
    }
}

impl std::error::Error for UnknownFeature {}

impl FromStr for Feature {
    type Err = UnknownFeature;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "transcription" => Ok(Self::Transcription),
            "analysis" => Ok(Self::Analysis),
            "chat" => Ok(Self::Chat),
            other => Err(UnknownFeature(other.to_string())),
        }
    }
}

/// Counter period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Monthly,
}

/// Per-period allowance for a feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quota {
    Limited(u32),
    Unlimited,
}

/// What is left of a quota
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Count(u32),
    Unlimited,
}

impl Remaining {
    pub fn is_available(&self) -> bool {
        match self {
            Self::Count(n) => *n > 0,
            Self::Unlimited => true,
        }
    }

    pub fn count(&self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(*n),
            Self::Unlimited => None,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(n) => write!(f, "{}", n),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Numbers for counts, the string `"unlimited"` otherwise
impl Serialize for Remaining {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Count(n) => serializer.serialize_u32(*n),
            Self::Unlimited => serializer.serialize_str("unlimited"),
        }
    }
}

/// Calendar month, persisted as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got {:?}", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in {:?}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in {:?}", s))?;
        if !(1..=12).contains(&month) {
            return Err(format!("month out of range in {:?}", s));
        }
        Ok(Self { year, month })
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for YearMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Persisted subscription record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub tier: SubscriptionTier,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trial_used: bool,
}

/// Persisted usage counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub transcriptions_this_month: u32,
    pub analysis_this_month: u32,
    pub chat_messages_today: u32,
    pub last_reset_date: NaiveDate,
    pub month_reset_date: YearMonth,
}

impl UsageRecord {
    /// Zeroed counters with reset dates set to `today`
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            transcriptions_this_month: 0,
            analysis_this_month: 0,
            chat_messages_today: 0,
            last_reset_date: today,
            month_reset_date: YearMonth::of(today),
        }
    }

    pub fn count(&self, feature: Feature) -> u32 {
        match feature {
            Feature::Transcription => self.transcriptions_this_month,
            Feature::Analysis => self.analysis_this_month,
            Feature::Chat => self.chat_messages_today,
        }
    }

    pub(crate) fn counter_mut(&mut self, feature: Feature) -> &mut u32 {
        match feature {
            Feature::Transcription => &mut self.transcriptions_this_month,
            Feature::Analysis => &mut self.analysis_this_month,
            Feature::Chat => &mut self.chat_messages_today,
        }
    }
}

/// Subscription state derived from the record and the current time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
#[serde(tag = "type")]
pub enum SubscriptionPhase {
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "trialing")]
    Trialing { ends_at: DateTime<Utc> },
    /// `ends_at` is only missing for hand-edited records
    #[serde(rename = "subscribed")]
    Subscribed { ends_at: Option<DateTime<Utc>> },
    #[serde(rename = "expired")]
    Expired { since: DateTime<Utc> },
}

impl SubscriptionPhase {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Trialing { .. } | Self::Subscribed { .. })
    }
}

/// Result of a limit check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
#[serde(tag = "type")]
pub enum LimitCheckResult {
    #[serde(rename = "allowed")]
    Allowed { remaining: Remaining },
    #[serde(rename = "denied")]
    Denied {
        reason: LimitDenialReason,
        upgrade_url: Option<String>,
    },
}

impl LimitCheckResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    pub fn denial_reason(&self) -> Option<&LimitDenialReason> {
        match self {
            Self::Denied { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Reason for denying a feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
#[serde(tag = "type")]
pub enum LimitDenialReason {
    #[serde(rename = "monthlyLimitReached")]
    MonthlyLimitReached {
        feature: Feature,
        limit: u32,
        used: u32,
    },
    #[serde(rename = "dailyLimitReached")]
    DailyLimitReached {
        feature: Feature,
        limit: u32,
        used: u32,
    },
    /// The tier grants no allowance at all
    #[serde(rename = "featureNotIncluded")]
    FeatureNotIncluded {
        feature: Feature,
        required_tier: SubscriptionTier,
    },
}

impl LimitDenialReason {
    pub fn feature(&self) -> Feature {
        match self {
            Self::MonthlyLimitReached { feature, .. }
            | Self::DailyLimitReached { feature, .. }
            | Self::FeatureNotIncluded { feature, .. } => *feature,
        }
    }
}

impl fmt::Display for LimitDenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MonthlyLimitReached {
                feature,
                limit,
                used,
            } => write!(
                f,
                "Monthly {} limit reached: {}/{} used",
                feature, used, limit
            ),
            Self::DailyLimitReached {
                feature,
                limit,
                used,
            } => write!(f, "Daily {} limit reached: {}/{} used", feature, used, limit),
            Self::FeatureNotIncluded {
                feature,
                required_tier,
            } => write!(f, "{} requires a {} subscription", feature, required_tier),
        }
    }
}

/// Remaining allowance for one feature
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAllowance {
    pub feature: Feature,
    pub remaining: Remaining,
    /// Few uses left; the UI shows a warning badge
    pub running_low: bool,
}

/// Full subscription snapshot for display
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionInfo {
    pub tier: SubscriptionTier,
    pub phase: SubscriptionPhase,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub days_remaining: Option<u32>,
    pub can_start_trial: bool,
    pub definition: TierDefinition,
    pub usage: UsageRecord,
    pub allowances: Vec<FeatureAllowance>,
}
