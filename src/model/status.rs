use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

/// Closed set of per-day outcomes. Exactly one applies to a user-day;
/// exhaustive matches keep the aggregation buckets honest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DailyStatus {
    /// Checked in before the deadline, not yet checked out.
    Present,
    /// Checked in at or after the deadline hour.
    Late,
    /// Checked in and checked out at or after the checkout start hour.
    Checkout,
    /// Checked out before the checkout start hour.
    EarlyLeave,
    Absent,
    Vacation,
}

/// Inconsistencies the classifier reports instead of papering over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DataAnomaly {
    /// A checkout exists for the day with no checkin before it.
    CheckoutWithoutCheckin,
}

/// Derived, never persisted: reproducible from the same inputs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyRecord {
    pub user_id: u64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = String, example = "present")]
    pub status: DailyStatus,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub checkin_time: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub checkout_time: Option<DateTime<Utc>>,
    pub absence_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly: Option<DataAnomaly>,
}
