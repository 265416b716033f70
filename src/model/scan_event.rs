use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ScanType {
    Checkin,
    Checkout,
}

/// One raw attendance log row. Append-only from the scanning flow; mutable
/// only through the explicit edit endpoint, which sets the audit columns.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ScanEvent {
    pub id: u64,
    pub user_id: u64,
    pub group_id: Option<u64>,
    #[schema(value_type = String, format = "date-time")]
    pub scan_time: DateTime<Utc>,
    #[schema(value_type = String, example = "checkin")]
    pub scan_type: ScanType,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub absence_reason: Option<String>,
    pub is_edited: bool,
    pub edited_by: Option<u64>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub edited_at: Option<DateTime<Utc>>,
}
