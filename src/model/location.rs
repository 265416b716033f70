use serde::{Deserialize, Serialize};

/// A registered physical place a QR code is bound to. Bare (non-session) QR
/// payloads must resolve against this table before a scan is accepted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Location {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
