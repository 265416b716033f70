use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub start_date: NaiveDate,
    pub owner_id: u64,
}

/// Per-group work-time window. `checkin_deadline_hour` is the first hour that
/// counts as late; `checkout_start_hour` is the first hour that counts as a
/// proper checkout. The settings editor enforces the sane ranges; the
/// classifier tolerates any ordering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({"checkin_deadline_hour": 10, "checkout_start_hour": 18}))]
pub struct GroupWorkSettings {
    #[schema(example = 10)]
    pub checkin_deadline_hour: u32,
    #[schema(example = 18)]
    pub checkout_start_hour: u32,
}

impl Default for GroupWorkSettings {
    fn default() -> Self {
        Self {
            checkin_deadline_hour: 10,
            checkout_start_hour: 18,
        }
    }
}

impl GroupWorkSettings {
    /// Write-time validation for the settings editor.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !(6..=12).contains(&self.checkin_deadline_hour) {
            return Err("checkin_deadline_hour must be between 06 and 12");
        }
        if !(14..=22).contains(&self.checkout_start_hour) {
            return Err("checkout_start_hour must be between 14 and 22");
        }
        if self.checkin_deadline_hour >= self.checkout_start_hour {
            return Err("checkin_deadline_hour must be before checkout_start_hour");
        }
        Ok(())
    }
}
