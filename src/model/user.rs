use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub department: Option<String>,
}

/// Slim row used when resolving a group's membership for aggregation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GroupMember {
    pub user_id: u64,
    pub name: String,
}
