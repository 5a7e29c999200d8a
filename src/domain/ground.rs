use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A venue listed by a facility owner. Grounds are managed elsewhere;
/// the booking core treats them as read-only reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ground {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub open_from: String,
    pub open_to: String,
    pub sports: Vec<Sport>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sport {
    pub name: String,
    pub price_per_hour_cents: i64,
}

impl Ground {
    pub fn sport(&self, name: &str) -> Option<&Sport> {
        self.sports.iter().find(|s| s.name == name)
    }
}
