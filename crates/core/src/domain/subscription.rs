use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionData {
    pub email: String,
    pub notification_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
}

impl SubscriptionData {
    /// Services that omit `is_new` leave `updated_at == created_at` on first insert.
    pub fn is_new_subscriber(&self) -> bool {
        self.is_new.unwrap_or(self.created_at == self.updated_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unsubscribed {
    #[serde(default)]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn infers_new_subscriber_from_timestamps_when_flag_missing() {
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let mut data = SubscriptionData {
            email: "a@b.co".into(),
            notification_enabled: true,
            created_at: t0,
            updated_at: t0,
            is_new: None,
        };
        assert!(data.is_new_subscriber());

        data.updated_at = t1;
        assert!(!data.is_new_subscriber());

        data.is_new = Some(true);
        assert!(data.is_new_subscriber());
    }
}
