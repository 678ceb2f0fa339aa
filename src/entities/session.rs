use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Account;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
    pub account: Account,
}

impl Session {
    pub fn new(account: Account, ttl: Duration) -> Self {
        Self {
            token: Uuid::new_v4(),
            expires_at: Utc::now() + ttl,
            account,
        }
    }
}
