//! Validity of a single document by its expiry date, independent of area matching.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::days_until;

/// Documents expiring within this many days are flagged for renewal.
pub const EXPIRING_SOON_DAYS: i64 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    Active,
    ExpiringSoon,
    Expired,
}

impl CertificateStatus {
    pub fn of(expiry_date: NaiveDate, today: NaiveDate) -> Self {
        let days = days_until(today, expiry_date);
        if days < 0 {
            Self::Expired
        } else if days <= EXPIRING_SOON_DAYS {
            Self::ExpiringSoon
        } else {
            Self::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::ExpiringSoon => "expiring_soon",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
