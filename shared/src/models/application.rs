//! Credit application models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::types::FarmerId;
use crate::validation::ValidationError;

/// Lifecycle of a loan application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    UnderReview,
    Approved,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Decided applications cannot be edited any more
    pub fn is_final(&self) -> bool {
        matches!(self, ApplicationStatus::Approved | ApplicationStatus::Rejected)
    }

    /// Whether the applicant may move an application from `self` to `next`.
    /// Only the lender approves or rejects.
    pub fn applicant_can_move_to(&self, next: ApplicationStatus) -> bool {
        !self.is_final() && !next.is_final()
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApplicationStatus::Pending),
            "under_review" => Ok(ApplicationStatus::UnderReview),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => Err(ValidationError::new(
                "status",
                format!("unknown application status '{}'", other),
            )),
        }
    }
}

/// A loan application submitted by a farmer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditApplication {
    pub id: Uuid,
    pub farmer_id: FarmerId,
    pub loan_amount: Decimal,
    pub loan_purpose: String,
    /// Term in months
    pub loan_term: i32,
    pub loan_description: Option<String>,
    pub farm_name: Option<String>,
    pub farm_size: Option<Decimal>,
    pub farm_location: Option<String>,
    pub primary_crop: Option<String>,
    /// Years of farming experience
    pub farming_experience: Option<i32>,
    pub previous_yield: Option<Decimal>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
