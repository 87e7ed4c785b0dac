//! Moderation state machine shared by submitted projects and alumni experiences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

impl Display for ModerationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ModerationStatus::Pending => write!(f, "Pending"),
            ModerationStatus::Approved => write!(f, "Approved"),
            ModerationStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

impl FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(ModerationStatus::Pending),
            "approved" => Ok(ModerationStatus::Approved),
            "rejected" => Ok(ModerationStatus::Rejected),
            other => Err(format!("Unknown moderation status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move from {from} to {to}")]
pub struct TransitionError {
    pub from: ModerationStatus,
    pub to: ModerationStatus,
}

/// Moderation fields, flattened into the owning record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Moderation {
    pub status: ModerationStatus,
    pub submitted_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
}

impl Moderation {
    pub fn pending(now: DateTime<Utc>) -> Self {
        Self {
            status: ModerationStatus::Pending,
            submitted_at: now,
            approved_at: None,
            approved_by: None,
        }
    }

    /// Apply an admin decision. Returns `Ok(false)` when the record is already in
    /// `target`, leaving the approval stamp untouched.
    pub fn transition(
        &mut self,
        target: ModerationStatus,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, TransitionError> {
        use ModerationStatus::*;

        if self.status == target {
            return Ok(false);
        }

        match (self.status, target) {
            (Pending, Approved) | (Rejected, Approved) => {
                self.approved_at = Some(now);
                self.approved_by = Some(actor.to_string());
            }
            (Pending, Rejected) | (Approved, Rejected) => {
                self.approved_at = None;
                self.approved_by = None;
            }
            (from, to) => return Err(TransitionError { from, to }),
        }

        self.status = target;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn approve_stamps_and_reject_clears() {
        let t0 = Utc::now();
        let mut m = Moderation::pending(t0);

        assert!(m.transition(ModerationStatus::Approved, "TPO", t0).unwrap());
        assert_eq!(m.approved_at, Some(t0));
        assert_eq!(m.approved_by.as_deref(), Some("TPO"));

        assert!(m.transition(ModerationStatus::Rejected, "TPO", t0).unwrap());
        assert_eq!(m.status, ModerationStatus::Rejected);
        assert_eq!(m.approved_at, None);
        assert_eq!(m.approved_by, None);

        let t1 = t0 + Duration::minutes(5);
        assert!(m.transition(ModerationStatus::Approved, "Dean", t1).unwrap());
        assert_eq!(m.approved_at, Some(t1));
        assert_eq!(m.approved_by.as_deref(), Some("Dean"));
    }

    #[test]
    fn repeating_a_transition_is_a_no_op() {
        let t0 = Utc::now();
        let mut m = Moderation::pending(t0);
        m.transition(ModerationStatus::Approved, "Admin", t0).unwrap();
        let stamped = m.clone();

        let later = t0 + Duration::hours(1);
        assert!(!m
            .transition(ModerationStatus::Approved, "Someone Else", later)
            .unwrap());
        assert_eq!(m, stamped);
    }

    #[test]
    fn nothing_returns_to_pending() {
        let mut m = Moderation::pending(Utc::now());
        m.transition(ModerationStatus::Rejected, "Admin", Utc::now())
            .unwrap();
        let err = m
            .transition(ModerationStatus::Pending, "Admin", Utc::now())
            .unwrap_err();
        assert_eq!(err.from, ModerationStatus::Rejected);
        assert_eq!(err.to, ModerationStatus::Pending);
        assert_eq!(m.status, ModerationStatus::Rejected);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "approved".parse::<ModerationStatus>().unwrap(),
            ModerationStatus::Approved
        );
        assert!("archived".parse::<ModerationStatus>().is_err());
    }
}
