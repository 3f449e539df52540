//! Approval workflow shared by user accounts, KYC submissions and bot requests.
//!
//! Every record starts `pending`. An admin decision moves it to `approved` or
//! `rejected`. Decisions are not guarded against re-entry: an approved record
//! can later be rejected and vice versa, so admins can correct mistakes. The
//! only precondition beyond the record existing is whatever the record itself
//! declares through [`Approvable::check_reviewable`].

use crate::core::document::{Bot, User};
use crate::core::error::{DeskError, DeskResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(DeskError::ValidationError(format!(
                "unknown status '{}': expected pending, approved or rejected",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn target(self) -> ApprovalStatus {
        match self {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// A record carrying one approval status.
pub trait Approvable {
    /// Label used in error messages and audit ops ("user", "kyc", "bot request").
    fn kind(&self) -> &'static str;
    fn approval_status(&self) -> ApprovalStatus;
    fn set_approval_status(&mut self, status: ApprovalStatus);

    fn check_reviewable(&self) -> DeskResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: ApprovalStatus,
    pub to: ApprovalStatus,
}

/// Applies `decision` to `record`, returning the status change.
pub fn transition<A: Approvable + ?Sized>(record: &mut A, decision: Decision) -> DeskResult<Transition> {
    record.check_reviewable()?;
    let from = record.approval_status();
    let to = decision.target();
    record.set_approval_status(to);
    log::debug!("{} transition {} -> {}", record.kind(), from, to);
    Ok(Transition { from, to })
}

/// Account status of a user.
impl Approvable for User {
    fn kind(&self) -> &'static str {
        "user"
    }

    fn approval_status(&self) -> ApprovalStatus {
        self.status
    }

    fn set_approval_status(&mut self, status: ApprovalStatus) {
        self.status = status;
    }
}

impl Approvable for Bot {
    fn kind(&self) -> &'static str {
        "bot request"
    }

    fn approval_status(&self) -> ApprovalStatus {
        self.status
    }

    fn set_approval_status(&mut self, status: ApprovalStatus) {
        self.status = status;
    }
}

/// KYC status view over a user. `kyc_completed` is never touched here: it
/// records that a submission happened, not how it was judged.
pub struct KycReview<'a>(pub &'a mut User);

impl Approvable for KycReview<'_> {
    fn kind(&self) -> &'static str {
        "kyc"
    }

    fn approval_status(&self) -> ApprovalStatus {
        self.0.kyc_status
    }

    fn set_approval_status(&mut self, status: ApprovalStatus) {
        self.0.kyc_status = status;
    }

    fn check_reviewable(&self) -> DeskResult<()> {
        if self.0.kyc.is_none() {
            return Err(DeskError::NotFound(format!(
                "no KYC submission for user '{}'",
                self.0.uid
            )));
        }
        Ok(())
    }
}
