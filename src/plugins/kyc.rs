//! Admin review of KYC submissions.
//!
//! A KYC request is a user that has submitted a payload. Views carry the
//! user's current name and email, read at request time.

use crate::core::broker::DocBroker;
use crate::core::document::{KycSubmission, User};
use crate::core::error::{DeskError, DeskResult};
use crate::core::output;
use crate::core::store::Store;
use crate::core::workflow::{self, ApprovalStatus, Decision, KycReview};
use clap::{Parser, Subcommand};
use serde::Serialize;

#[derive(Parser, Debug)]
#[clap(name = "kyc", about = "Review KYC submissions (admin)")]
pub struct KycCli {
    #[clap(subcommand)]
    pub command: KycCommand,
}

#[derive(Subcommand, Debug)]
pub enum KycCommand {
    /// List submitted KYC requests.
    List {
        #[clap(long)]
        status: Option<String>,
    },
    /// Show one KYC request.
    Get {
        #[clap(long)]
        uid: String,
    },
    /// Approve a KYC submission.
    Approve {
        #[clap(long)]
        uid: String,
    },
    /// Reject a KYC submission.
    Reject {
        #[clap(long)]
        uid: String,
    },
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KycRequest {
    pub user_id: u64,
    pub uid: String,
    pub name: String,
    pub email: String,
    pub kyc_status: ApprovalStatus,
    pub kyc_completed: bool,
    pub kyc: KycSubmission,
}

impl KycRequest {
    fn from_user(user: &User) -> Option<Self> {
        let kyc = user.kyc.clone()?;
        Some(Self {
            user_id: user.id,
            uid: user.uid.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            kyc_status: user.kyc_status,
            kyc_completed: user.kyc_completed,
            kyc,
        })
    }
}

pub fn run_kyc_cli(store: &Store, cli: KycCli) -> Result<(), DeskError> {
    match cli.command {
        KycCommand::List { status } => {
            let status = status.map(|s| s.parse::<ApprovalStatus>()).transpose()?;
            output::emit("kyc.list", "requests", &list_kyc_requests(store, status)?)
        }
        KycCommand::Get { uid } => {
            output::emit("kyc.get", "request", &get_kyc_request(store, &uid)?)
        }
        KycCommand::Approve { uid } => {
            output::emit("kyc.approve", "request", &approve_kyc(store, &uid)?)
        }
        KycCommand::Reject { uid } => {
            output::emit("kyc.reject", "request", &reject_kyc(store, &uid)?)
        }
    }
}

pub fn list_kyc_requests(
    store: &Store,
    status: Option<ApprovalStatus>,
) -> DeskResult<Vec<KycRequest>> {
    DocBroker::new(store).read("kyc.list", |doc| {
        Ok(doc
            .users
            .iter()
            .filter(|u| status.is_none_or(|s| u.kyc_status == s))
            .filter_map(KycRequest::from_user)
            .collect())
    })
}

pub fn get_kyc_request(store: &Store, uid: &str) -> DeskResult<KycRequest> {
    DocBroker::new(store).read("kyc.get", |doc| {
        let user = doc
            .find_user(uid)
            .ok_or_else(|| DeskError::NotFound(format!("user '{}'", uid)))?;
        KycRequest::from_user(user)
            .ok_or_else(|| DeskError::NotFound(format!("no KYC submission for user '{}'", uid)))
    })
}

fn review(store: &Store, uid: &str, decision: Decision) -> DeskResult<KycRequest> {
    let op = match decision {
        Decision::Approve => "kyc.approve",
        Decision::Reject => "kyc.reject",
    };
    DocBroker::new(store).mutate(op, |doc| {
        let user = doc
            .find_user_mut(uid)
            .ok_or_else(|| DeskError::NotFound(format!("user '{}'", uid)))?;
        workflow::transition(&mut KycReview(&mut *user), decision)?;
        KycRequest::from_user(user)
            .ok_or_else(|| DeskError::NotFound(format!("no KYC submission for user '{}'", uid)))
    })
}

pub fn approve_kyc(store: &Store, uid: &str) -> DeskResult<KycRequest> {
    review(store, uid, Decision::Approve)
}

pub fn reject_kyc(store: &Store, uid: &str) -> DeskResult<KycRequest> {
    review(store, uid, Decision::Reject)
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "kyc",
        "version": "0.2.0",
        "description": "Admin review of KYC submissions",
        "commands": [
            { "name": "list", "parameters": ["status"] },
            { "name": "get", "parameters": ["uid"] },
            { "name": "approve", "parameters": ["uid"] },
            { "name": "reject", "parameters": ["uid"] }
        ],
        "storage": ["users"]
    })
}
