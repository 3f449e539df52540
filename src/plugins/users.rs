//! Users: idempotent registration keyed by the identity provider's uid,
//! profile lookups, admin approval/deletion, and KYC submission.
//!
//! Admin KYC review lives in [`crate::plugins::kyc`].

use crate::core::broker::DocBroker;
use crate::core::document::{KycSubmission, User};
use crate::core::error::{self, DeskError, DeskResult};
use crate::core::output;
use crate::core::store::Store;
use crate::core::workflow::{self, ApprovalStatus, Decision};
use crate::core::{ids, time};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[clap(name = "user", about = "Register, inspect and approve users")]
pub struct UserCli {
    #[clap(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Register a user, or return the existing one for this uid.
    Register {
        #[clap(long)]
        uid: String,
        #[clap(long)]
        email: String,
        #[clap(long, default_value = "")]
        name: String,
    },
    /// Show a user record.
    Get {
        #[clap(long)]
        uid: String,
    },
    /// Show the public profile of a user.
    Profile {
        #[clap(long)]
        uid: String,
    },
    /// List users (admin).
    List {
        /// Only users with this account status.
        #[clap(long)]
        status: Option<String>,
    },
    /// Approve a user account (admin).
    Approve {
        #[clap(long)]
        id: u64,
    },
    /// Delete a user (admin). Accounts and bots of the user are kept.
    Delete {
        #[clap(long)]
        id: u64,
    },
    /// Submit or replace the KYC payload of a user.
    SubmitKyc {
        #[clap(long)]
        uid: String,
        #[clap(flatten)]
        kyc: KycInput,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(clap::Args, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycInput {
    #[clap(long, default_value = "")]
    #[serde(default)]
    pub full_name: String,
    #[clap(long, default_value = "")]
    #[serde(default)]
    pub date_of_birth: String,
    #[clap(long, default_value = "")]
    #[serde(default)]
    pub address: String,
    #[clap(long, default_value = "")]
    #[serde(default)]
    pub id_type: String,
    #[clap(long, default_value = "")]
    #[serde(default)]
    pub id_number: String,
    #[clap(long)]
    #[serde(default)]
    pub phone: Option<String>,
    #[clap(long)]
    #[serde(default)]
    pub nationality: Option<String>,
    /// Identity document front side (base64).
    #[clap(long)]
    #[serde(default)]
    pub id_front_image: Option<String>,
    #[clap(long)]
    #[serde(default)]
    pub id_back_image: Option<String>,
    #[clap(long)]
    #[serde(default)]
    pub selfie_image: Option<String>,
}

/// Outcome of [`register_user`]. A repeated uid is a success, not a conflict.
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    Created(User),
    Existing(User),
}

impl Registration {
    pub fn user(&self) -> &User {
        match self {
            Registration::Created(u) | Registration::Existing(u) => u,
        }
    }

    pub fn into_user(self) -> User {
        match self {
            Registration::Created(u) | Registration::Existing(u) => u,
        }
    }

    pub fn is_created(&self) -> bool {
        matches!(self, Registration::Created(_))
    }

    /// 201 for a new record, 200 when the uid was already registered.
    pub fn status_code(&self) -> u16 {
        if self.is_created() { 201 } else { 200 }
    }
}

/// The subset of a user that may be shown to other users.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: u64,
    pub uid: String,
    pub name: String,
    pub status: ApprovalStatus,
    pub kyc_status: ApprovalStatus,
    pub kyc_completed: bool,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            uid: user.uid.clone(),
            name: user.name.clone(),
            status: user.status,
            kyc_status: user.kyc_status,
            kyc_completed: user.kyc_completed,
        }
    }
}

pub fn run_user_cli(store: &Store, cli: UserCli) -> Result<(), DeskError> {
    match cli.command {
        UserCommand::Register { uid, email, name } => {
            let reg = register_user(store, &NewUser { uid, email, name })?;
            let cmd = if reg.is_created() { "user.register" } else { "user.existing" };
            output::emit(cmd, "user", reg.user())
        }
        UserCommand::Get { uid } => output::emit("user.get", "user", &get_user(store, &uid)?),
        UserCommand::Profile { uid } => {
            output::emit("user.profile", "profile", &public_profile(store, &uid)?)
        }
        UserCommand::List { status } => {
            let status = status.map(|s| s.parse::<ApprovalStatus>()).transpose()?;
            output::emit("user.list", "users", &list_users(store, status)?)
        }
        UserCommand::Approve { id } => {
            output::emit("user.approve", "user", &approve_user(store, id)?)
        }
        UserCommand::Delete { id } => output::emit("user.delete", "user", &delete_user(store, id)?),
        UserCommand::SubmitKyc { uid, kyc } => {
            output::emit("user.kyc", "user", &submit_kyc(store, &uid, &kyc)?)
        }
    }
}

fn validate_email(email: &str) -> DeskResult<()> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(DeskError::ValidationError(format!(
            "invalid email '{}'",
            email
        ))),
    }
}

pub fn register_user(store: &Store, input: &NewUser) -> DeskResult<Registration> {
    let uid = input.uid.trim();
    let email = input.email.trim();
    if uid.is_empty() {
        return Err(error::required("uid"));
    }
    if email.is_empty() {
        return Err(error::required("email"));
    }

    let broker = DocBroker::new(store);
    // Repeat registrations are answered without a write or an audit event.
    let existing = broker.read("user.register", |doc| Ok(doc.find_user(uid).cloned()))?;
    if let Some(existing) = existing {
        return Ok(Registration::Existing(existing));
    }
    validate_email(email)?;

    broker.mutate("user.register", |doc| {
        // Another writer may have registered the uid since the read above.
        if let Some(existing) = doc.find_user(uid) {
            return Ok(Registration::Existing(existing.clone()));
        }
        let user = User {
            id: ids::next_user_id(doc),
            uid: uid.to_string(),
            email: email.to_string(),
            name: input.name.trim().to_string(),
            status: ApprovalStatus::Pending,
            kyc_completed: false,
            kyc_status: ApprovalStatus::Pending,
            kyc: None,
        };
        log::info!("registered user {} as id {}", user.uid, user.id);
        doc.users.push(user.clone());
        Ok(Registration::Created(user))
    })
}

fn user_not_found(uid: &str) -> DeskError {
    DeskError::NotFound(format!("user '{}'", uid))
}

pub fn get_user(store: &Store, uid: &str) -> DeskResult<User> {
    DocBroker::new(store).read("user.get", |doc| {
        doc.find_user(uid).cloned().ok_or_else(|| user_not_found(uid))
    })
}

pub fn public_profile(store: &Store, uid: &str) -> DeskResult<PublicProfile> {
    get_user(store, uid).map(|u| PublicProfile::from(&u))
}

pub fn list_users(store: &Store, status: Option<ApprovalStatus>) -> DeskResult<Vec<User>> {
    DocBroker::new(store).read("user.list", |doc| {
        Ok(doc
            .users
            .iter()
            .filter(|u| status.is_none_or(|s| u.status == s))
            .cloned()
            .collect())
    })
}

pub fn approve_user(store: &Store, id: u64) -> DeskResult<User> {
    DocBroker::new(store).mutate("user.approve", |doc| {
        let user = doc
            .find_user_by_id_mut(id)
            .ok_or_else(|| DeskError::NotFound(format!("user id {}", id)))?;
        workflow::transition(user, Decision::Approve)?;
        Ok(user.clone())
    })
}

/// Removes the user record only; accounts and bot requests that reference
/// its uid stay in place and show up as owned by "Unknown".
pub fn delete_user(store: &Store, id: u64) -> DeskResult<User> {
    DocBroker::new(store).mutate("user.delete", |doc| {
        let pos = doc
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| DeskError::NotFound(format!("user id {}", id)))?;
        let removed = doc.users.remove(pos);
        log::info!("deleted user {} (id {})", removed.uid, removed.id);
        Ok(removed)
    })
}

fn build_submission(input: &KycInput) -> DeskResult<KycSubmission> {
    let required_fields = [
        ("fullName", &input.full_name),
        ("dateOfBirth", &input.date_of_birth),
        ("address", &input.address),
        ("idType", &input.id_type),
        ("idNumber", &input.id_number),
    ];
    for (field, value) in required_fields {
        if value.trim().is_empty() {
            return Err(error::required(field));
        }
    }
    let optional = |v: &Option<String>| v.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    Ok(KycSubmission {
        full_name: input.full_name.trim().to_string(),
        date_of_birth: input.date_of_birth.trim().to_string(),
        address: input.address.trim().to_string(),
        id_type: input.id_type.trim().to_string(),
        id_number: input.id_number.trim().to_string(),
        phone: optional(&input.phone),
        nationality: optional(&input.nationality),
        id_front_image: input.id_front_image.clone(),
        id_back_image: input.id_back_image.clone(),
        selfie_image: input.selfie_image.clone(),
        submitted_at: time::now_iso(),
    })
}

/// Stores the submission and puts the user's KYC back into review.
/// `kyc_completed` becomes true on the first submission and stays true.
pub fn submit_kyc(store: &Store, uid: &str, input: &KycInput) -> DeskResult<User> {
    let submission = build_submission(input)?;
    DocBroker::new(store).mutate("user.kyc.submit", |doc| {
        let user = doc.find_user_mut(uid).ok_or_else(|| user_not_found(uid))?;
        user.kyc = Some(submission);
        user.kyc_completed = true;
        user.kyc_status = ApprovalStatus::Pending;
        Ok(user.clone())
    })
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "user",
        "version": "0.3.0",
        "description": "Users keyed by external uid, with KYC submission",
        "commands": [
            { "name": "register", "parameters": ["uid", "email", "name"] },
            { "name": "get", "parameters": ["uid"] },
            { "name": "profile", "parameters": ["uid"] },
            { "name": "list", "parameters": ["status"] },
            { "name": "approve", "parameters": ["id"] },
            { "name": "delete", "parameters": ["id"] },
            { "name": "submit-kyc", "parameters": ["uid", "full-name", "date-of-birth", "address", "id-type", "id-number"] }
        ],
        "storage": ["users"]
    })
}
