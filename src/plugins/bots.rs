//! Bot assignments: a user's request to run a catalog bot on one of their
//! brokerage accounts, and the admin review of those requests.

use crate::core::broker::DocBroker;
use crate::core::document::{Bot, Document};
use crate::core::error::{self, DeskError, DeskResult};
use crate::core::output;
use crate::core::store::Store;
use crate::core::workflow::{self, ApprovalStatus, Decision};
use crate::core::{ids, time};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[clap(name = "bot", about = "Request bots for brokerage accounts")]
pub struct BotCli {
    #[clap(subcommand)]
    pub command: BotCommand,
}

#[derive(Subcommand, Debug)]
pub enum BotCommand {
    /// Request a catalog bot for one of the user's accounts.
    Assign {
        #[clap(long)]
        uid: String,
        #[clap(long)]
        broker_account_id: u64,
        #[clap(long)]
        bot_id: u64,
        #[clap(long)]
        signed_agreement_url: String,
    },
    /// List the bot assignments of a user.
    List {
        #[clap(long)]
        uid: String,
    },
}

#[derive(Parser, Debug)]
#[clap(name = "request", about = "Review bot requests (admin)")]
pub struct RequestCli {
    #[clap(subcommand)]
    pub command: RequestCommand,
}

#[derive(Subcommand, Debug)]
pub enum RequestCommand {
    /// List bot requests.
    List {
        #[clap(long)]
        status: Option<String>,
    },
    /// Show one bot request.
    Get {
        #[clap(long)]
        id: u64,
    },
    /// Approve a bot request.
    Approve {
        #[clap(long)]
        id: u64,
    },
    /// Reject a bot request.
    Reject {
        #[clap(long)]
        id: u64,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBotAssignment {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub broker_account_id: u64,
    #[serde(default)]
    pub bot_id: u64,
    #[serde(default)]
    pub signed_agreement_url: String,
}

/// Admin view of a bot request with the owner's current name and email.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BotRequest {
    #[serde(flatten)]
    pub bot: Bot,
    pub user_name: String,
    pub user_email: String,
}

impl BotRequest {
    fn enrich(doc: &Document, bot: &Bot) -> Self {
        let (user_name, user_email) = match doc.find_user(&bot.uid) {
            Some(user) => (user.name.clone(), user.email.clone()),
            None => ("Unknown".to_string(), String::new()),
        };
        Self {
            bot: bot.clone(),
            user_name,
            user_email,
        }
    }
}

pub fn run_bot_cli(store: &Store, cli: BotCli) -> Result<(), DeskError> {
    match cli.command {
        BotCommand::Assign {
            uid,
            broker_account_id,
            bot_id,
            signed_agreement_url,
        } => {
            let input = NewBotAssignment {
                uid,
                broker_account_id,
                bot_id,
                signed_agreement_url,
            };
            output::emit("bot.assign", "bot", &assign_bot(store, &input)?)
        }
        BotCommand::List { uid } => output::emit("bot.list", "bots", &list_user_bots(store, &uid)?),
    }
}

pub fn run_request_cli(store: &Store, cli: RequestCli) -> Result<(), DeskError> {
    match cli.command {
        RequestCommand::List { status } => {
            let status = status.map(|s| s.parse::<ApprovalStatus>()).transpose()?;
            output::emit("request.list", "requests", &list_bot_requests(store, status)?)
        }
        RequestCommand::Get { id } => {
            output::emit("request.get", "request", &get_bot_request(store, id)?)
        }
        RequestCommand::Approve { id } => {
            output::emit("request.approve", "request", &approve_bot_request(store, id)?)
        }
        RequestCommand::Reject { id } => {
            output::emit("request.reject", "request", &reject_bot_request(store, id)?)
        }
    }
}

/// Creates a pending bot request.
///
/// References are resolved in order (user, then the account owned by that
/// user, then the catalog bot) and the first miss is reported. Catalog name
/// and price plus account broker and number are copied onto the record.
pub fn assign_bot(store: &Store, input: &NewBotAssignment) -> DeskResult<Bot> {
    let uid = input.uid.trim();
    if uid.is_empty() {
        return Err(error::required("uid"));
    }
    if input.broker_account_id == 0 {
        return Err(error::required("brokerAccountId"));
    }
    if input.bot_id == 0 {
        return Err(error::required("botId"));
    }
    let agreement = input.signed_agreement_url.trim();
    if agreement.is_empty() {
        return Err(error::required("signedAgreementUrl"));
    }

    DocBroker::new(store).mutate("bot.assign", |doc| {
        if doc.find_user(uid).is_none() {
            return Err(DeskError::NotFound(format!("user '{}'", uid)));
        }
        let account = doc
            .find_account(input.broker_account_id, uid)
            .ok_or_else(|| {
                DeskError::NotFound(format!(
                    "account {} for user '{}'",
                    input.broker_account_id, uid
                ))
            })?;
        let catalog_bot = doc
            .find_admin_bot(input.bot_id)
            .ok_or_else(|| DeskError::NotFound(format!("bot {}", input.bot_id)))?;

        let bot = Bot {
            id: ids::next_bot_id(doc),
            uid: uid.to_string(),
            broker_account_id: account.id,
            bot_id: catalog_bot.id,
            signed_agreement_url: agreement.to_string(),
            bot_name: catalog_bot.name.clone(),
            price: catalog_bot.price,
            broker: account.broker.clone(),
            account_number: account.account_number.clone(),
            status: ApprovalStatus::Pending,
            created_at: time::now_iso(),
        };
        doc.bots.push(bot.clone());
        Ok(bot)
    })
}

pub fn list_user_bots(store: &Store, uid: &str) -> DeskResult<Vec<Bot>> {
    DocBroker::new(store).read("bot.list", |doc| {
        Ok(doc.bots.iter().filter(|b| b.uid == uid).cloned().collect())
    })
}

pub fn list_bot_requests(
    store: &Store,
    status: Option<ApprovalStatus>,
) -> DeskResult<Vec<BotRequest>> {
    DocBroker::new(store).read("request.list", |doc| {
        Ok(doc
            .bots
            .iter()
            .filter(|b| status.is_none_or(|s| b.status == s))
            .map(|b| BotRequest::enrich(doc, b))
            .collect())
    })
}

pub fn get_bot_request(store: &Store, id: u64) -> DeskResult<BotRequest> {
    DocBroker::new(store).read("request.get", |doc| {
        doc.find_bot(id)
            .map(|b| BotRequest::enrich(doc, b))
            .ok_or_else(|| DeskError::NotFound(format!("bot request {}", id)))
    })
}

fn review(store: &Store, id: u64, decision: Decision) -> DeskResult<BotRequest> {
    let op = match decision {
        Decision::Approve => "request.approve",
        Decision::Reject => "request.reject",
    };
    DocBroker::new(store).mutate(op, |doc| {
        let bot = doc
            .find_bot_mut(id)
            .ok_or_else(|| DeskError::NotFound(format!("bot request {}", id)))?;
        workflow::transition(bot, decision)?;
        let bot = bot.clone();
        Ok(BotRequest::enrich(doc, &bot))
    })
}

pub fn approve_bot_request(store: &Store, id: u64) -> DeskResult<BotRequest> {
    review(store, id, Decision::Approve)
}

pub fn reject_bot_request(store: &Store, id: u64) -> DeskResult<BotRequest> {
    review(store, id, Decision::Reject)
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "bot",
        "version": "0.3.0",
        "description": "Bot assignments and their admin review",
        "commands": [
            { "name": "assign", "parameters": ["uid", "broker-account-id", "bot-id", "signed-agreement-url"] },
            { "name": "list", "parameters": ["uid"] },
            { "name": "request list", "parameters": ["status"] },
            { "name": "request get", "parameters": ["id"] },
            { "name": "request approve", "parameters": ["id"] },
            { "name": "request reject", "parameters": ["id"] }
        ],
        "storage": ["bots"]
    })
}
