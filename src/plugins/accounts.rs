//! Brokerage accounts owned by users.

use crate::core::broker::DocBroker;
use crate::core::document::Account;
use crate::core::error::{self, DeskError, DeskResult};
use crate::core::ids;
use crate::core::output;
use crate::core::store::Store;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[clap(name = "account", about = "Manage brokerage accounts")]
pub struct AccountCli {
    #[clap(subcommand)]
    pub command: AccountCommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    /// Add a brokerage account for a user.
    Add {
        #[clap(long)]
        uid: String,
        #[clap(long)]
        broker: String,
        #[clap(long)]
        account_type: String,
        #[clap(long)]
        account_number: String,
    },
    /// List the accounts of a user.
    List {
        #[clap(long)]
        uid: String,
    },
    /// Delete one of the user's accounts.
    Delete {
        #[clap(long)]
        uid: String,
        #[clap(long)]
        id: u64,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(default)]
    pub broker: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub account_number: String,
}

pub fn run_account_cli(store: &Store, cli: AccountCli) -> Result<(), DeskError> {
    match cli.command {
        AccountCommand::Add {
            uid,
            broker,
            account_type,
            account_number,
        } => {
            let input = NewAccount {
                broker,
                account_type,
                account_number,
            };
            output::emit("account.add", "account", &create_account(store, &uid, &input)?)
        }
        AccountCommand::List { uid } => {
            output::emit("account.list", "accounts", &list_accounts(store, &uid)?)
        }
        AccountCommand::Delete { uid, id } => {
            output::emit("account.delete", "account", &delete_account(store, &uid, id)?)
        }
    }
}

pub fn create_account(store: &Store, uid: &str, input: &NewAccount) -> DeskResult<Account> {
    let fields = [
        ("broker", &input.broker),
        ("accountType", &input.account_type),
        ("accountNumber", &input.account_number),
    ];
    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(error::required(field));
        }
    }

    DocBroker::new(store).mutate("account.add", |doc| {
        if doc.find_user(uid).is_none() {
            return Err(DeskError::NotFound(format!("user '{}'", uid)));
        }
        let account = Account {
            id: ids::next_account_id(doc),
            uid: uid.to_string(),
            broker: input.broker.trim().to_string(),
            account_type: input.account_type.trim().to_string(),
            account_number: input.account_number.trim().to_string(),
        };
        doc.accounts.push(account.clone());
        Ok(account)
    })
}

pub fn list_accounts(store: &Store, uid: &str) -> DeskResult<Vec<Account>> {
    DocBroker::new(store).read("account.list", |doc| {
        Ok(doc.accounts.iter().filter(|a| a.uid == uid).cloned().collect())
    })
}

/// Deletes by (uid, id) together, so a uid can only remove its own accounts.
pub fn delete_account(store: &Store, uid: &str, id: u64) -> DeskResult<Account> {
    DocBroker::new(store).mutate("account.delete", |doc| {
        let pos = doc
            .accounts
            .iter()
            .position(|a| a.id == id && a.uid == uid)
            .ok_or_else(|| DeskError::NotFound(format!("account {} for user '{}'", id, uid)))?;
        Ok(doc.accounts.remove(pos))
    })
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "account",
        "version": "0.2.0",
        "description": "Brokerage accounts owned by users",
        "commands": [
            { "name": "add", "parameters": ["uid", "broker", "account-type", "account-number"] },
            { "name": "list", "parameters": ["uid"] },
            { "name": "delete", "parameters": ["uid", "id"] }
        ],
        "storage": ["accounts"]
    })
}
