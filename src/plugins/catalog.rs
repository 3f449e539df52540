//! Bot catalogs: the fixed public price list and the admin-curated catalog
//! that bot requests reference.

use crate::core::broker::DocBroker;
use crate::core::document::AdminBot;
use crate::core::error::{self, DeskError, DeskResult};
use crate::core::output;
use crate::core::store::Store;
use crate::core::{ids, time};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[clap(name = "catalog", about = "Manage the admin bot catalog")]
pub struct CatalogCli {
    #[clap(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// Show the public bot price list.
    Prices,
    /// List catalog entries.
    List,
    /// Show one catalog entry.
    Get {
        #[clap(long)]
        id: u64,
    },
    /// Add a catalog entry.
    Add {
        #[clap(long)]
        name: String,
        #[clap(long)]
        price: Option<f64>,
        #[clap(long)]
        cost: Option<f64>,
        #[clap(long)]
        subscription_fee: Option<f64>,
    },
    /// Update a catalog entry; omitted fields keep their value.
    Update {
        #[clap(long)]
        id: u64,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        price: Option<f64>,
        #[clap(long)]
        cost: Option<f64>,
        #[clap(long)]
        subscription_fee: Option<f64>,
    },
    /// Delete a catalog entry. Existing bot requests keep their copied fields.
    Delete {
        #[clap(long)]
        id: u64,
    },
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BotPrice {
    pub name: &'static str,
    pub price: f64,
    pub billing: &'static str,
}

/// Public price list shown before sign-up. Not stored in the document.
pub const BOT_PRICES: &[BotPrice] = &[
    BotPrice { name: "Scalper", price: 49.0, billing: "monthly" },
    BotPrice { name: "Swing Trader", price: 79.0, billing: "monthly" },
    BotPrice { name: "Grid Runner", price: 99.0, billing: "monthly" },
    BotPrice { name: "Trend Follower", price: 129.0, billing: "monthly" },
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdminBot {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub subscription_fee: Option<f64>,
}

/// Partial update. `None` (and a blank name) keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBotPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub subscription_fee: Option<f64>,
}

pub fn run_catalog_cli(store: &Store, cli: CatalogCli) -> Result<(), DeskError> {
    match cli.command {
        CatalogCommand::Prices => output::emit("catalog.prices", "prices", &bot_prices()),
        CatalogCommand::List => output::emit("catalog.list", "bots", &list_admin_bots(store)?),
        CatalogCommand::Get { id } => {
            output::emit("catalog.get", "bot", &get_admin_bot(store, id)?)
        }
        CatalogCommand::Add {
            name,
            price,
            cost,
            subscription_fee,
        } => {
            let input = NewAdminBot {
                name,
                price,
                cost,
                subscription_fee,
            };
            output::emit("catalog.add", "bot", &create_admin_bot(store, &input)?)
        }
        CatalogCommand::Update {
            id,
            name,
            price,
            cost,
            subscription_fee,
        } => {
            let patch = AdminBotPatch {
                name,
                price,
                cost,
                subscription_fee,
            };
            output::emit("catalog.update", "bot", &update_admin_bot(store, id, &patch)?)
        }
        CatalogCommand::Delete { id } => {
            output::emit("catalog.delete", "bot", &delete_admin_bot(store, id)?)
        }
    }
}

pub fn bot_prices() -> Vec<BotPrice> {
    BOT_PRICES.to_vec()
}

/// Zero is a valid amount; only absent, negative or non-finite values fail.
fn amount(field: &str, value: Option<f64>) -> DeskResult<f64> {
    let value = value.ok_or_else(|| error::required(field))?;
    check_amount(field, value)
}

fn check_amount(field: &str, value: f64) -> DeskResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(DeskError::ValidationError(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )));
    }
    Ok(value)
}

pub fn create_admin_bot(store: &Store, input: &NewAdminBot) -> DeskResult<AdminBot> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(error::required("name"));
    }
    let price = amount("price", input.price)?;
    let cost = amount("cost", input.cost)?;
    let subscription_fee = amount("subscriptionFee", input.subscription_fee)?;

    DocBroker::new(store).mutate("catalog.add", |doc| {
        let bot = AdminBot {
            id: ids::next_admin_bot_id(doc),
            name: name.to_string(),
            price,
            cost,
            subscription_fee,
            created_at: time::now_iso(),
        };
        doc.admin_bots.push(bot.clone());
        Ok(bot)
    })
}

pub fn list_admin_bots(store: &Store) -> DeskResult<Vec<AdminBot>> {
    DocBroker::new(store).read("catalog.list", |doc| Ok(doc.admin_bots.clone()))
}

pub fn get_admin_bot(store: &Store, id: u64) -> DeskResult<AdminBot> {
    DocBroker::new(store).read("catalog.get", |doc| {
        doc.find_admin_bot(id)
            .cloned()
            .ok_or_else(|| DeskError::NotFound(format!("bot {}", id)))
    })
}

pub fn update_admin_bot(store: &Store, id: u64, patch: &AdminBotPatch) -> DeskResult<AdminBot> {
    let price = patch.price.map(|v| check_amount("price", v)).transpose()?;
    let cost = patch.cost.map(|v| check_amount("cost", v)).transpose()?;
    let subscription_fee = patch
        .subscription_fee
        .map(|v| check_amount("subscriptionFee", v))
        .transpose()?;
    let name = patch
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    DocBroker::new(store).mutate("catalog.update", |doc| {
        let bot = doc
            .find_admin_bot_mut(id)
            .ok_or_else(|| DeskError::NotFound(format!("bot {}", id)))?;
        if let Some(name) = name {
            bot.name = name.to_string();
        }
        bot.price = price.unwrap_or(bot.price);
        bot.cost = cost.unwrap_or(bot.cost);
        bot.subscription_fee = subscription_fee.unwrap_or(bot.subscription_fee);
        Ok(bot.clone())
    })
}

pub fn delete_admin_bot(store: &Store, id: u64) -> DeskResult<AdminBot> {
    DocBroker::new(store).mutate("catalog.delete", |doc| {
        let pos = doc
            .admin_bots
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| DeskError::NotFound(format!("bot {}", id)))?;
        Ok(doc.admin_bots.remove(pos))
    })
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "catalog",
        "version": "0.2.0",
        "description": "Public bot prices and the admin bot catalog",
        "commands": [
            { "name": "prices", "description": "Static price list" },
            { "name": "list" },
            { "name": "get", "parameters": ["id"] },
            { "name": "add", "parameters": ["name", "price", "cost", "subscription-fee"] },
            { "name": "update", "parameters": ["id", "name", "price", "cost", "subscription-fee"] },
            { "name": "delete", "parameters": ["id"] }
        ],
        "storage": ["adminBots"]
    })
}
