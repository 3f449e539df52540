//! brokerdesk: a single-file record store for brokerage onboarding.
//!
//! Tracks users, their KYC submissions, brokerage accounts, trading-bot
//! subscriptions, an admin-curated bot catalog and job applications, all in one
//! JSON document on local disk.
//!
//! # Architecture
//!
//! ## One document, one writer
//!
//! All state lives in `<data_dir>/db.json`. Every operation loads the document,
//! works on it, and (for mutations) writes the whole thing back through a
//! temp-file rename before returning. There is no cache between operations.
//!
//! ## The Thin Waist
//!
//! All access routes through [`core::broker::DocBroker`] for:
//! - Serialization (the store's writer lock spans load, change and save)
//! - Audit logging (`broker.events.jsonl`)
//!
//! ## Approval workflow
//!
//! User accounts, KYC submissions and bot requests share one
//! pending/approved/rejected state machine ([`core::workflow`]).
//!
//! # Crate Structure
//!
//! - [`core`]: document model, store, broker, ids, workflow, config, errors
//! - [`plugins`]: one repository per entity kind (users, kyc, accounts, catalog, bots, careers)

pub mod core;
pub mod plugins;

mod cli;

use cli::{Cli, Command, StoreCommand};
use crate::core::{broker, config, error, output, schemas, store::Store};
use crate::plugins::{accounts, bots, careers, catalog, kyc, users};

use clap::Parser;

fn init_logging(level: &str) {
    // RUST_LOG wins over the configured level when set.
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}

/// Full schema of the store and every command surface.
pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "document": schemas::document_schema(),
        "subsystems": [
            broker::schema(),
            users::schema(),
            kyc::schema(),
            accounts::schema(),
            catalog::schema(),
            bots::schema(),
            careers::schema()
        ]
    })
}

pub fn run() -> Result<(), error::DeskError> {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        println!("v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = config::resolve(cli.data_dir, config::EnvOverrides::from_env())?;
    init_logging(&config.log_level);

    let mut store = Store::from_config(&config);
    if let Some(actor) = cli.actor.as_deref() {
        store = store.with_actor(actor);
    }
    log::debug!("using store at {}", store.document_path().display());

    match cli.command {
        Command::Store(store_cli) => match store_cli.command {
            StoreCommand::Init => {
                let doc = store.init()?;
                log::info!("store ready at {}", store.root.display());
                output::emit(
                    "store.init",
                    "store",
                    &serde_json::json!({
                        "root": store.root.to_string_lossy(),
                        "document": store.document_path().to_string_lossy(),
                        "users": doc.users.len(),
                        "nextUserId": doc.next_user_id
                    }),
                )
            }
            StoreCommand::Show => {
                let doc = broker::DocBroker::new(&store).read("store.show", |doc| Ok(doc.clone()))?;
                output::emit("store.show", "document", &doc)
            }
            StoreCommand::Audit => {
                let events = broker::DocBroker::new(&store).audit_log()?;
                output::emit("store.audit", "events", &events)
            }
            StoreCommand::Schema => output::emit("store.schema", "schema", &schema()),
        },
        Command::User(c) => users::run_user_cli(&store, c),
        Command::Kyc(c) => kyc::run_kyc_cli(&store, c),
        Command::Account(c) => accounts::run_account_cli(&store, c),
        Command::Catalog(c) => catalog::run_catalog_cli(&store, c),
        Command::Bot(c) => bots::run_bot_cli(&store, c),
        Command::Request(c) => bots::run_request_cli(&store, c),
        Command::Career(c) => careers::run_career_cli(&store, c),
        Command::Version => Ok(()),
    }
}
