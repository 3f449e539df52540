//! CLI struct definitions for the brokerdesk command-line interface.
//!
//! All clap-derived types live here. Dispatch lives in `lib.rs`.

use crate::plugins::{accounts, bots, careers, catalog, kyc, users};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "brokerdesk",
    version = env!("CARGO_PKG_VERSION"),
    about = "Single-file record store for brokerage onboarding and bot subscriptions"
)]
pub(crate) struct Cli {
    /// Data directory holding db.json (overrides BROKERDESK_DATA_DIR).
    #[clap(long, global = true)]
    pub data_dir: Option<PathBuf>,
    /// Identity recorded on audit events (overrides BROKERDESK_ACTOR).
    #[clap(long, global = true)]
    pub actor: Option<String>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(clap::Args, Debug)]
pub(crate) struct StoreCli {
    #[clap(subcommand)]
    pub command: StoreCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum StoreCommand {
    /// Create the data directory and an empty document if absent.
    Init,
    /// Print the whole document.
    Show,
    /// Show the audit log of brokered mutations.
    Audit,
    /// Describe the document and every command surface.
    Schema,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Document lifecycle and audit log
    #[clap(name = "store", visible_alias = "s")]
    Store(StoreCli),

    /// Users and KYC submission
    #[clap(name = "user", visible_alias = "u")]
    User(users::UserCli),

    /// KYC review (admin)
    #[clap(name = "kyc")]
    Kyc(kyc::KycCli),

    /// Brokerage accounts
    #[clap(name = "account", visible_alias = "a")]
    Account(accounts::AccountCli),

    /// Bot price list and admin bot catalog
    #[clap(name = "catalog", visible_alias = "c")]
    Catalog(catalog::CatalogCli),

    /// Bot assignments
    #[clap(name = "bot", visible_alias = "b")]
    Bot(bots::BotCli),

    /// Bot request review (admin)
    #[clap(name = "request", visible_alias = "r")]
    Request(bots::RequestCli),

    /// Job applications
    #[clap(name = "career")]
    Career(careers::CareerCli),

    /// Show version information
    #[clap(name = "version")]
    Version,
}
