//! Job applications.

use crate::core::broker::DocBroker;
use crate::core::document::CareerApplication;
use crate::core::error::{self, DeskError, DeskResult};
use crate::core::output;
use crate::core::store::Store;
use crate::core::{ids, time};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[clap(name = "career", about = "Job applications")]
pub struct CareerCli {
    #[clap(subcommand)]
    pub command: CareerCommand,
}

#[derive(Subcommand, Debug)]
pub enum CareerCommand {
    /// Submit a job application.
    Apply(NewCareerApplication),
    /// List job applications (admin).
    List,
}

/// Application form. `currentlyWorking` defaults to "no", `employmentType`
/// to "full-time"; other optional fields default to "".
#[derive(clap::Args, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCareerApplication {
    #[clap(long, default_value = "")]
    #[serde(default)]
    pub name: String,
    #[clap(long, default_value = "")]
    #[serde(default)]
    pub address: String,
    #[clap(long, default_value = "")]
    #[serde(default)]
    pub nic: String,
    #[clap(long, default_value = "")]
    #[serde(default)]
    pub phone: String,
    #[clap(long, default_value = "")]
    #[serde(default)]
    pub whatsapp: String,
    #[clap(long)]
    #[serde(default)]
    pub email: Option<String>,
    #[clap(long)]
    #[serde(default)]
    pub currently_working: Option<String>,
    #[clap(long)]
    #[serde(default)]
    pub employment_type: Option<String>,
    #[clap(long)]
    #[serde(default)]
    pub years_experience: Option<String>,
    #[clap(long)]
    #[serde(default)]
    pub preferred_role: Option<String>,
    #[clap(long)]
    #[serde(default)]
    pub available_from: Option<String>,
    #[clap(long)]
    #[serde(default)]
    pub notes: Option<String>,
}

pub fn run_career_cli(store: &Store, cli: CareerCli) -> Result<(), DeskError> {
    match cli.command {
        CareerCommand::Apply(input) => {
            output::emit("career.apply", "application", &create_application(store, &input)?)
        }
        CareerCommand::List => {
            output::emit("career.list", "applications", &list_applications(store)?)
        }
    }
}

fn or_default(value: &Option<String>, fallback: &str) -> String {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub fn create_application(
    store: &Store,
    input: &NewCareerApplication,
) -> DeskResult<CareerApplication> {
    let required_fields = [
        ("name", &input.name),
        ("address", &input.address),
        ("nic", &input.nic),
        ("phone", &input.phone),
        ("whatsapp", &input.whatsapp),
    ];
    for (field, value) in required_fields {
        if value.trim().is_empty() {
            return Err(error::required(field));
        }
    }

    DocBroker::new(store).mutate("career.apply", |doc| {
        let application = CareerApplication {
            id: ids::next_career_id(doc),
            name: input.name.trim().to_string(),
            address: input.address.trim().to_string(),
            nic: input.nic.trim().to_string(),
            phone: input.phone.trim().to_string(),
            whatsapp: input.whatsapp.trim().to_string(),
            email: or_default(&input.email, ""),
            currently_working: or_default(&input.currently_working, "no"),
            employment_type: or_default(&input.employment_type, "full-time"),
            years_experience: or_default(&input.years_experience, ""),
            preferred_role: or_default(&input.preferred_role, ""),
            available_from: or_default(&input.available_from, ""),
            notes: or_default(&input.notes, ""),
            created_at: time::now_iso(),
        };
        doc.careers.push(application.clone());
        Ok(application)
    })
}

pub fn list_applications(store: &Store) -> DeskResult<Vec<CareerApplication>> {
    DocBroker::new(store).read("career.list", |doc| Ok(doc.careers.clone()))
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "career",
        "version": "0.1.0",
        "description": "Job applications",
        "commands": [
            { "name": "apply", "parameters": ["name", "address", "nic", "phone", "whatsapp"] },
            { "name": "list" }
        ],
        "storage": ["careers"]
    })
}
