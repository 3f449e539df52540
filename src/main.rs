use anyhow::Context;
use brokerdesk::core::error::DeskError;
use colored::Colorize;

fn main() {
    let result = brokerdesk::run().context("brokerdesk command failed");
    if let Err(err) = result {
        let detail = match err.downcast_ref::<DeskError>() {
            Some(desk) => desk.summary(),
            None => format!("[internal] {:#}", err),
        };
        eprintln!("{} {}: {}", "error:".bright_red().bold(), err, detail);
        std::process::exit(1);
    }
}
