//! Output rendering for CLI surfaces.
//!
//! Every command prints exactly one JSON envelope on stdout: the event id and
//! timestamp of the response, the command name, and the payload under a
//! command-specific key.

use crate::core::error::DeskResult;
use crate::core::time;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    ts: String,
    event_id: String,
    cmd: &'a str,
    status: &'static str,
    #[serde(flatten)]
    body: BTreeMap<&'a str, &'a T>,
}

fn envelope<'a, T: Serialize>(cmd: &'a str, key: &'a str, payload: &'a T) -> Envelope<'a, T> {
    Envelope {
        ts: time::now_iso(),
        event_id: time::new_event_id(),
        cmd,
        status: "ok",
        body: BTreeMap::from([(key, payload)]),
    }
}

/// Print `payload` under `key` in the response envelope.
pub fn emit<T: Serialize>(cmd: &str, key: &str, payload: &T) -> DeskResult<()> {
    println!("{}", serde_json::to_string_pretty(&envelope(cmd, key, payload))?);
    Ok(())
}
