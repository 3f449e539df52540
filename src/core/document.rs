//! The persisted aggregate: five collections and the user id counter.
//!
//! Wire names are camelCase to match the on-disk JSON. Decoding is lenient by
//! record: an absent or `null` collection loads empty, ids and amounts written
//! as numeric strings are accepted, descriptive fields fall back to empty, and
//! a record that still cannot be decoded is skipped with a warning instead of
//! taking the rest of the document down with it.

use crate::core::workflow::ApprovalStatus;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct Document {
    pub users: Vec<User>,
    pub accounts: Vec<Account>,
    pub bots: Vec<Bot>,
    pub admin_bots: Vec<AdminBot>,
    pub careers: Vec<CareerApplication>,
    pub next_user_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            accounts: Vec::new(),
            bots: Vec::new(),
            admin_bots: Vec::new(),
            careers: Vec::new(),
            next_user_id: FIRST_USER_ID,
        }
    }
}

const FIRST_USER_ID: u64 = 1;

/// Anything that is not an object decodes to the empty document; callers that
/// must tell the two apart check the shape first.
impl From<Value> for Document {
    fn from(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        Self {
            users: records(&mut fields, "users"),
            accounts: records(&mut fields, "accounts"),
            bots: records(&mut fields, "bots"),
            admin_bots: records(&mut fields, "adminBots"),
            careers: records(&mut fields, "careers"),
            next_user_id: fields
                .get("nextUserId")
                .and_then(counter_value)
                .filter(|n| *n > 0)
                .unwrap_or(FIRST_USER_ID),
        }
    }
}

fn records<T: DeserializeOwned>(fields: &mut Map<String, Value>, collection: &str) -> Vec<T> {
    match fields.remove(collection) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match T::deserialize(&item) {
                Ok(record) => Some(record),
                Err(e) => {
                    log::warn!("skipping unreadable {}[{}] ({}): {}", collection, index, e, item);
                    None
                }
            })
            .collect(),
        Some(other) => {
            log::warn!("ignoring {}: expected an array, found {}", collection, other);
            Vec::new()
        }
    }
}

fn counter_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<N> {
    Number(N),
    Text(String),
}

/// Accepts `10` as well as `"10"` for numeric record fields.
fn lenient<'de, D, N>(deserializer: D) -> Result<N, D::Error>
where
    D: Deserializer<'de>,
    N: Deserialize<'de> + FromStr,
    N::Err: Display,
{
    match NumberOrText::<N>::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl Document {
    /// Repairs the user counter so it can never hand out an id already in use.
    pub fn backfill(&mut self) {
        let floor = self.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        if self.next_user_id < floor {
            self.next_user_id = floor;
        }
    }

    pub fn find_user(&self, uid: &str) -> Option<&User> {
        self.users.iter().find(|u| u.uid == uid)
    }

    pub fn find_user_mut(&mut self, uid: &str) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.uid == uid)
    }

    pub fn find_user_by_id(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn find_user_by_id_mut(&mut self, id: u64) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    /// Accounts resolve only through their owner; a bare id is not enough.
    pub fn find_account(&self, id: u64, uid: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id && a.uid == uid)
    }

    pub fn find_admin_bot(&self, id: u64) -> Option<&AdminBot> {
        self.admin_bots.iter().find(|b| b.id == id)
    }

    pub fn find_admin_bot_mut(&mut self, id: u64) -> Option<&mut AdminBot> {
        self.admin_bots.iter_mut().find(|b| b.id == id)
    }

    pub fn find_bot(&self, id: u64) -> Option<&Bot> {
        self.bots.iter().find(|b| b.id == id)
    }

    pub fn find_bot_mut(&mut self, id: u64) -> Option<&mut Bot> {
        self.bots.iter_mut().find(|b| b.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "lenient")]
    pub id: u64,
    pub uid: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: ApprovalStatus,
    #[serde(default)]
    pub kyc_completed: bool,
    #[serde(default)]
    pub kyc_status: ApprovalStatus,
    #[serde(default)]
    pub kyc: Option<KycSubmission>,
}

/// Identity-verification payload. Image fields are opaque strings (typically
/// base64) stored exactly as received.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KycSubmission {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub id_type: String,
    #[serde(default)]
    pub id_number: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub nationality: Option<String>,
    #[serde(default)]
    pub id_front_image: Option<String>,
    #[serde(default)]
    pub id_back_image: Option<String>,
    #[serde(default)]
    pub selfie_image: Option<String>,
    #[serde(default)]
    pub submitted_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(deserialize_with = "lenient")]
    pub id: u64,
    pub uid: String,
    #[serde(default)]
    pub broker: String,
    #[serde(default)]
    pub account_type: String,
    #[serde(default)]
    pub account_number: String,
}

/// A user's subscription of one brokerage account to one catalog bot.
///
/// `bot_name`, `price`, `broker` and `account_number` are copied from the
/// catalog entry and the account when the request is created and never
/// refreshed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bot {
    #[serde(deserialize_with = "lenient")]
    pub id: u64,
    pub uid: String,
    #[serde(default, deserialize_with = "lenient")]
    pub broker_account_id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub bot_id: u64,
    #[serde(default)]
    pub signed_agreement_url: String,
    #[serde(default)]
    pub bot_name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub price: f64,
    #[serde(default)]
    pub broker: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub status: ApprovalStatus,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdminBot {
    #[serde(deserialize_with = "lenient")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub cost: f64,
    #[serde(default, deserialize_with = "lenient")]
    pub subscription_fee: f64,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareerApplication {
    #[serde(deserialize_with = "lenient")]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub nic: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub currently_working: String,
    #[serde(default)]
    pub employment_type: String,
    #[serde(default)]
    pub years_experience: String,
    #[serde(default)]
    pub preferred_role: String,
    #[serde(default)]
    pub available_from: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: String,
}
