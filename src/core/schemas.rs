//! Centralized file names and the wire-level description of the persisted document.
//!
//! brokerdesk keeps all state in one JSON document plus an append-only audit log:
//! 1. db.json: users, accounts, bots, adminBots, careers and the nextUserId counter.
//! 2. broker.events.jsonl: one line per brokered mutation.
//! 3. brokerdesk.toml: optional operator configuration.

pub const DOCUMENT_FILE_NAME: &str = "db.json";
pub const AUDIT_LOG_NAME: &str = "broker.events.jsonl";
pub const CONFIG_FILE_NAME: &str = "brokerdesk.toml";

/// Default data root, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = ".brokerdesk";

pub const USERS: &str = "users";
pub const ACCOUNTS: &str = "accounts";
pub const BOTS: &str = "bots";
pub const ADMIN_BOTS: &str = "adminBots";
pub const CAREERS: &str = "careers";
pub const NEXT_USER_ID: &str = "nextUserId";

pub const COLLECTIONS: [&str; 5] = [USERS, ACCOUNTS, BOTS, ADMIN_BOTS, CAREERS];

/// Descriptor of the persisted document, printed by `store schema`.
pub fn document_schema() -> serde_json::Value {
    serde_json::json!({
        "name": "document",
        "version": "1.0.0",
        "storage": [DOCUMENT_FILE_NAME, AUDIT_LOG_NAME],
        "fields": {
            "users": ["id", "uid", "email", "name", "status", "kycCompleted", "kycStatus", "kyc"],
            "accounts": ["id", "uid", "broker", "accountType", "accountNumber"],
            "bots": [
                "id", "uid", "brokerAccountId", "botId", "signedAgreementUrl", "botName",
                "price", "broker", "accountNumber", "status", "createdAt"
            ],
            "adminBots": ["id", "name", "price", "cost", "subscriptionFee", "createdAt"],
            "careers": [
                "id", "name", "address", "nic", "phone", "whatsapp", "email",
                "currentlyWorking", "employmentType", "yearsExperience", "preferredRole",
                "availableFrom", "notes", "createdAt"
            ],
            "nextUserId": "integer"
        }
    })
}
