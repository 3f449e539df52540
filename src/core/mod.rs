//! Core modules for brokerdesk's document store and approval workflow.
//!
//! Everything the entity repositories share lives here: the document model,
//! the store and its broker, identifier allocation, the workflow state machine,
//! configuration and errors.

pub mod broker;
pub mod config;
pub mod document;
pub mod error;
pub mod ids;
pub mod output;
pub mod schemas;
pub mod store;
pub mod time;
pub mod workflow;
