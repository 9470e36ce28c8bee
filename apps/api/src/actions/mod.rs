// Record mutations: template assignment, status transitions, and moves
// between lists. Every action targets one record by id; an id that is no
// longer in the store is a logged no-op.

pub mod dispatcher;
pub mod idempotency;
pub mod store;
pub mod transfer;

use thiserror::Error;

use crate::models::record::RecordId;
use crate::models::template::TemplateId;

pub use dispatcher::Dispatcher;
pub use idempotency::IdempotencyLedger;
pub use store::{Identified, Store};

#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome<T> {
    Applied(T),
    /// The record was not in the store. Stale ids are expected after
    /// concurrent edits, so callers treat this as success.
    NotFound,
}

#[cfg(test)]
impl<T> ActionOutcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            ActionOutcome::Applied(value) => Some(value),
            ActionOutcome::NotFound => None,
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied(_))
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ActionError {
    #[error("Cannot move from '{from}' to '{to}'")]
    IllegalTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("'{value}' is not a {list} status")]
    InvalidStatus { list: &'static str, value: String },

    #[error("Template {0} does not exist")]
    UnknownTemplate(TemplateId),

    #[error("Record {0} has no template assigned")]
    NoTemplateAssigned(RecordId),

    #[error("Record {id} could not be moved: {reason}")]
    TransferRejected { id: RecordId, reason: String },
}
