use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::ActionOutcome;
use crate::errors::AppError;
use crate::models::record::{format_follower_count, DiscardedContact, ListKind, Record, RecordId};
use crate::models::template::TemplateId;
use crate::views::QueryState;

/// Lists that accept record actions. Discarded records are read-only.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActiveList {
    Prospects,
    Outbounds,
}

impl ActiveList {
    pub fn kind(self) -> ListKind {
        match self {
            ActiveList::Prospects => ListKind::Prospects,
            ActiveList::Outbounds => ListKind::Outbounds,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.kind().as_str()
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignTemplateRequest {
    pub template_id: TemplateId,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

/// A list row with display-only extras next to the stored fields.
#[derive(Debug, Serialize)]
pub struct Row<T> {
    #[serde(flatten)]
    pub record: T,
    pub followers_display: String,
}

impl<S: Clone> From<&Record<S>> for Row<Record<S>> {
    fn from(record: &Record<S>) -> Self {
        Row {
            followers_display: format_follower_count(record.contact.follower_count),
            record: record.clone(),
        }
    }
}

impl From<&DiscardedContact> for Row<DiscardedContact> {
    fn from(record: &DiscardedContact) -> Self {
        Row {
            followers_display: format_follower_count(record.contact.follower_count),
            record: record.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse<T> {
    pub list: ListKind,
    /// Records in the store before search and filter.
    pub total: usize,
    pub query: QueryState,
    pub columns: Vec<&'static str>,
    pub records: Vec<Row<T>>,
}

/// Result of a record action. `applied: false` means the record was no
/// longer in the list and nothing changed.
#[derive(Debug, Serialize)]
pub struct ActionReceipt {
    pub list: ListKind,
    pub record_id: RecordId,
    pub action: &'static str,
    pub applied: bool,
    pub record: Option<Value>,
}

impl ActionReceipt {
    pub fn from_outcome<T: Serialize>(
        list: ListKind,
        record_id: RecordId,
        action: &'static str,
        outcome: ActionOutcome<T>,
    ) -> Result<Self, AppError> {
        let record = match outcome {
            ActionOutcome::Applied(value) => {
                Some(serde_json::to_value(value).map_err(anyhow::Error::from)?)
            }
            ActionOutcome::NotFound => None,
        };
        Ok(ActionReceipt {
            list,
            record_id,
            action,
            applied: record.is_some(),
            record,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CopyTemplateResponse {
    pub record_id: RecordId,
    pub copied: bool,
    pub text: Option<String>,
}
