use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::FieldError;
use crate::models::status::{OutboundStatus, ProspectStatus, StatusKind};
use crate::models::template::TemplateId;

/// Opaque record identifier. Assigned once at creation, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub Uuid);

impl RecordId {
    pub fn new() -> Self {
        RecordId(Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Prospects,
    Outbounds,
    Discarded,
}

impl ListKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ListKind::Prospects => "prospects",
            ListKind::Outbounds => "outbounds",
            ListKind::Discarded => "discarded",
        }
    }
}

/// The person behind a record. Free text apart from a non-empty name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Contact {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub linkedin_url: String,
    #[serde(default)]
    pub follower_count: u64,
}

impl Contact {
    pub fn new(name: &str, title: &str, company: &str) -> Self {
        Contact {
            name: name.to_string(),
            title: title.to_string(),
            company: company.to_string(),
            ..Default::default()
        }
    }

    /// First whitespace-delimited token of the name.
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.name.trim().is_empty() {
            return Err(FieldError::new("name", "Name cannot be empty"));
        }
        Ok(())
    }
}

fn initial_status<S: StatusKind>() -> S {
    S::INITIAL
}

/// A row in one of the active lists (prospects or outbound contacts).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound = "S: StatusKind")]
pub struct Record<S> {
    #[serde(default)]
    pub id: RecordId,
    #[serde(flatten)]
    pub contact: Contact,
    #[serde(default = "initial_status")]
    pub status: S,
    #[serde(default)]
    pub status_changed_at: Option<NaiveDate>,
    #[serde(default)]
    pub assigned_template: Option<TemplateId>,
}

impl<S: StatusKind> Record<S> {
    pub fn new(contact: Contact) -> Self {
        Record {
            id: RecordId::new(),
            contact,
            status: S::INITIAL,
            status_changed_at: None,
            assigned_template: None,
        }
    }
}

pub type Prospect = Record<ProspectStatus>;
pub type OutboundContact = Record<OutboundStatus>;

/// A record that has been moved out of an active list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscardedContact {
    #[serde(default)]
    pub id: RecordId,
    #[serde(flatten)]
    pub contact: Contact,
    pub discarded_date: NaiveDate,
    #[serde(default = "default_origin")]
    pub origin: ListKind,
    #[serde(default)]
    pub assigned_template: Option<TemplateId>,
}

fn default_origin() -> ListKind {
    ListKind::Prospects
}

impl DiscardedContact {
    pub fn from_record<S>(record: &Record<S>, origin: ListKind, discarded_date: NaiveDate) -> Self {
        DiscardedContact {
            id: record.id,
            contact: record.contact.clone(),
            discarded_date,
            origin,
            assigned_template: record.assigned_template,
        }
    }
}

/// `1500 -> "1.5K"`, `500 -> "500"`.
pub fn format_follower_count(count: u64) -> String {
    if count >= 1000 {
        format!("{:.1}K", count as f64 / 1000.0)
    } else {
        count.to_string()
    }
}
