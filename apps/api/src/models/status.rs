use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// A closed set of statuses for one list, with its transition table.
///
/// Every list starts records in `INITIAL`. Any status other than `INITIAL`
/// belongs to the engaged class: entering it stamps `status_changed_at`,
/// returning to `INITIAL` clears it.
pub trait StatusKind:
    Copy + Eq + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    const INITIAL: Self;
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Legal (from, to) pairs for this list. Staying put is always legal.
    fn can_transition_to(self, next: Self) -> bool;

    fn is_engaged(self) -> bool {
        self != Self::INITIAL
    }

    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(raw))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProspectStatus {
    New,
    Contacted,
    Responded,
    NotInterested,
}

impl StatusKind for ProspectStatus {
    const INITIAL: Self = ProspectStatus::New;
    const ALL: &'static [Self] = &[
        ProspectStatus::New,
        ProspectStatus::Contacted,
        ProspectStatus::Responded,
        ProspectStatus::NotInterested,
    ];

    fn as_str(self) -> &'static str {
        match self {
            ProspectStatus::New => "new",
            ProspectStatus::Contacted => "contacted",
            ProspectStatus::Responded => "responded",
            ProspectStatus::NotInterested => "not_interested",
        }
    }

    fn can_transition_to(self, next: Self) -> bool {
        use ProspectStatus::*;
        if self == next || next == New {
            return true;
        }
        matches!(
            (self, next),
            (New, Contacted)
                | (New, NotInterested)
                | (Contacted, Responded)
                | (Contacted, NotInterested)
                | (Responded, NotInterested)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OutboundStatus {
    NotContacted,
    Contacted,
    Responded,
    Interested,
    Engaged,
}

impl StatusKind for OutboundStatus {
    const INITIAL: Self = OutboundStatus::NotContacted;
    const ALL: &'static [Self] = &[
        OutboundStatus::NotContacted,
        OutboundStatus::Contacted,
        OutboundStatus::Responded,
        OutboundStatus::Interested,
        OutboundStatus::Engaged,
    ];

    fn as_str(self) -> &'static str {
        match self {
            OutboundStatus::NotContacted => "not_contacted",
            OutboundStatus::Contacted => "contacted",
            OutboundStatus::Responded => "responded",
            OutboundStatus::Interested => "interested",
            OutboundStatus::Engaged => "engaged",
        }
    }

    fn can_transition_to(self, next: Self) -> bool {
        use OutboundStatus::*;
        if self == next || next == NotContacted {
            return true;
        }
        matches!(
            (self, next),
            (NotContacted, Contacted)
                | (Contacted, Responded)
                | (Responded, Interested)
                | (Responded, Engaged)
                | (Interested, Engaged)
        )
    }
}
