use std::collections::BTreeMap;

use serde::Serialize;

use crate::actions::{IdempotencyLedger, Store};
use crate::models::record::{DiscardedContact, ListKind, OutboundContact, Prospect, Record};
use crate::models::status::StatusKind;
use crate::templates::TemplateCatalog;

/// The record lists. A record id appears in at most one of them.
#[derive(Debug)]
pub struct Lists {
    pub prospects: Store<Prospect>,
    pub outbounds: Store<OutboundContact>,
    pub discarded: Store<DiscardedContact>,
}

impl Default for Lists {
    fn default() -> Self {
        Lists {
            prospects: Store::empty(ListKind::Prospects),
            outbounds: Store::empty(ListKind::Outbounds),
            discarded: Store::empty(ListKind::Discarded),
        }
    }
}

/// Everything mutated by user actions. Lives behind a single lock so a move
/// between lists is never observed half-done.
#[derive(Debug)]
pub struct Workspace {
    pub lists: Lists,
    pub templates: TemplateCatalog,
    pub ledger: IdempotencyLedger,
}

impl Workspace {
    pub fn new(lists: Lists, templates: TemplateCatalog) -> Self {
        Workspace {
            lists,
            templates,
            ledger: IdempotencyLedger::default(),
        }
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary {
            prospects: ListSummary::of(self.lists.prospects.records()),
            outbounds: ListSummary::of(self.lists.outbounds.records()),
            discarded: self.lists.discarded.len(),
            templates: self.templates.list().len(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ListSummary {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
}

impl ListSummary {
    /// Every status of the list appears, zero counts included.
    fn of<S: StatusKind>(records: &[Record<S>]) -> Self {
        let mut by_status: BTreeMap<&'static str, usize> =
            S::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        for record in records {
            *by_status.entry(record.status.as_str()).or_default() += 1;
        }
        ListSummary {
            total: records.len(),
            by_status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub prospects: ListSummary,
    pub outbounds: ListSummary,
    pub discarded: usize,
    pub templates: usize,
}
