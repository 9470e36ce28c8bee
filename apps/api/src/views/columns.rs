use crate::models::record::{DiscardedContact, Record};
use crate::models::status::StatusKind;
use crate::views::fields::{FieldDescriptor, FieldTable};

/// Columns shared by the prospect and outbound lists.
pub fn record_fields<S: StatusKind>() -> FieldTable<Record<S>> {
    FieldTable::new(vec![
        FieldDescriptor::text("name", |r: &Record<S>| r.contact.name.as_str()),
        FieldDescriptor::text("title", |r: &Record<S>| r.contact.title.as_str()),
        FieldDescriptor::text("company", |r: &Record<S>| r.contact.company.as_str()),
        FieldDescriptor::text("location", |r: &Record<S>| r.contact.location.as_str()),
        FieldDescriptor::number("followers", |r: &Record<S>| r.contact.follower_count),
        FieldDescriptor::text("status", |r: &Record<S>| r.status.as_str()).unsearched(),
        FieldDescriptor::date("status_changed_at", |r: &Record<S>| r.status_changed_at),
    ])
}

pub fn discarded_fields() -> FieldTable<DiscardedContact> {
    FieldTable::new(vec![
        FieldDescriptor::text("name", |r: &DiscardedContact| r.contact.name.as_str()),
        FieldDescriptor::text("title", |r: &DiscardedContact| r.contact.title.as_str()),
        FieldDescriptor::text("company", |r: &DiscardedContact| r.contact.company.as_str()),
        FieldDescriptor::text("location", |r: &DiscardedContact| r.contact.location.as_str()),
        FieldDescriptor::number("followers", |r: &DiscardedContact| r.contact.follower_count),
        FieldDescriptor::date("discarded_date", |r: &DiscardedContact| Some(r.discarded_date)),
        FieldDescriptor::text("origin", |r: &DiscardedContact| r.origin.as_str()).unsearched(),
    ])
}
