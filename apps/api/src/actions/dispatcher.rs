use tracing::{debug, info, warn};

use crate::actions::store::Store;
use crate::actions::transfer::{move_record, RecordSink};
use crate::actions::{ActionError, ActionOutcome};
use crate::clock::Clock;
use crate::models::record::{DiscardedContact, OutboundContact, Prospect, Record, RecordId};
use crate::models::status::{OutboundStatus, StatusKind};
use crate::models::template::TemplateId;
use crate::templates::TemplateCatalog;

/// Applies user actions to records. Holds no state of its own; it borrows
/// the clock for date stamps and the template catalog for lookups.
pub struct Dispatcher<'a> {
    clock: &'a dyn Clock,
    templates: &'a TemplateCatalog,
}

impl<'a> Dispatcher<'a> {
    pub fn new(clock: &'a dyn Clock, templates: &'a TemplateCatalog) -> Self {
        Dispatcher { clock, templates }
    }

    /// Sets the record's template, replacing any earlier one. Status is
    /// left alone.
    pub fn assign_template<S: StatusKind>(
        &self,
        store: &mut Store<Record<S>>,
        id: RecordId,
        template_id: TemplateId,
    ) -> Result<ActionOutcome<Record<S>>, ActionError> {
        if !self.templates.contains(template_id) {
            return Err(ActionError::UnknownTemplate(template_id));
        }
        let kind = store.kind();
        let Some(record) = store.get_mut(id) else {
            debug!("assign_template: record {id} not in {}; ignoring", kind.as_str());
            return Ok(ActionOutcome::NotFound);
        };
        record.assigned_template = Some(template_id);
        info!("Assigned template {template_id} to {} record {id}", kind.as_str());
        Ok(ActionOutcome::Applied(record.clone()))
    }

    /// Moves the record to `next` if the list's transition table allows it.
    /// Entering an engaged status stamps today's local date; landing on the
    /// initial status clears the stamp.
    pub fn advance_status<S: StatusKind>(
        &self,
        store: &mut Store<Record<S>>,
        id: RecordId,
        next: S,
    ) -> Result<ActionOutcome<Record<S>>, ActionError> {
        let kind = store.kind();
        let Some(record) = store.get_mut(id) else {
            debug!("advance_status: record {id} not in {}; ignoring", kind.as_str());
            return Ok(ActionOutcome::NotFound);
        };
        if !record.status.can_transition_to(next) {
            warn!(
                "Rejected {} transition {} -> {} for record {id}",
                kind.as_str(),
                record.status.as_str(),
                next.as_str()
            );
            return Err(ActionError::IllegalTransition {
                from: record.status.as_str(),
                to: next.as_str(),
            });
        }
        if record.status != next {
            record.status_changed_at = next.is_engaged().then(|| self.clock.today());
            record.status = next;
            info!("Record {id} in {} is now {}", kind.as_str(), next.as_str());
        }
        Ok(ActionOutcome::Applied(record.clone()))
    }

    /// Back to the list's initial status, clearing the date stamp.
    pub fn revert_status<S: StatusKind>(
        &self,
        store: &mut Store<Record<S>>,
        id: RecordId,
    ) -> Result<ActionOutcome<Record<S>>, ActionError> {
        self.advance_status(store, id, S::INITIAL)
    }

    /// Moves a record into the discarded list, stamped with today's date.
    pub fn discard<S, K>(
        &self,
        store: &mut Store<Record<S>>,
        discarded: &mut K,
        id: RecordId,
    ) -> Result<ActionOutcome<DiscardedContact>, ActionError>
    where
        S: StatusKind,
        K: RecordSink<DiscardedContact> + ?Sized,
    {
        let origin = store.kind();
        let today = self.clock.today();
        move_record(store, discarded, id, |record| {
            DiscardedContact::from_record(record, origin, today)
        })
    }

    /// Moves a prospect into the outbound list as not yet contacted. The
    /// assigned template travels with it.
    pub fn promote<K>(
        &self,
        prospects: &mut Store<Prospect>,
        outbounds: &mut K,
        id: RecordId,
    ) -> Result<ActionOutcome<OutboundContact>, ActionError>
    where
        K: RecordSink<OutboundContact> + ?Sized,
    {
        move_record(prospects, outbounds, id, |prospect| OutboundContact {
            id: prospect.id,
            contact: prospect.contact.clone(),
            status: OutboundStatus::INITIAL,
            status_changed_at: None,
            assigned_template: prospect.assigned_template,
        })
    }

    /// The record's template body addressed to the record's first name.
    /// Read-only: the store is not touched.
    pub fn template_text<S: StatusKind>(
        &self,
        store: &Store<Record<S>>,
        id: RecordId,
    ) -> Result<ActionOutcome<String>, ActionError> {
        let Some(record) = store.get(id) else {
            debug!("template_text: record {id} not in {}; ignoring", store.kind().as_str());
            return Ok(ActionOutcome::NotFound);
        };
        let template_id = record
            .assigned_template
            .ok_or(ActionError::NoTemplateAssigned(id))?;
        let template = self
            .templates
            .get(template_id)
            .ok_or(ActionError::UnknownTemplate(template_id))?;
        Ok(ActionOutcome::Applied(
            template.render_for(record.contact.first_name()),
        ))
    }
}
