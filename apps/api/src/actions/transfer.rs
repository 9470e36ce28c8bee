use tracing::{debug, info, warn};

use crate::actions::store::{Identified, Store};
use crate::actions::{ActionError, ActionOutcome};
use crate::models::record::RecordId;

/// Why a sink turned a record away.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkRejection {
    pub reason: String,
}

/// The receiving side of a move. On success it hands back the record as
/// stored.
pub trait RecordSink<T> {
    fn accept(&mut self, record: T) -> Result<&T, SinkRejection>;
}

impl<T: Identified> RecordSink<T> for Store<T> {
    fn accept(&mut self, record: T) -> Result<&T, SinkRejection> {
        let id = record.id();
        let kind = self.kind();
        if self.push(record).is_err() {
            return Err(SinkRejection {
                reason: format!("{} already holds record {id}", kind.as_str()),
            });
        }
        self.get(id).ok_or_else(|| SinkRejection {
            reason: format!("{} lost record {id} on write", kind.as_str()),
        })
    }
}

/// Moves one record out of `source` and into `sink`, building the new shape
/// from the removed record. Afterwards the record is in exactly one of the
/// two: if the sink refuses, the removed record goes back to its old
/// position in `source` unchanged.
///
/// A missing id is a no-op, so repeating a move never removes twice.
pub fn move_record<A, B, K>(
    source: &mut Store<A>,
    sink: &mut K,
    id: RecordId,
    convert: impl FnOnce(&A) -> B,
) -> Result<ActionOutcome<B>, ActionError>
where
    A: Identified,
    B: Clone,
    K: RecordSink<B> + ?Sized,
{
    let Some((index, record)) = source.remove(id) else {
        debug!("move: record {id} not in {}; ignoring", source.kind().as_str());
        return Ok(ActionOutcome::NotFound);
    };

    let accepted = sink.accept(convert(&record)).map(B::clone);
    match accepted {
        Ok(moved) => {
            info!("Moved record {id} out of {}", source.kind().as_str());
            Ok(ActionOutcome::Applied(moved))
        }
        Err(rejection) => {
            warn!(
                "Move of record {id} out of {} refused, rolling back: {}",
                source.kind().as_str(),
                rejection.reason
            );
            source.restore(index, record);
            Err(ActionError::TransferRejected {
                id,
                reason: rejection.reason,
            })
        }
    }
}
