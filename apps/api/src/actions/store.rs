use crate::models::record::{DiscardedContact, ListKind, Record, RecordId};

/// Anything with a stable record id.
pub trait Identified {
    fn id(&self) -> RecordId;
}

impl<S> Identified for Record<S> {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Identified for DiscardedContact {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// Ordered records of one list. Ids are unique within the store.
#[derive(Debug, Clone)]
pub struct Store<T> {
    kind: ListKind,
    records: Vec<T>,
}

impl<T: Identified> Store<T> {
    pub fn empty(kind: ListKind) -> Self {
        Store {
            kind,
            records: Vec::new(),
        }
    }

    /// Builds a store, rejecting the first duplicated id.
    pub fn new(kind: ListKind, records: Vec<T>) -> Result<Self, RecordId> {
        let mut store = Store::empty(kind);
        for record in records {
            store.push(record).map_err(|dup| dup.id())?;
        }
        Ok(store)
    }

    pub fn kind(&self) -> ListKind {
        self.kind
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, id: RecordId) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut T> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    fn position(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Appends a record; hands it back if the id is already present.
    pub fn push(&mut self, record: T) -> Result<(), T> {
        if self.contains(record.id()) {
            return Err(record);
        }
        self.records.push(record);
        Ok(())
    }

    /// Removes a record, returning it with the index it occupied.
    pub fn remove(&mut self, id: RecordId) -> Option<(usize, T)> {
        let index = self.position(id)?;
        Some((index, self.records.remove(index)))
    }

    /// Puts a removed record back where it was.
    pub fn restore(&mut self, index: usize, record: T) {
        let index = index.min(self.records.len());
        self.records.insert(index, record);
    }
}
