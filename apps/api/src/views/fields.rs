use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::views::collation::TextCollator;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// How a column reads its value out of a record.
pub enum Accessor<T> {
    Text(fn(&T) -> &str),
    Number(fn(&T) -> u64),
    Date(fn(&T) -> Option<NaiveDate>),
}

/// One named column of a list: how to read it and whether free-text search
/// looks at it.
pub struct FieldDescriptor<T> {
    pub name: &'static str,
    pub searchable: bool,
    pub accessor: Accessor<T>,
}

impl<T> FieldDescriptor<T> {
    pub fn text(name: &'static str, read: fn(&T) -> &str) -> Self {
        FieldDescriptor {
            name,
            searchable: true,
            accessor: Accessor::Text(read),
        }
    }

    pub fn number(name: &'static str, read: fn(&T) -> u64) -> Self {
        FieldDescriptor {
            name,
            searchable: true,
            accessor: Accessor::Number(read),
        }
    }

    pub fn date(name: &'static str, read: fn(&T) -> Option<NaiveDate>) -> Self {
        FieldDescriptor {
            name,
            searchable: true,
            accessor: Accessor::Date(read),
        }
    }

    /// Filterable and sortable, but skipped by free-text search.
    pub fn unsearched(mut self) -> Self {
        self.searchable = false;
        self
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.accessor, Accessor::Number(_))
    }

    /// Lowercased rendering used for search and text filters.
    pub fn haystack(&self, record: &T) -> String {
        match &self.accessor {
            Accessor::Text(read) => read(record).to_lowercase(),
            Accessor::Number(read) => read(record).to_string(),
            Accessor::Date(read) => read(record)
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        }
    }

    /// Orders two records by this column. Text goes through the collator;
    /// numbers and dates compare by value, with missing dates first.
    pub fn compare(&self, a: &T, b: &T, collator: &TextCollator) -> Ordering {
        match &self.accessor {
            Accessor::Text(read) => collator.compare(read(a), read(b)),
            Accessor::Number(read) => read(a).cmp(&read(b)),
            Accessor::Date(read) => read(a).cmp(&read(b)),
        }
    }

    pub fn read_number(&self, record: &T) -> Option<u64> {
        match &self.accessor {
            Accessor::Number(read) => Some(read(record)),
            _ => None,
        }
    }
}

/// The column set for one list kind.
pub struct FieldTable<T> {
    fields: Vec<FieldDescriptor<T>>,
}

impl<T> FieldTable<T> {
    pub fn new(fields: Vec<FieldDescriptor<T>>) -> Self {
        FieldTable { fields }
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor<T>> {
        self.fields.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn searchable(&self) -> impl Iterator<Item = &FieldDescriptor<T>> {
        self.fields.iter().filter(|f| f.searchable)
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }
}
