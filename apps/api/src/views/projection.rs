use thiserror::Error;

use crate::views::collation::TextCollator;
use crate::views::fields::{FieldDescriptor, FieldTable};
use crate::views::query::{Filter, FilterOp, QueryState, SortDirection};

#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("Field '{0}' is not numeric")]
    NonNumericField(String),

    #[error("Filter value '{value}' for field '{field}' is not a non-negative integer")]
    InvalidNumber { field: String, value: String },
}

/// A filter resolved against the column table.
enum Predicate<'t, T> {
    Equals(&'t FieldDescriptor<T>, String),
    Contains(&'t FieldDescriptor<T>, String),
    AtLeast(&'t FieldDescriptor<T>, u64),
}

impl<T> Predicate<'_, T> {
    fn matches(&self, record: &T) -> bool {
        match self {
            Predicate::Equals(field, value) => field.haystack(record) == *value,
            Predicate::Contains(field, value) => field.haystack(record).contains(value.as_str()),
            Predicate::AtLeast(field, min) => field.read_number(record).is_some_and(|n| n >= *min),
        }
    }
}

fn resolve<'t, T>(
    table: &'t FieldTable<T>,
    filter: &Filter,
) -> Result<Predicate<'t, T>, ProjectionError> {
    let field = table
        .get(&filter.field)
        .ok_or_else(|| ProjectionError::UnknownField(filter.field.clone()))?;
    let value = filter.value.to_lowercase();
    Ok(match filter.op {
        FilterOp::Equals => Predicate::Equals(field, value),
        FilterOp::Contains => Predicate::Contains(field, value),
        FilterOp::AtLeast => {
            if !field.is_numeric() {
                return Err(ProjectionError::NonNumericField(filter.field.clone()));
            }
            let min = filter
                .value
                .trim()
                .parse::<u64>()
                .map_err(|_| ProjectionError::InvalidNumber {
                    field: filter.field.clone(),
                    value: filter.value.clone(),
                })?;
            Predicate::AtLeast(field, min)
        }
    })
}

/// Returns the visible rows of `records` for `query`, in display order.
///
/// - search: case-insensitive substring of any searchable column
/// - filter: at most one, applied together with search
/// - sort: stable in both directions, so ties keep store order
///
/// Unknown columns and numeric filters on non-numeric columns are rejected
/// before any record is looked at.
pub fn project<'a, T>(
    records: &'a [T],
    table: &FieldTable<T>,
    query: &QueryState,
) -> Result<Vec<&'a T>, ProjectionError> {
    let predicate = query
        .filter
        .as_ref()
        .map(|f| resolve(table, f))
        .transpose()?;
    let sort_field = query
        .sort
        .as_ref()
        .map(|s| {
            table
                .get(&s.field)
                .map(|field| (field, s.direction))
                .ok_or_else(|| ProjectionError::UnknownField(s.field.clone()))
        })
        .transpose()?;
    let needle = query.search_needle();

    let mut visible: Vec<&T> = records
        .iter()
        .filter(|record| match &needle {
            Some(needle) => table
                .searchable()
                .any(|field| field.haystack(record).contains(needle.as_str())),
            None => true,
        })
        .filter(|record| predicate.as_ref().map_or(true, |p| p.matches(record)))
        .collect();

    if let Some((field, direction)) = sort_field {
        let collator = TextCollator::new();
        visible.sort_by(|a, b| {
            let order = field.compare(a, b, &collator);
            match direction {
                SortDirection::Asc => order,
                SortDirection::Desc => order.reverse(),
            }
        });
    }

    Ok(visible)
}
