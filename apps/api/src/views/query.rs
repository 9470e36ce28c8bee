use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    #[default]
    Equals,
    Contains,
    /// Numeric lower bound. Only valid on numeric columns.
    AtLeast,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

/// Everything the projection needs besides the records themselves.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct QueryState {
    pub search: String,
    pub filter: Option<Filter>,
    pub sort: Option<SortSpec>,
}

impl QueryState {
    /// Whitespace-only search counts as no search.
    pub fn search_needle(&self) -> Option<String> {
        if self.search.trim().is_empty() {
            None
        } else {
            Some(self.search.to_lowercase())
        }
    }

    /// Column-header click: the same field flips direction, a new field
    /// starts ascending.
    pub fn toggle_sort(&mut self, field: &str) {
        self.sort = match self.sort.take() {
            Some(spec) if spec.field == field => Some(SortSpec {
                direction: spec.direction.flipped(),
                ..spec
            }),
            _ => Some(SortSpec {
                field: field.to_string(),
                direction: SortDirection::Asc,
            }),
        };
    }
}

/// Query-string form of [`QueryState`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub filter_field: Option<String>,
    pub filter_value: Option<String>,
    pub filter_op: Option<FilterOp>,
    pub sort: Option<String>,
    pub direction: Option<SortDirection>,
    /// Column header clicked on top of `sort`/`direction`.
    pub toggle: Option<String>,
}

impl From<ListQuery> for QueryState {
    fn from(q: ListQuery) -> Self {
        let filter = match (q.filter_field, q.filter_value) {
            (Some(field), Some(value)) if !field.trim().is_empty() && !value.trim().is_empty() => {
                Some(Filter {
                    field: field.trim().to_string(),
                    op: q.filter_op.unwrap_or_default(),
                    value: value.trim().to_string(),
                })
            }
            _ => None,
        };
        let sort = q
            .sort
            .filter(|f| !f.trim().is_empty())
            .map(|field| SortSpec {
                field: field.trim().to_string(),
                direction: q.direction.unwrap_or_default(),
            });
        let mut state = QueryState {
            search: q.search.unwrap_or_default(),
            filter,
            sort,
        };
        if let Some(field) = q.toggle.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            state.toggle_sort(field);
        }
        state
    }
}
