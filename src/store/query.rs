//! Typed store queries
//!
//! A `StoreQuery` is a concrete, fully-parameterized description of one scan:
//! target table, row filters, optional derived-table join, then either a
//! projection of the matching rows or a grouped aggregation. The planner is
//! the only producer; the engine is the only consumer.

/// A filter predicate over one column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Integer equality (widened comparison over Int8/Int16/Int32/Int64)
    EqInt(i64),
    /// Integer membership
    InInt(Vec<i64>),
    /// String equality (Utf8 or dictionary-encoded)
    EqStr(String),
    /// String membership
    InStr(Vec<String>),
    /// Boolean equality
    EqBool(bool),
}

/// One column filter; all filters on a query are conjunctive.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub predicate: Predicate,
}

impl ColumnFilter {
    pub fn new(column: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            column: column.into(),
            predicate,
        }
    }
}

/// An aggregate over the filtered (and grouped) rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    /// Sum of an integer column
    SumInt { column: String, alias: String },
    /// Number of rows
    CountRows { alias: String },
    /// Number of rows where a boolean column is true
    CountTrue { column: String, alias: String },
}

impl Aggregate {
    pub fn alias(&self) -> &str {
        match self {
            Aggregate::SumInt { alias, .. } => alias,
            Aggregate::CountRows { alias } => alias,
            Aggregate::CountTrue { alias, .. } => alias,
        }
    }

    /// The input column, if the aggregate reads one.
    pub fn column(&self) -> Option<&str> {
        match self {
            Aggregate::SumInt { column, .. } => Some(column),
            Aggregate::CountRows { .. } => None,
            Aggregate::CountTrue { column, .. } => Some(column),
        }
    }
}

/// A left join of a derived table's columns onto each matching row,
/// keyed by an integer column present on both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedJoin {
    /// Derived table name
    pub table: String,
    /// Join key column (integer) shared by both tables
    pub on: String,
    /// Float columns pulled from the derived table
    pub columns: Vec<String>,
}

/// A complete typed query.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    /// Target table name
    pub target: String,
    /// Conjunctive row filters
    pub filters: Vec<ColumnFilter>,
    /// Optional derived-table enrichment applied before projection/grouping
    pub join: Option<DerivedJoin>,
    /// Grouping columns; empty means one aggregate row over all matches
    pub group_by: Vec<String>,
    /// Aggregates; empty means project matching rows instead of aggregating
    pub aggregates: Vec<Aggregate>,
    /// Column projection for non-aggregating queries; `None` keeps all
    pub projection: Option<Vec<String>>,
}

impl StoreQuery {
    /// A bare scan of a table.
    pub fn scan(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            filters: Vec::new(),
            join: None,
            group_by: Vec::new(),
            aggregates: Vec::new(),
            projection: None,
        }
    }

    pub fn with_filter(mut self, filter: ColumnFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_join(mut self, join: DerivedJoin) -> Self {
        self.join = Some(join);
        self
    }

    pub fn with_group_by(mut self, columns: Vec<String>) -> Self {
        self.group_by = columns;
        self
    }

    pub fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregates.push(aggregate);
        self
    }

    pub fn with_projection(mut self, columns: Vec<String>) -> Self {
        self.projection = Some(columns);
        self
    }
}
