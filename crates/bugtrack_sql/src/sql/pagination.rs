//! Keyset ("infinite scroll") pagination.
//!
//! A page is requested by handing over the last row of the previous page. The
//! builder reads that row's sort value (and optionally a tie-break key) and
//! produces a predicate selecting everything strictly after it in the chosen
//! order:
//!
//! ```text
//! ASC,  no key:  column > last
//! ASC,  key:     (column > last) OR (column = last AND key > last_key)
//! DESC, no key:  column < last
//! DESC, key:     (column < last) OR (column = last AND key < last_key)
//! ```
//!
//! The first page never reaches the builder, callers issue the unfiltered
//! query themselves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaginationError {
    #[error("Invalid sort direction {0:?}, expected \"asc\" or \"desc\"")]
    InvalidDirection(String),

    #[error("Invalid column name {0:?}")]
    InvalidColumnName(String),

    #[error("Field {0:?} not found on record")]
    FieldNotFound(String),

    #[error("Field {0:?} cannot be compared with the cursor value")]
    TypeMismatch(String),
}

/// A single comparable value read from a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Text(String),
}

impl FieldValue {
    /// Ordering between two values of the same kind. Mixed kinds are unordered.
    ///
    /// Text compares by bytes, which is the order Postgres uses under
    /// `COLLATE "C"`. Text sort columns under any other collation will not
    /// agree with [`PaginationClause::matches`].
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Integer(a), FieldValue::Integer(b)) => Some(a.cmp(b)),
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => Some(a.cmp(b)),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn push_bind(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        match self {
            FieldValue::Integer(v) => builder.push_bind(*v),
            FieldValue::Boolean(v) => builder.push_bind(*v),
            FieldValue::Timestamp(v) => builder.push_bind(*v),
            FieldValue::Text(v) => builder.push_bind(v.clone()),
        };
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(value as i64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Read access to a record's fields by bare (unqualified) name
pub trait FieldAccess {
    fn field(&self, name: &str) -> Option<FieldValue>;
}

impl FieldAccess for HashMap<String, FieldValue> {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.get(name).cloned()
    }
}

impl FieldAccess for BTreeMap<String, FieldValue> {
    fn field(&self, name: &str) -> Option<FieldValue> {
        self.get(name).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageDirection {
    Ascending,
    Descending,
}

impl PageDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            PageDirection::Ascending => "ASC",
            PageDirection::Descending => "DESC",
        }
    }

    fn operator(&self) -> &'static str {
        match self {
            PageDirection::Ascending => ">",
            PageDirection::Descending => "<",
        }
    }

    /// Whether `ordering` (candidate compared to cursor) places the candidate after the cursor
    fn is_after(&self, ordering: Ordering) -> bool {
        match self {
            PageDirection::Ascending => ordering == Ordering::Greater,
            PageDirection::Descending => ordering == Ordering::Less,
        }
    }
}

impl FromStr for PageDirection {
    type Err = PaginationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(PageDirection::Ascending),
            "desc" | "descending" => Ok(PageDirection::Descending),
            _ => Err(PaginationError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for PageDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Check that `name` is a plain or dotted identifier (`field`, `table.field`,
/// `schema.table.field`) and return its bare field name.
pub fn bare_field_name(name: &str) -> Result<&str, PaginationError> {
    let invalid = || PaginationError::InvalidColumnName(name.to_string());

    let segments: Vec<&str> = name.split('.').collect();
    if segments.len() > 3 {
        return Err(invalid());
    }

    for segment in &segments {
        let mut chars = segment.chars();
        match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
            _ => return Err(invalid()),
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid());
        }
    }

    segments.last().copied().ok_or_else(invalid)
}

fn read_field<R: FieldAccess + ?Sized>(
    record: &R,
    column: &str,
) -> Result<FieldValue, PaginationError> {
    let field = bare_field_name(column)?;
    record
        .field(field)
        .ok_or_else(|| PaginationError::FieldNotFound(field.to_string()))
}

#[derive(Debug, Clone, PartialEq)]
struct TieBreak {
    key: String,
    last_key: FieldValue,
}

/// Predicate selecting the rows that follow a cursor row
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationClause {
    column: String,
    direction: PageDirection,
    last_value: FieldValue,
    tie_break: Option<TieBreak>,
}

impl PaginationClause {
    /// Build the clause from the last row of the previous page.
    ///
    /// # Arguments
    /// * `column` - Sort column, optionally qualified (`bugs.number`)
    /// * `direction` - Sort direction of the listing
    /// * `last` - The last row returned on the previous page
    /// * `tie_break_key` - Unique column used to order rows sharing the same `column` value
    pub fn new<R: FieldAccess + ?Sized>(
        column: &str,
        direction: PageDirection,
        last: &R,
        tie_break_key: Option<&str>,
    ) -> Result<Self, PaginationError> {
        let last_value = read_field(last, column)?;

        let tie_break = match tie_break_key {
            Some(key) => Some(TieBreak {
                key: key.to_string(),
                last_key: read_field(last, key)?,
            }),
            None => None,
        };

        Ok(Self {
            column: column.to_string(),
            direction,
            last_value,
            tie_break,
        })
    }

    pub fn direction(&self) -> PageDirection {
        self.direction
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn tie_break_key(&self) -> Option<&str> {
        self.tie_break.as_ref().map(|t| t.key.as_str())
    }

    /// Bound values in placeholder order
    pub fn values(&self) -> Vec<FieldValue> {
        match &self.tie_break {
            None => vec![self.last_value.clone()],
            Some(tie) => vec![
                self.last_value.clone(),
                self.last_value.clone(),
                tie.last_key.clone(),
            ],
        }
    }

    /// Render the predicate with `$n` placeholders starting at `first_placeholder`
    pub fn to_sql(&self, first_placeholder: usize) -> String {
        let op = self.direction.operator();
        let n = first_placeholder;
        match &self.tie_break {
            None => format!("{} {} ${}", self.column, op, n),
            Some(tie) => format!(
                "(({col} {op} ${a}) OR ({col} = ${b} AND {key} {op} ${c}))",
                col = self.column,
                op = op,
                key = tie.key,
                a = n,
                b = n + 1,
                c = n + 2,
            ),
        }
    }

    /// Append the predicate to a query, binding the cursor values
    pub fn push_to(&self, builder: &mut QueryBuilder<'_, Postgres>) {
        let op = self.direction.operator();
        match &self.tie_break {
            None => {
                builder.push(format!("{} {} ", self.column, op));
                self.last_value.push_bind(builder);
            }
            Some(tie) => {
                builder.push(format!("(({} {} ", self.column, op));
                self.last_value.push_bind(builder);
                builder.push(format!(") OR ({} = ", self.column));
                self.last_value.push_bind(builder);
                builder.push(format!(" AND {} {} ", tie.key, op));
                tie.last_key.push_bind(builder);
                builder.push("))");
            }
        }
    }

    /// Evaluate the predicate against an in-memory record, with the ordering of
    /// [`FieldValue::compare`]
    pub fn matches<R: FieldAccess + ?Sized>(&self, record: &R) -> Result<bool, PaginationError> {
        let value = read_field(record, &self.column)?;
        let ordering = value
            .compare(&self.last_value)
            .ok_or_else(|| PaginationError::TypeMismatch(self.column.clone()))?;

        if self.direction.is_after(ordering) {
            return Ok(true);
        }

        match (&self.tie_break, ordering) {
            (Some(tie), Ordering::Equal) => {
                let key = read_field(record, &tie.key)?;
                let key_ordering = key
                    .compare(&tie.last_key)
                    .ok_or_else(|| PaginationError::TypeMismatch(tie.key.clone()))?;
                Ok(self.direction.is_after(key_ordering))
            }
            _ => Ok(false),
        }
    }
}

/// Build the clause selecting the rows after `last`.
///
/// `direction` is matched case-insensitively against `asc`/`desc`. Unknown
/// directions are rejected rather than producing an always-true filter.
pub fn build_clause<R: FieldAccess + ?Sized>(
    column: &str,
    direction: &str,
    last: &R,
    tie_break_key: Option<&str>,
) -> Result<PaginationClause, PaginationError> {
    let direction = PageDirection::from_str(direction)?;
    PaginationClause::new(column, direction, last, tie_break_key)
}

/// Append `ORDER BY column DIR[, key DIR]`
pub fn push_order_by(
    builder: &mut QueryBuilder<'_, Postgres>,
    column: &str,
    direction: PageDirection,
    tie_break_key: Option<&str>,
) -> Result<(), PaginationError> {
    bare_field_name(column)?;
    builder.push(format!(" ORDER BY {} {}", column, direction.as_sql()));

    if let Some(key) = tie_break_key {
        bare_field_name(key)?;
        builder.push(format!(", {} {}", key, direction.as_sql()));
    }

    Ok(())
}

/// One page of rows plus whether more rows follow it.
///
/// Queries fetch `limit + 1` rows; the extra row only signals `has_more`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> Page<T> {
    pub fn from_overfetch(mut items: Vec<T>, limit: i64) -> Self {
        let limit = limit.max(0) as usize;
        let has_more = items.len() > limit;
        items.truncate(limit);
        Self { items, has_more }
    }
}
