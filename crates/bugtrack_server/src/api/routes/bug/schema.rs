use crate::api::error::ApiError;
use crate::api::markdown::MarkdownRenderer;
use crate::api::params::nullable;
use bugtrack_sql::sql::pagination::{Page, PageDirection};
use bugtrack_sql::sql::schema::Bug;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Columns a bug list may be sorted by
pub const SORTABLE_COLUMNS: &[&str] = &[
    "latest_occurrence",
    "first_occurrence",
    "occurrences_count",
    "number",
];

pub const DEFAULT_SORT: &str = "latest_occurrence";

pub const BUG_PARAMS: &[&str] = &["fixed", "irrelevant", "assigned_user_id", "notes"];

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct BugListQuery {
    pub sort: Option<String>,
    pub dir: Option<String>,

    /// Number of the last bug on the previous page
    pub last: Option<i64>,
    pub limit: Option<i64>,
}

impl BugListQuery {
    pub fn sort_name(&self) -> Result<&str, ApiError> {
        let sort = self.sort.as_deref().unwrap_or(DEFAULT_SORT);

        if SORTABLE_COLUMNS.contains(&sort) {
            Ok(sort)
        } else {
            Err(ApiError::BadRequest(format!("Cannot sort bugs by {}", sort)))
        }
    }

    /// Qualified column handed to the pagination clause
    pub fn sort_column(&self) -> Result<String, ApiError> {
        self.sort_name().map(|sort| format!("bugs.{}", sort))
    }

    pub fn direction(&self) -> Result<PageDirection, ApiError> {
        match self.dir.as_deref() {
            Some(dir) => Ok(dir.parse::<PageDirection>()?),
            None => Ok(PageDirection::Descending),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BugResponse {
    pub number: i64,
    pub class_name: String,
    pub message: String,
    pub fixed: bool,
    pub irrelevant: bool,
    pub notes: Option<String>,
    pub assigned_user_id: Option<i64>,
    pub occurrences_count: i64,
    pub first_occurrence: DateTime<Utc>,
    pub latest_occurrence: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_html: Option<String>,
}

impl BugResponse {
    pub fn summary(bug: &Bug) -> Self {
        Self {
            number: bug.number,
            class_name: bug.class_name.clone(),
            message: bug.message.clone(),
            fixed: bug.fixed,
            irrelevant: bug.irrelevant,
            notes: bug.notes.clone(),
            assigned_user_id: bug.assigned_user_id,
            occurrences_count: bug.occurrences_count,
            first_occurrence: bug.first_occurrence,
            latest_occurrence: bug.latest_occurrence,
            description_html: None,
        }
    }

    pub fn detailed(bug: &Bug, renderer: &MarkdownRenderer) -> Self {
        Self {
            description_html: Some(renderer.render(&bug.description)),
            ..Self::summary(bug)
        }
    }
}

/// One keyset page of bugs
///
/// `last` is the cursor for the next request, `None` on an empty page.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BugPage {
    pub items: Vec<BugResponse>,
    pub has_more: bool,
    pub last: Option<i64>,
}

impl From<&Page<Bug>> for BugPage {
    fn from(page: &Page<Bug>) -> Self {
        Self {
            items: page.items.iter().map(BugResponse::summary).collect(),
            has_more: page.has_more,
            last: page.items.last().map(|bug| bug.number),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct BugUpdate {
    pub fixed: Option<bool>,
    pub irrelevant: Option<bool>,

    /// `null` unassigns
    #[serde(default, deserialize_with = "nullable")]
    pub assigned_user_id: Option<Option<i64>>,

    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
}
