use crate::sql::pagination::{FieldAccess, FieldValue};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub owner_id: i64,
    pub default_environment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Environment {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Bug {
    pub id: i64,
    pub environment_id: i64,
    pub number: i64,
    pub class_name: String,
    pub message: String,
    pub description: String,
    pub fixed: bool,
    pub irrelevant: bool,
    pub notes: Option<String>,
    pub assigned_user_id: Option<i64>,
    pub occurrences_count: i64,
    pub first_occurrence: DateTime<Utc>,
    pub latest_occurrence: DateTime<Utc>,
}

impl FieldAccess for Bug {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.into()),
            "environment_id" => Some(self.environment_id.into()),
            "number" => Some(self.number.into()),
            "class_name" => Some(self.class_name.as_str().into()),
            "message" => Some(self.message.as_str().into()),
            "fixed" => Some(self.fixed.into()),
            "irrelevant" => Some(self.irrelevant.into()),
            "occurrences_count" => Some(self.occurrences_count.into()),
            "first_occurrence" => Some(self.first_occurrence.into()),
            "latest_occurrence" => Some(self.latest_occurrence.into()),
            _ => None,
        }
    }
}

/// Values needed to record a new bug
#[derive(Debug, Clone)]
pub struct NewBug {
    pub environment_id: i64,
    pub class_name: String,
    pub message: String,
    pub description: String,
    pub occurrences_count: i64,
    pub first_occurrence: DateTime<Utc>,
    pub latest_occurrence: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_bug_field_access() {
        let seen = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let bug = Bug {
            id: 10,
            environment_id: 2,
            number: 4,
            class_name: "NoMethodError".to_string(),
            message: "undefined method".to_string(),
            description: String::new(),
            fixed: false,
            irrelevant: false,
            notes: None,
            assigned_user_id: None,
            occurrences_count: 12,
            first_occurrence: seen,
            latest_occurrence: seen,
        };

        assert_eq!(bug.field("number"), Some(FieldValue::Integer(4)));
        assert_eq!(bug.field("latest_occurrence"), Some(FieldValue::Timestamp(seen)));
        assert_eq!(bug.field("notes"), None);
        assert_eq!(bug.field("bugs.number"), None);
    }
}
