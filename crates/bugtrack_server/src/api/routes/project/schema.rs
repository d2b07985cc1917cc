use crate::api::params::nullable;
use bugtrack_sql::sql::schema::Project;
use bugtrack_types::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PROJECT_PARAMS: &[&str] = &["name", "default_environment"];

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProjectResponse {
    pub slug: String,
    pub name: String,
    pub default_environment: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl ProjectResponse {
    pub fn new(project: &Project, role: Role) -> Self {
        Self {
            slug: project.slug.clone(),
            name: project.name.clone(),
            default_environment: project.default_environment.clone(),
            role,
            created_at: project.created_at,
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ProjectUpdate {
    /// `null` counts as blank
    #[serde(default, deserialize_with = "nullable")]
    pub name: Option<Option<String>>,

    /// `null` clears the default
    #[serde(default, deserialize_with = "nullable")]
    pub default_environment: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::params::{permitted, Params};
    use serde_json::json;

    fn params(value: serde_json::Value) -> Params {
        match value {
            serde_json::Value::Object(map) => map,
            other => panic!("expected an object, got {}", other),
        }
    }

    #[test]
    fn test_project_update_null_name() {
        let update: ProjectUpdate =
            permitted(params(json!({"name": null})), PROJECT_PARAMS).unwrap();
        assert_eq!(update.name, Some(None));
        assert_eq!(update.default_environment, None);

        let update: ProjectUpdate =
            permitted(params(json!({"default_environment": "staging"})), PROJECT_PARAMS).unwrap();
        assert_eq!(update.name, None);
        assert_eq!(update.default_environment, Some(Some("staging".to_string())));
    }
}
