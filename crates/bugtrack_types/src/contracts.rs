use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use tracing::error;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct JwtToken {
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Alive {
    pub status: String,
}

impl Default for Alive {
    fn default() -> Self {
        Self {
            status: "Alive".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// JSON body returned for failed API requests
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ServerErrorBody {
    pub error: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}

impl ServerErrorBody {
    fn message(error: &str) -> Self {
        ServerErrorBody {
            error: error.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn not_authenticated() -> Self {
        Self::message("Authentication required")
    }

    pub fn permission_denied() -> Self {
        Self::message("You don't have permission to do that")
    }

    pub fn invalid_authenticity_token() -> Self {
        error!("Request rejected: invalid authenticity token");
        Self::message("Invalid authenticity token")
    }

    pub fn disallowed_parameters(fields: &[String]) -> Self {
        ServerErrorBody {
            error: "Disallowed parameters in request".to_string(),
            fields: fields.to_vec(),
        }
    }

    pub fn bad_request<T: Display>(e: T) -> Self {
        ServerErrorBody {
            error: e.to_string(),
            fields: Vec::new(),
        }
    }

    pub fn internal<T: Display>(e: T) -> Self {
        error!("Internal server error: {}", e);
        Self::message("Internal server error")
    }
}

/// Field errors keyed by resource name, then field name.
///
/// Serializes as `{"project": {"name": ["is required"]}}`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: &str, field: &str, message: impl Into<String>) {
        self.0
            .entry(resource.to_string())
            .or_default()
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|fields| fields.is_empty())
    }

    /// Flattened `"field message"` strings, in resource then field order
    pub fn full_messages(&self) -> Vec<String> {
        self.0
            .values()
            .flat_map(|fields| {
                fields.iter().flat_map(|(field, messages)| {
                    messages.iter().map(move |m| format!("{} {}", field, m))
                })
            })
            .collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}
