use crate::error::SettingsError;
use crate::parse_env;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HttpSettings {
    pub port: u16,

    /// Rows returned by a list endpoint when the request does not ask for a limit
    pub page_size: i64,

    /// Upper bound applied to any requested limit
    pub max_page_size: i64,
}

impl HttpSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let page_size = parse_env::<i64>("PAGE_SIZE", 50)?;
        let max_page_size = parse_env::<i64>("MAX_PAGE_SIZE", 200)?;

        for (name, value) in [("PAGE_SIZE", page_size), ("MAX_PAGE_SIZE", max_page_size)] {
            if value <= 0 {
                return Err(SettingsError::NotPositive {
                    name: name.to_string(),
                });
            }
        }

        Ok(Self {
            port: parse_env::<u16>("BUGTRACK_SERVER_PORT", 8000)?,
            page_size,
            max_page_size: max_page_size.max(page_size),
        })
    }

    /// Clamp a requested page size into `1..=max_page_size`
    pub fn clamp_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.page_size)
            .clamp(1, self.max_page_size)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            page_size: 50,
            max_page_size: 200,
        }
    }
}
