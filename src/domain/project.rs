use std::{fmt, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

pub const URL_VAR: &str = "SUPABASE_URL";
pub const SERVICE_KEY_VAR: &str = "SUPABASE_SERVICE_ROLE_KEY";

pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_NAME: &str = "postgres";
pub const DEFAULT_DB_USER: &str = "postgres";

const PLACEHOLDER_MARKER: &str = "your-project";

static PROJECT_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://)?([A-Za-z0-9-]+)\.supabase\.co/?$")
        .expect("project url pattern should compile")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing SUPABASE_URL in environment or env file")]
    MissingUrl,
    #[error("SUPABASE_URL still holds the template value: {0}")]
    PlaceholderUrl(String),
    #[error("SUPABASE_URL is not a project URL (expected https://<project-id>.supabase.co): {0}")]
    UnrecognizedUrl(String),
    #[error("Password is required")]
    EmptyPassword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    id: String,
}

impl ProjectRef {
    pub fn parse(url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConfigError::MissingUrl);
        }
        if url.contains(PLACEHOLDER_MARKER) {
            return Err(ConfigError::PlaceholderUrl(url.to_string()));
        }

        let captures = PROJECT_URL_PATTERN
            .captures(url)
            .ok_or_else(|| ConfigError::UnrecognizedUrl(url.to_string()))?;

        Ok(Self {
            id: captures[1].to_string(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn db_host(&self) -> String {
        format!("db.{}.supabase.co", self.id)
    }

    pub fn editor_url(&self) -> String {
        format!("https://supabase.com/dashboard/project/{}/editor", self.id)
    }
}

#[derive(Debug, Clone)]
pub struct ProjectSettings {
    pub project: ProjectRef,
    pub has_service_key: bool,
}

impl ProjectSettings {
    /// Reads the project settings through `lookup`, which resolves variable names
    /// (the process environment outside of tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let url = lookup(URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingUrl)?;
        let project = ProjectRef::parse(&url)?;
        let has_service_key = lookup(SERVICE_KEY_VAR).is_some_and(|key| !key.trim().is_empty());

        Ok(Self {
            project,
            has_service_key,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOverrides {
    pub port: u16,
    pub database: String,
    pub user: String,
}

impl Default for ConnectionOverrides {
    fn default() -> Self {
        Self {
            port: DEFAULT_DB_PORT,
            database: DEFAULT_DB_NAME.to_string(),
            user: DEFAULT_DB_USER.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    password: String,
}

impl ConnectionConfig {
    pub fn for_project(
        project: &ProjectRef,
        password: &str,
        overrides: ConnectionOverrides,
    ) -> Result<Self, ConfigError> {
        let password = password.trim();
        if password.is_empty() {
            return Err(ConfigError::EmptyPassword);
        }

        Ok(Self {
            host: project.db_host(),
            port: overrides.port,
            database: overrides.database,
            user: overrides.user,
            password: password.to_string(),
        })
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}
