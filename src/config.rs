//! Configuration using Figment
//!
//! Sources, highest precedence first:
//! 1. Environment variables prefixed with `CRUD_`, sections separated by `__`
//!    (`CRUD_PAGING__DEFAULT_PAGE_SIZE=50`)
//! 2. A TOML file (`crud.toml` for [`CrudConfig::load`])
//! 3. Default values
//!
//! ```toml
//! delete_policy = "require_existing"
//! not_found_status = 404
//!
//! [paging]
//! default_page_size = 20
//! max_page_size = 200
//!
//! [audit]
//! actor_header = "x-actor"
//! default_actor = "system"
//! ```

use std::path::Path;

use axum::http::StatusCode;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

const DEFAULT_CONFIG_FILE: &str = "crud.toml";
const ENV_PREFIX: &str = "CRUD_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrudConfig {
    pub paging: PagingConfig,
    pub audit: AuditConfig,
    pub delete_policy: DeletePolicy,
    /// Status reported when a record is missing
    pub not_found_status: u16,
}

/// Defaults and limits applied when parsing `page`, `size` and `sort`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
    /// Treat `page=1` as the first page
    pub one_indexed_parameters: bool,
}

/// Where the acting user's identity comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Request header holding the actor id. Only enable behind a proxy that
    /// strips client-supplied values.
    pub actor_header: Option<String>,
    /// Actor recorded when nothing else identifies the caller
    pub default_actor: String,
}

/// Behaviour of `delete_one` for an identifier that does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Missing ids are a silent no-op
    #[default]
    Idempotent,
    /// Missing ids fail with not-found
    RequireExisting,
}

impl Default for CrudConfig {
    fn default() -> Self {
        Self {
            paging: PagingConfig::default(),
            audit: AuditConfig::default(),
            delete_policy: DeletePolicy::default(),
            not_found_status: StatusCode::NOT_FOUND.as_u16(),
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 2000,
            one_indexed_parameters: false,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            actor_header: None,
            default_actor: "system".to_string(),
        }
    }
}

impl CrudConfig {
    /// Load from `./crud.toml` (if present) and `CRUD_` environment variables.
    ///
    /// # Errors
    ///
    /// Returns a figment error when a source holds a value of the wrong type.
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from a specific TOML file, still honouring environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a figment error when a source holds a value of the wrong type.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading CRUD configuration from: {}", path.display());
        }

        Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
    }

    /// The not-found status as a `StatusCode`, falling back to 404 when the
    /// configured number is not a valid status.
    #[must_use]
    pub fn not_found_status(&self) -> StatusCode {
        StatusCode::from_u16(self.not_found_status).unwrap_or_else(|_| {
            tracing::warn!(
                status = self.not_found_status,
                "Invalid not_found_status, using 404"
            );
            StatusCode::NOT_FOUND
        })
    }
}
