//! # Audit fields for persisted records
//!
//! An auditable entity carries four columns:
//!
//! | column        | type                      | written                 |
//! |---------------|---------------------------|-------------------------|
//! | `created_at`  | `DateTime<Utc>`, not null | once, on first save     |
//! | `created_by`  | `String`, not null        | once, on first save     |
//! | `modified_at` | `Option<DateTime<Utc>>`   | on every save           |
//! | `modified_by` | `Option<String>`          | on every save           |
//!
//! The store stamps them from an [`AuditStamp`] handed down by the service.
//! The acting user is an [`Actor`] extracted from the request, so records never
//! need to know where identities come from.
//!
//! ```rust,ignore
//! #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
//! #[sea_orm(table_name = "todos")]
//! pub struct Model {
//!     #[sea_orm(primary_key)]
//!     pub id: i32,
//!     pub title: String,
//!     pub created_at: DateTime<Utc>,
//!     pub created_by: String,
//!     pub modified_at: Option<DateTime<Utc>>,
//!     pub modified_by: Option<String>,
//! }
//!
//! crudstarter::auditable!(Model, ActiveModel);
//! ```

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Alias, ColumnDef, TableCreateStatement};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::CrudConfig;

pub const CREATED_AT: &str = "created_at";
pub const CREATED_BY: &str = "created_by";
pub const MODIFIED_AT: &str = "modified_at";
pub const MODIFIED_BY: &str = "modified_by";

/// Identity of whoever performs a write.
///
/// Resolved, in order, from an `Actor` inserted into the request extensions by
/// authentication middleware, from the configured actor header, and finally
/// from [`AuditConfig::default_actor`](crate::config::AuditConfig).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Actor(String);

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
    Arc<CrudConfig>: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(actor) = parts.extensions.get::<Actor>() {
            return Ok(actor.clone());
        }

        let config = Arc::<CrudConfig>::from_ref(state);
        let from_header = config.audit.actor_header.as_deref().and_then(|header| {
            parts
                .headers
                .get(header)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        });

        Ok(Self::new(from_header.unwrap_or(&config.audit.default_actor)))
    }
}

/// Who wrote a record, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditStamp {
    pub actor: String,
    pub at: DateTime<Utc>,
}

impl AuditStamp {
    pub fn new(actor: &Actor, at: DateTime<Utc>) -> Self {
        Self {
            actor: actor.id().to_string(),
            at,
        }
    }

    pub fn now(actor: &Actor) -> Self {
        Self::new(actor, Utc::now())
    }
}

/// Active models whose audit columns are managed by the store.
///
/// Usually implemented with [`auditable!`](crate::auditable).
pub trait Auditable {
    /// `true` until the record has been persisted once.
    fn is_new(&self) -> bool;

    fn set_created(&mut self, at: DateTime<Utc>, by: String);

    fn set_modified(&mut self, at: DateTime<Utc>, by: String);

    /// Creation fields are written only for new records; modification fields
    /// are written every time.
    fn stamp(&mut self, stamp: &AuditStamp) {
        if self.is_new() {
            self.set_created(stamp.at, stamp.actor.clone());
        }
        self.set_modified(stamp.at, stamp.actor.clone());
    }
}

/// Read access to the audit columns of a loaded model.
pub trait AuditedRecord {
    fn audit_info(&self) -> AuditInfo;
}

/// Audit columns as exposed in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditInfo {
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<String>,
}

/// Implements [`Auditable`] and [`AuditedRecord`] for an entity using the
/// standard `created_at`, `created_by`, `modified_at` and `modified_by` fields.
#[macro_export]
macro_rules! auditable {
    ($model:ty, $active_model:ty) => {
        impl $crate::audit::Auditable for $active_model {
            fn is_new(&self) -> bool {
                matches!(self.created_at, $crate::sea_orm::ActiveValue::NotSet)
            }

            fn set_created(&mut self, at: $crate::chrono::DateTime<$crate::chrono::Utc>, by: String) {
                self.created_at = $crate::sea_orm::ActiveValue::Set(at);
                self.created_by = $crate::sea_orm::ActiveValue::Set(by);
            }

            fn set_modified(&mut self, at: $crate::chrono::DateTime<$crate::chrono::Utc>, by: String) {
                self.modified_at = $crate::sea_orm::ActiveValue::Set(Some(at));
                self.modified_by = $crate::sea_orm::ActiveValue::Set(Some(by));
            }
        }

        impl $crate::audit::AuditedRecord for $model {
            fn audit_info(&self) -> $crate::audit::AuditInfo {
                $crate::audit::AuditInfo {
                    created_at: self.created_at,
                    created_by: self.created_by.clone(),
                    modified_at: self.modified_at,
                    modified_by: self.modified_by.clone(),
                }
            }
        }
    };
}

/// Adds the four audit columns to a table being created in a migration.
pub fn add_audit_columns(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(
            ColumnDef::new(Alias::new(CREATED_AT))
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(ColumnDef::new(Alias::new(CREATED_BY)).string().not_null())
        .col(
            ColumnDef::new(Alias::new(MODIFIED_AT))
                .timestamp_with_time_zone()
                .null(),
        )
        .col(ColumnDef::new(Alias::new(MODIFIED_BY)).string().null())
}
