//! # crudstarter
//!
//! Generic create/read/update/delete scaffolding for axum services backed by
//! sea-orm. An application supplies, per resource:
//!
//! - a sea-orm entity carrying the four audit columns ([`auditable!`]),
//! - a [`Mapper`] between request, record and response shapes,
//! - an [`EntitySpecification`] turning its query shape into a filter.
//!
//! [`EntityCrudService`] composes them into a [`CrudService`], and
//! [`CrudController`] exposes that service as five routes.
//!
//! ```rust,ignore
//! let config = Arc::new(CrudConfig::load()?);
//! let service = EntityCrudService::new(db, TodoMapper, TodoSpecification)
//!     .with_config(config);
//! let app = Router::new().nest(
//!     "/api/v1",
//!     CrudController::new(service).router("/todos"),
//! );
//! ```

pub mod audit;
pub mod config;
pub mod controller;
pub mod errors;
pub mod mapper;
pub mod page;
pub mod pageable;
pub mod service;
pub mod specification;
pub mod store;
pub mod validation;

// Used by `auditable!`
pub use chrono;
pub use sea_orm;

pub use audit::{Actor, AuditInfo, AuditStamp, Auditable, AuditedRecord, add_audit_columns};
pub use config::{AuditConfig, CrudConfig, DeletePolicy, PagingConfig};
pub use controller::{CrudController, CrudState};
pub use errors::{ApiError, EntityNotFoundError, ErrorBody, HttpServiceError};
pub use mapper::Mapper;
pub use page::Page;
pub use pageable::{Direction, Pageable, SortOrder};
pub use service::{CrudService, EntityCrudService};
pub use specification::{EntitySpecification, Specification};
pub use store::{PrimaryKeyOf, RecordStore, SeaOrmStore};
pub use validation::{Validatable, ValidJson, ValidationError, ValidationErrors};
