//! # CRUD service
//!
//! [`CrudService`] is the five-operation contract the controller talks to.
//! [`EntityCrudService`] implements it once for any sea-orm entity by
//! composing a [`Mapper`], an [`EntitySpecification`] and a [`RecordStore`].
//!
//! Writes and listings run inside a transaction that is committed on success
//! and rolled back when dropped on an early error.
//!
//! ```rust,ignore
//! let service = EntityCrudService::new(db, TodoMapper, TodoSpecification)
//!     .with_config(config.clone());
//!
//! let created = service.create_one(&Actor::new("alice"), request).await?;
//! let page = service.get_all(TodoQuery::default(), Pageable::of(0, 20)).await?;
//! ```

use std::fmt::Display;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityName, EntityTrait,
    IntoActiveModel, TransactionTrait,
};

use crate::audit::{Actor, AuditStamp};
use crate::config::{CrudConfig, DeletePolicy};
use crate::errors::{ApiError, EntityNotFoundError};
use crate::mapper::Mapper;
use crate::page::Page;
use crate::pageable::Pageable;
use crate::specification::EntitySpecification;
use crate::store::{PrimaryKeyOf, RecordStore, SeaOrmStore};

#[async_trait]
pub trait CrudService: Send + Sync + 'static {
    type Id: Send + 'static;
    type Request: Send + 'static;
    type Query: Send + 'static;
    type Response: Send + 'static;

    /// Name used in error messages and the `Content-Range` header.
    fn resource_name(&self) -> &str;

    /// Configuration a [`CrudController`](crate::CrudController) built from
    /// this service starts with.
    fn config(&self) -> Arc<CrudConfig> {
        Arc::default()
    }

    async fn create_one(&self, actor: &Actor, request: Self::Request) -> Result<Self::Response, ApiError>;

    /// # Errors
    ///
    /// Fails with not-found when `id` does not exist.
    async fn update_one(
        &self,
        actor: &Actor,
        id: Self::Id,
        request: Self::Request,
    ) -> Result<Self::Response, ApiError>;

    /// # Errors
    ///
    /// Fails with not-found when `id` does not exist.
    async fn get_one(&self, id: Self::Id) -> Result<Self::Response, ApiError>;

    async fn get_all(&self, query: Self::Query, pageable: Pageable) -> Result<Page<Self::Response>, ApiError>;

    async fn delete_one(&self, id: Self::Id) -> Result<(), ApiError>;
}

/// Generic [`CrudService`] over a sea-orm entity.
pub struct EntityCrudService<M, F, S = SeaOrmStore> {
    db: DatabaseConnection,
    mapper: M,
    specification: F,
    store: S,
    config: Arc<CrudConfig>,
    resource: String,
}

impl<M, F> EntityCrudService<M, F, SeaOrmStore>
where
    M: Mapper,
{
    pub fn new(db: DatabaseConnection, mapper: M, specification: F) -> Self {
        Self {
            db,
            mapper,
            specification,
            store: SeaOrmStore,
            config: Arc::new(CrudConfig::default()),
            resource: M::Entity::default().table_name().to_string(),
        }
    }
}

impl<M, F, S> EntityCrudService<M, F, S> {
    /// Replace the record store.
    pub fn with_store<T>(self, store: T) -> EntityCrudService<M, F, T> {
        EntityCrudService {
            db: self.db,
            mapper: self.mapper,
            specification: self.specification,
            store,
            config: self.config,
            resource: self.resource,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: Arc<CrudConfig>) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_resource_name(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }
}

impl<M, F, S> EntityCrudService<M, F, S>
where
    M: Mapper,
    M::ActiveModel: Send + 'static,
    S: RecordStore<M::ActiveModel>,
    PrimaryKeyOf<M::Entity>: Clone + Display,
{
    fn not_found(&self, id: &PrimaryKeyOf<M::Entity>) -> EntityNotFoundError {
        EntityNotFoundError::for_id(&self.resource, id).with_status(self.config.not_found_status())
    }

    async fn get_or_throw<C>(
        &self,
        db: &C,
        id: PrimaryKeyOf<M::Entity>,
    ) -> Result<<M::Entity as EntityTrait>::Model, ApiError>
    where
        C: ConnectionTrait,
    {
        match self.store.find_by_id(db, id.clone()).await? {
            Some(model) => Ok(model),
            None => Err(self.not_found(&id).into()),
        }
    }
}

#[async_trait]
impl<M, F, S> CrudService for EntityCrudService<M, F, S>
where
    M: Mapper + 'static,
    M::ActiveModel: ActiveModelTrait<Entity = M::Entity> + Send + 'static,
    M::Request: 'static,
    M::Response: 'static,
    <M::Entity as EntityTrait>::Model: IntoActiveModel<M::ActiveModel>,
    PrimaryKeyOf<M::Entity>: Clone + Display + Sync + 'static,
    F: EntitySpecification<Entity = M::Entity> + 'static,
    F::Query: 'static,
    S: RecordStore<M::ActiveModel> + 'static,
{
    type Id = PrimaryKeyOf<M::Entity>;
    type Request = M::Request;
    type Query = F::Query;
    type Response = M::Response;

    fn resource_name(&self) -> &str {
        &self.resource
    }

    fn config(&self) -> Arc<CrudConfig> {
        Arc::clone(&self.config)
    }

    async fn create_one(&self, actor: &Actor, request: Self::Request) -> Result<Self::Response, ApiError> {
        tracing::debug!(resource = %self.resource, actor = actor.id(), "Creating record");
        let record = self.mapper.to_entity(request)?;

        let txn = self.db.begin().await?;
        let saved = self.store.save(&txn, record, &AuditStamp::now(actor)).await?;
        txn.commit().await?;

        tracing::info!(resource = %self.resource, actor = actor.id(), "Created record");
        Ok(self.mapper.to_response(saved))
    }

    async fn update_one(
        &self,
        actor: &Actor,
        id: Self::Id,
        request: Self::Request,
    ) -> Result<Self::Response, ApiError> {
        tracing::debug!(resource = %self.resource, %id, actor = actor.id(), "Updating record");
        let txn = self.db.begin().await?;
        let existing = self.get_or_throw(&txn, id.clone()).await?;

        let mut record: M::ActiveModel = existing.into_active_model();
        self.mapper.merge_into(request, &mut record)?;
        let saved = self.store.save(&txn, record, &AuditStamp::now(actor)).await?;
        txn.commit().await?;

        tracing::info!(resource = %self.resource, %id, actor = actor.id(), "Updated record");
        Ok(self.mapper.to_response(saved))
    }

    async fn get_one(&self, id: Self::Id) -> Result<Self::Response, ApiError> {
        tracing::debug!(resource = %self.resource, %id, "Fetching record");
        let model = self.get_or_throw(&self.db, id).await?;
        Ok(self.mapper.to_response(model))
    }

    async fn get_all(&self, query: Self::Query, pageable: Pageable) -> Result<Page<Self::Response>, ApiError> {
        tracing::debug!(
            resource = %self.resource,
            page = pageable.page,
            size = pageable.size,
            "Listing records"
        );
        let condition = self.specification.specification(&query);
        let ordering = pageable.ordering(&self.specification.sortable_columns());

        let txn = self.db.begin().await?;
        let page = self.store.find_all(&txn, condition, ordering, &pageable).await?;
        txn.commit().await?;

        Ok(page.map(|model| self.mapper.to_response(model)))
    }

    async fn delete_one(&self, id: Self::Id) -> Result<(), ApiError> {
        tracing::debug!(resource = %self.resource, %id, "Deleting record");
        let txn = self.db.begin().await?;
        let deleted = self.store.delete_by_id(&txn, id.clone()).await?;
        if deleted == 0 && self.config.delete_policy == DeletePolicy::RequireExisting {
            return Err(self.not_found(&id).into());
        }
        txn.commit().await?;

        if deleted > 0 {
            tracing::info!(resource = %self.resource, %id, "Deleted record");
        }
        Ok(())
    }
}
