//! Persistence operations used by the CRUD service.
//!
//! Every method is generic over `ConnectionTrait`, so the same store works on a
//! `DatabaseConnection` or inside a `DatabaseTransaction`.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, Condition, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, Iterable, Order, PaginatorTrait, PrimaryKeyToColumn, PrimaryKeyTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

use crate::audit::{AuditStamp, Auditable};
use crate::page::Page;
use crate::pageable::Pageable;

/// Primary key value type of an entity.
pub type PrimaryKeyOf<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Model type behind an active model.
pub type ModelOf<A> = <<A as ActiveModelTrait>::Entity as EntityTrait>::Model;

/// Column type behind an active model.
pub type ColumnOf<A> = <<A as ActiveModelTrait>::Entity as EntityTrait>::Column;

#[async_trait]
pub trait RecordStore<A>: Send + Sync
where
    A: ActiveModelTrait + Send + 'static,
{
    async fn find_by_id<C>(
        &self,
        db: &C,
        id: PrimaryKeyOf<A::Entity>,
    ) -> Result<Option<ModelOf<A>>, DbErr>
    where
        C: ConnectionTrait;

    /// Insert a new record or update a loaded one, stamping its audit fields.
    async fn save<C>(&self, db: &C, record: A, stamp: &AuditStamp) -> Result<ModelOf<A>, DbErr>
    where
        C: ConnectionTrait;

    /// Returns the number of deleted rows; deleting a missing id is not an error.
    async fn delete_by_id<C>(&self, db: &C, id: PrimaryKeyOf<A::Entity>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait;

    async fn find_all<C>(
        &self,
        db: &C,
        condition: Condition,
        ordering: Vec<(ColumnOf<A>, Order)>,
        pageable: &Pageable,
    ) -> Result<Page<ModelOf<A>>, DbErr>
    where
        C: ConnectionTrait;
}

/// Store backed directly by the entity's sea-orm operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeaOrmStore;

#[async_trait]
impl<A> RecordStore<A> for SeaOrmStore
where
    A: ActiveModelTrait + ActiveModelBehavior + Auditable + Send + 'static,
    ModelOf<A>: IntoActiveModel<A> + Sync,
{
    async fn find_by_id<C>(
        &self,
        db: &C,
        id: PrimaryKeyOf<A::Entity>,
    ) -> Result<Option<ModelOf<A>>, DbErr>
    where
        C: ConnectionTrait,
    {
        A::Entity::find_by_id(id).one(db).await
    }

    async fn save<C>(&self, db: &C, mut record: A, stamp: &AuditStamp) -> Result<ModelOf<A>, DbErr>
    where
        C: ConnectionTrait,
    {
        let is_new = record.is_new();
        record.stamp(stamp);
        if is_new {
            record.insert(db).await
        } else {
            record.update(db).await
        }
    }

    async fn delete_by_id<C>(&self, db: &C, id: PrimaryKeyOf<A::Entity>) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
    {
        let result = A::Entity::delete_by_id(id).exec(db).await?;
        Ok(result.rows_affected)
    }

    async fn find_all<C>(
        &self,
        db: &C,
        condition: Condition,
        ordering: Vec<(ColumnOf<A>, Order)>,
        pageable: &Pageable,
    ) -> Result<Page<ModelOf<A>>, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut select = A::Entity::find().filter(condition);
        for (column, order) in ordering {
            select = select.order_by(column, order);
        }
        // primary key last, so equal sort keys still page deterministically
        for key in <<A::Entity as EntityTrait>::PrimaryKey as Iterable>::iter() {
            select = select.order_by(key.into_column(), Order::Asc);
        }

        let total = select.clone().count(db).await?;
        let models = select
            .offset(pageable.offset())
            .limit(pageable.limit())
            .all(db)
            .await?;

        Ok(Page::new(models, pageable, total))
    }
}
