//! Entity with a client-side UUID key: new records already carry a `Set`
//! primary key, so newness comes from the audit columns alone.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use crudstarter::validation::validators::validate_required;
use crudstarter::{
    ApiError, CrudConfig, EntityCrudService, EntitySpecification, Mapper, Specification,
    Validatable, ValidationErrors,
};
use sea_orm::{ActiveValue::Set, Condition, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

crudstarter::auditable!(Model, ActiveModel);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRequest {
    pub body: String,
}

impl Validatable for NoteRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_required("body", &self.body));
        errors.result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteQuery {
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteResponse {
    pub id: Uuid,
    pub body: String,
    pub created_by: String,
    pub modified_by: Option<String>,
}

pub struct NoteMapper;

impl Mapper for NoteMapper {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    type Request = NoteRequest;
    type Response = NoteResponse;

    fn to_entity(&self, request: NoteRequest) -> Result<ActiveModel, ApiError> {
        Ok(ActiveModel {
            id: Set(Uuid::new_v4()),
            body: Set(request.body),
            ..Default::default()
        })
    }

    fn merge_into(&self, request: NoteRequest, entity: &mut ActiveModel) -> Result<(), ApiError> {
        entity.body = Set(request.body);
        Ok(())
    }

    fn to_response(&self, model: Model) -> NoteResponse {
        NoteResponse {
            id: model.id,
            body: model.body,
            created_by: model.created_by,
            modified_by: model.modified_by,
        }
    }
}

pub struct NoteSpecification;

impl EntitySpecification for NoteSpecification {
    type Entity = Entity;
    type Query = NoteQuery;

    fn specification(&self, query: &NoteQuery) -> Condition {
        Specification::new()
            .contains(Column::Body, query.body.as_deref())
            .build()
    }
}

pub fn note_service(
    db: DatabaseConnection,
    config: Arc<CrudConfig>,
) -> EntityCrudService<NoteMapper, NoteSpecification> {
    EntityCrudService::new(db, NoteMapper, NoteSpecification)
        .with_config(config)
        .with_resource_name("notes")
}
