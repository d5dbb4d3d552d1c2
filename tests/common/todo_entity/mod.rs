use std::sync::Arc;

use chrono::{DateTime, Utc};
use crudstarter::validation::validators::{validate_length, validate_range};
use crudstarter::{
    ApiError, AuditInfo, AuditedRecord, CrudConfig, EntityCrudService, EntitySpecification,
    Mapper, Specification, Validatable, ValidationError, ValidationErrors,
};
use sea_orm::{ActiveValue::Set, Condition, entity::prelude::*};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "todos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub completed: bool,
    pub priority: i32,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub modified_at: Option<DateTime<Utc>>,
    pub modified_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

crudstarter::auditable!(Model, ActiveModel);

/// Create and update body. Absent fields are left untouched on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoRequest {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub priority: Option<i32>,
}

impl Validatable for TodoRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(title) = &self.title {
            errors.check(validate_length("title", title, Some(1), Some(100)));
        }
        if let Some(priority) = self.priority {
            errors.check(validate_range("priority", priority, Some(0), Some(5)));
        }
        errors.result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TodoQuery {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub min_priority: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoResponse {
    pub id: i32,
    pub title: String,
    pub completed: bool,
    pub priority: i32,
    pub audit: AuditInfo,
}

pub struct TodoMapper;

impl Mapper for TodoMapper {
    type Entity = Entity;
    type ActiveModel = ActiveModel;
    type Request = TodoRequest;
    type Response = TodoResponse;

    fn to_entity(&self, request: TodoRequest) -> Result<ActiveModel, ApiError> {
        let Some(title) = request.title else {
            return Err(ValidationErrors::from(ValidationError::new("title", "This field is required")).into());
        };
        Ok(ActiveModel {
            title: Set(title),
            completed: Set(request.completed.unwrap_or(false)),
            priority: Set(request.priority.unwrap_or(0)),
            ..Default::default()
        })
    }

    fn merge_into(&self, request: TodoRequest, entity: &mut ActiveModel) -> Result<(), ApiError> {
        if let Some(title) = request.title {
            entity.title = Set(title);
        }
        if let Some(completed) = request.completed {
            entity.completed = Set(completed);
        }
        if let Some(priority) = request.priority {
            entity.priority = Set(priority);
        }
        Ok(())
    }

    fn to_response(&self, model: Model) -> TodoResponse {
        TodoResponse {
            audit: model.audit_info(),
            id: model.id,
            title: model.title,
            completed: model.completed,
            priority: model.priority,
        }
    }
}

pub struct TodoSpecification;

impl EntitySpecification for TodoSpecification {
    type Entity = Entity;
    type Query = TodoQuery;

    fn specification(&self, query: &TodoQuery) -> Condition {
        Specification::new()
            .contains(Column::Title, query.title.as_deref())
            .equal(Column::Completed, query.completed)
            .at_least(Column::Priority, query.min_priority)
            .into()
    }

    fn sortable_columns(&self) -> Vec<(&'static str, Column)> {
        vec![
            ("title", Column::Title),
            ("priority", Column::Priority),
            ("createdAt", Column::CreatedAt),
        ]
    }
}

pub type TodoService = EntityCrudService<TodoMapper, TodoSpecification>;

pub fn todo_service(db: DatabaseConnection, config: Arc<CrudConfig>) -> TodoService {
    EntityCrudService::new(db, TodoMapper, TodoSpecification).with_config(config)
}
