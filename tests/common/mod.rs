#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use crudstarter::{AuditConfig, CrudConfig, CrudController, add_audit_columns};
use sea_orm::{Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use serde_json::Value;
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

pub mod note_entity;
pub mod todo_entity;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Default configuration plus the `x-actor` header for audit tests.
pub fn test_config() -> CrudConfig {
    CrudConfig {
        audit: AuditConfig {
            actor_header: Some("x-actor".to_string()),
            ..AuditConfig::default()
        },
        ..CrudConfig::default()
    }
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    setup_test_app_with_config(db, test_config())
}

pub fn setup_test_app_with_config(db: DatabaseConnection, config: CrudConfig) -> Router {
    let config = Arc::new(config);

    let todos = CrudController::new(todo_entity::todo_service(db.clone(), config.clone()))
        .router("/todos");
    let notes = CrudController::new(note_entity::note_service(db, config)).router("/notes");

    Router::new().nest("/api/v1", todos.merge(notes))
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateTodoTable), Box::new(CreateNoteTable)]
    }
}

pub struct CreateTodoTable;

impl MigrationName for CreateTodoTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_todo_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateTodoTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table
            .table(Todos::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Todos::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Todos::Title).string().not_null().unique_key())
            .col(
                ColumnDef::new(Todos::Completed)
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(
                ColumnDef::new(Todos::Priority)
                    .integer()
                    .not_null()
                    .default(0),
            );
        add_audit_columns(&mut table);

        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Todos::Table).to_owned())
            .await
    }
}

pub struct CreateNoteTable;

impl MigrationName for CreateNoteTable {
    fn name(&self) -> &'static str {
        "m20240101_000002_create_note_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateNoteTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create();
        table
            .table(Notes::Table)
            .if_not_exists()
            .col(ColumnDef::new(Notes::Id).uuid().not_null().primary_key())
            .col(ColumnDef::new(Notes::Body).text().not_null());
        add_audit_columns(&mut table);

        manager.create_table(table).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Todos {
    Table,
    Id,
    Title,
    Completed,
    Priority,
}

#[derive(DeriveIden)]
enum Notes {
    Table,
    Id,
    Body,
}
