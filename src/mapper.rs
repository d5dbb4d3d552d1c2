use sea_orm::{ActiveModelTrait, EntityTrait};

use crate::errors::ApiError;

/// Conversions between the request, persisted and response shapes of a
/// resource.
///
/// `merge_into` mutates an existing active model in place. It may overwrite
/// fields but must never change the primary key. Whether absent request
/// fields are left untouched (patch) or cleared (overwrite) is up to the
/// implementation.
///
/// ```rust,ignore
/// impl Mapper for TodoMapper {
///     type Entity = todo::Entity;
///     type ActiveModel = todo::ActiveModel;
///     type Request = TodoRequest;
///     type Response = TodoResponse;
///
///     fn to_entity(&self, request: TodoRequest) -> Result<todo::ActiveModel, ApiError> {
///         Ok(todo::ActiveModel {
///             title: Set(request.title),
///             ..Default::default()
///         })
///     }
///
///     fn merge_into(&self, request: TodoRequest, entity: &mut todo::ActiveModel) -> Result<(), ApiError> {
///         entity.title = Set(request.title);
///         Ok(())
///     }
///
///     fn to_response(&self, model: todo::Model) -> TodoResponse {
///         TodoResponse { id: model.id, title: model.title }
///     }
/// }
/// ```
pub trait Mapper: Send + Sync {
    type Entity: EntityTrait;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity>;
    type Request: Send;
    type Response: Send;

    /// Build a new, not yet persisted record.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be turned into a record.
    fn to_entity(&self, request: Self::Request) -> Result<Self::ActiveModel, ApiError>;

    /// Apply the request to a loaded record.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be applied.
    fn merge_into(&self, request: Self::Request, entity: &mut Self::ActiveModel) -> Result<(), ApiError>;

    fn to_response(&self, model: <Self::Entity as EntityTrait>::Model) -> Self::Response;
}
