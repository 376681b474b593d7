//! Common repository traits
//!
//! Generic interfaces shared by every repository. All methods return raw
//! `sqlx::Error`s; the services convert them into `AppError` with `?`.

/// Inserts a new row and returns the stored entity (with its key).
pub trait Create<Entity, CreateDTO> {
    async fn create(&self, data: &CreateDTO) -> Result<Entity, sqlx::Error>;
}

/// Reads a single entity by primary key.
///
/// Returns `Ok(None)` when no row has that key.
pub trait Read<Entity, Id> {
    async fn read(&self, id: &Id) -> Result<Option<Entity>, sqlx::Error>;
}

/// Partially updates an existing entity.
///
/// Only the `Some(_)` fields of the DTO are written. Fails with
/// `sqlx::Error::RowNotFound` when the entity does not exist.
pub trait Update<Entity, UpdateDTO, Id> {
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, sqlx::Error>;
}
