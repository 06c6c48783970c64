use thiserror::Error;

use crate::domain::permission::{Authorizer, Target};
use crate::dto::api::InvalidResponse;
use crate::query::errors::QueryError;
use crate::repository::errors::RepositoryError;

pub mod datatable;
pub mod resource;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// The payload failed validation; every failure is listed.
    #[error("invalid request: {0:?}")]
    Invalid(InvalidResponse),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Fails with [`ServiceError::Unauthorized`] unless `permission` is granted
/// on `target`.
pub fn check_permission<A>(authorizer: &A, target: &Target<'_>, permission: &str) -> ServiceResult<()>
where
    A: Authorizer + ?Sized,
{
    if authorizer.has_permission(target, permission) {
        Ok(())
    } else {
        log::info!("Permission {permission} denied on {target:?}");
        Err(ServiceError::Unauthorized)
    }
}
