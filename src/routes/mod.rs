use actix_web::HttpResponse;

use crate::dto::api::InvalidResponse;
use crate::repository::errors::RepositoryError;
use crate::services::ServiceError;

pub mod api;

/// Maps a failed service call to its HTTP response.
pub fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => HttpResponse::Forbidden().finish(),
        ServiceError::NotFound(message) => HttpResponse::NotFound().body(message),
        ServiceError::Invalid(response) => HttpResponse::BadRequest().json(response),
        ServiceError::Repository(RepositoryError::ConstraintViolation(message)) => {
            HttpResponse::BadRequest().json(InvalidResponse::global(message))
        }
        err => {
            log::error!("Request failed: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::query::errors::QueryError;

    #[test]
    fn service_errors_map_to_status_codes() {
        let cases = [
            (ServiceError::Unauthorized, StatusCode::FORBIDDEN),
            (
                ServiceError::NotFound("gone".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::Invalid(InvalidResponse::global("empty")),
                StatusCode::BAD_REQUEST,
            ),
            (
                RepositoryError::ConstraintViolation("unique".to_string()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                QueryError::missing_field("Item", "colour").into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                RepositoryError::ConnectionError("down".to_string()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(error_response(err).status(), status);
        }
    }
}
