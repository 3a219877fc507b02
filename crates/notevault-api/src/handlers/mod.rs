//! Request handlers, grouped by resource.

pub mod accounts;
pub mod assist;
pub mod categories;
pub mod notes;

use crate::ApiError;
use notevault_core::Error;

/// Remap a repository not-found onto the `message` response key.
///
/// Some endpoints historically answer 404 with `{"message": …}` instead of
/// `{"error": …}`; clients depend on the difference.
pub(crate) fn not_found_as_message(err: Error) -> ApiError {
    match err {
        Error::NotFound(msg) => ApiError::NotFoundMessage(msg),
        other => other.into(),
    }
}

/// Remap a repository not-found onto the `detail` response key.
pub(crate) fn not_found_as_detail(err: Error) -> ApiError {
    match err {
        Error::NotFound(msg) => ApiError::NotFoundDetail(msg),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_remaps() {
        let err = not_found_as_message(Error::NotFound("Note not found".into()));
        assert!(matches!(err, ApiError::NotFoundMessage(_)));

        let err = not_found_as_detail(Error::NotFound("Category not found.".into()));
        assert!(matches!(err, ApiError::NotFoundDetail(_)));
    }

    #[test]
    fn test_non_not_found_errors_pass_through() {
        let err = not_found_as_message(Error::Forbidden("nope".into()));
        assert!(matches!(err, ApiError::Forbidden(_)));

        let err = not_found_as_detail(Error::Validation("Title is required".into()));
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
