//! Classification of structured helper errors

use deploy_api::ProblemDetails;

use crate::errors::PublishError;

type Constructor = fn(String) -> PublishError;

/// Known validation categories: a marker substring (lowercase) paired
/// with the typed error it maps to. Categories are independent; adding
/// one is a new row here, nothing else.
const VALIDATION_CATEGORIES: &[(&str, Constructor)] = &[
    ("invalid cloud application name", PublishError::InvalidApplicationName),
    ("invalid stack name", PublishError::InvalidStackName),
];

/// Translate a structured helper error into a typed validation failure.
///
/// Returns `None` when the payload is not a recognized validation error;
/// the caller wraps those in a generic deploy fault instead. Total and
/// side-effect free: only 400-class payloads with a non-empty detail
/// are ever considered, and the matched error carries the original
/// detail text as its message.
pub fn try_translate(problem: &ProblemDetails) -> Option<PublishError> {
    if problem.status != 400 {
        return None;
    }

    let detail = problem.detail.trim();
    if detail.is_empty() {
        return None;
    }

    let lowered = detail.to_lowercase();
    VALIDATION_CATEGORIES
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
        .map(|(_, construct)| construct(problem.detail.clone()))
}
