//! User-facing texts for failed sync operations.
//!
//! Each operation maps its error's status code to one German message. A 404
//! names the missing record, 400 on save and update shows the server's
//! validation body verbatim, 429 and 504 have fixed texts and everything else
//! is reported as an unknown error.

use tracing::error;

use crate::domain::{Buch, FindError, Kunde, RemoveError, SaveError, SyncCause, UpdateError};

/// Rate limit hit.
pub const TOO_MANY_REQUESTS: &str = "Zu viele Anfragen. Bitte versuchen Sie es später noch einmal.";
/// Gateway timeout in front of the appserver.
pub const INTERNAL_ERROR: &str = "Ein interner Fehler ist aufgetreten.";
/// Fallback for every other status.
pub const UNKNOWN_ERROR: &str = "Ein unbekannter Fehler ist aufgetreten.";
/// Shown instead of sending a mutating request without the admin role.
pub const ADMIN_REQUIRED: &str =
    "Keine Berechtigung: Diese Aktion ist nur für Administratoren möglich.";

const BAD_REQUEST: i32 = 400;
const NOT_FOUND: i32 = 404;
const TOO_MANY: i32 = 429;
const GATEWAY_TIMEOUT: i32 = 504;

/// Texts naming missing records of one entity type.
pub trait NotFoundText {
    /// A search returned no hits.
    const NONE_FOUND: &'static str;
    /// A single record does not exist.
    const NOT_FOUND: &'static str;
}

impl NotFoundText for Buch {
    const NONE_FOUND: &'static str = "Keine Bücher gefunden.";
    const NOT_FOUND: &'static str = "Kein Buch gefunden.";
}

impl NotFoundText for Kunde {
    const NONE_FOUND: &'static str = "Keine Kunden gefunden.";
    const NOT_FOUND: &'static str = "Kein Kunde gefunden.";
}

/// Message for a failed search.
pub fn find_failure<E: NotFoundText>(err: &FindError) -> String {
    match err.statuscode {
        NOT_FOUND => E::NONE_FOUND.to_owned(),
        code => common(code).to_owned(),
    }
}

/// Message for a failed lookup by id.
pub fn lookup_failure<E: NotFoundText>(err: &FindError) -> String {
    match err.statuscode {
        NOT_FOUND => E::NOT_FOUND.to_owned(),
        code => common(code).to_owned(),
    }
}

/// Message for a failed create.
pub fn save_failure(err: &SaveError) -> String {
    match err.statuscode {
        BAD_REQUEST => validation_text(err.cause.as_ref()),
        code => common(code).to_owned(),
    }
}

/// Message for a failed update.
pub fn update_failure<E: NotFoundText>(err: &UpdateError) -> String {
    match err.statuscode {
        BAD_REQUEST => validation_text(err.cause.as_ref()),
        NOT_FOUND => E::NOT_FOUND.to_owned(),
        code => common(code).to_owned(),
    }
}

/// Message for a failed delete.
pub fn remove_failure<E: NotFoundText>(err: &RemoveError) -> String {
    match err.statuscode {
        NOT_FOUND => E::NOT_FOUND.to_owned(),
        code => common(code).to_owned(),
    }
}

fn common(statuscode: i32) -> &'static str {
    match statuscode {
        TOO_MANY => TOO_MANY_REQUESTS,
        GATEWAY_TIMEOUT => {
            error!("gateway timeout: is the appserver running?");
            INTERNAL_ERROR
        }
        _ => UNKNOWN_ERROR,
    }
}

fn validation_text(cause: Option<&SyncCause>) -> String {
    match cause {
        Some(SyncCause::Response { body, .. }) => body.clone(),
        Some(other) => other.to_string(),
        None => UNKNOWN_ERROR.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sync::NETWORK_FAILURE;
    use rstest::rstest;

    fn response(status_text: &str, body: &str) -> Option<SyncCause> {
        Some(SyncCause::Response {
            status_text: status_text.to_owned(),
            body: body.to_owned(),
        })
    }

    #[rstest]
    #[case(404, "Keine Bücher gefunden.")]
    #[case(429, TOO_MANY_REQUESTS)]
    #[case(504, INTERNAL_ERROR)]
    #[case(500, UNKNOWN_ERROR)]
    #[case(NETWORK_FAILURE, UNKNOWN_ERROR)]
    fn search_failures_for_buecher(#[case] statuscode: i32, #[case] expected: &str) {
        let err = FindError::new(statuscode, None);
        assert_eq!(find_failure::<Buch>(&err), expected);
    }

    #[rstest]
    #[case::search(find_failure::<Kunde>(&FindError::new(404, None)), "Keine Kunden gefunden.")]
    #[case::lookup(lookup_failure::<Kunde>(&FindError::new(404, None)), "Kein Kunde gefunden.")]
    #[case::lookup_buch(lookup_failure::<Buch>(&FindError::new(404, None)), "Kein Buch gefunden.")]
    #[case::update(update_failure::<Buch>(&UpdateError::new(404, None)), "Kein Buch gefunden.")]
    #[case::remove(remove_failure::<Kunde>(&RemoveError::new(404, None)), "Kein Kunde gefunden.")]
    fn not_found_names_the_entity(#[case] message: String, #[case] expected: &str) {
        assert_eq!(message, expected);
    }

    #[rstest]
    fn bad_request_on_save_shows_the_body_verbatim() {
        let err = SaveError::new(400, response("Bad Request", r#"{"field":"titel"}"#));
        assert_eq!(save_failure(&err), r#"{"field":"titel"}"#);
    }

    #[rstest]
    fn bad_request_on_update_shows_the_body_verbatim() {
        let err = UpdateError::new(400, response("Bad Request", "nachname: zu kurz"));
        assert_eq!(update_failure::<Kunde>(&err), "nachname: zu kurz");
    }

    #[rstest]
    fn bad_request_without_response_shows_the_cause() {
        let err = SaveError::new(400, Some(SyncCause::Message("ungueltig".to_owned())));
        assert_eq!(save_failure(&err), "ungueltig");
    }

    #[rstest]
    #[case(412)]
    #[case(403)]
    #[case(NETWORK_FAILURE)]
    fn other_update_failures_are_unknown(#[case] statuscode: i32) {
        let err = UpdateError::new(statuscode, None);
        assert_eq!(update_failure::<Buch>(&err), UNKNOWN_ERROR);
    }

    #[rstest]
    fn bad_request_on_remove_is_unknown() {
        let err = RemoveError::new(400, response("Bad Request", "body"));
        assert_eq!(remove_failure::<Buch>(&err), UNKNOWN_ERROR);
    }
}
