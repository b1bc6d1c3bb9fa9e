//! Shared fixtures for unit and integration tests.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock pinned to an instant that tests may advance.
#[derive(Debug)]
pub struct FixtureClock {
    utc_now: Mutex<DateTime<Utc>>,
}

impl FixtureClock {
    /// Clock reading `utc_now`.
    pub fn new(utc_now: DateTime<Utc>) -> Self {
        Self {
            utc_now: Mutex::new(utc_now),
        }
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.utc_now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.utc_now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Fixed instant used across tests: 2020-05-07 10:30 UTC.
pub fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2020, 5, 7, 10, 30, 0)
        .single()
        .unwrap_or_default()
}

/// A [`FixtureClock`] at [`fixture_timestamp`].
pub fn fixture_clock() -> Arc<FixtureClock> {
    Arc::new(FixtureClock::new(fixture_timestamp()))
}

/// Assemble a token whose payload is `claims_json`.
pub fn token_with_claims(claims_json: &str) -> String {
    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    format!(
        "{}.{}.signature",
        URL_SAFE_NO_PAD.encode(r#"{"alg":"RS256"}"#),
        URL_SAFE_NO_PAD.encode(claims_json)
    )
}
