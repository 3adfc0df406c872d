//! Token freshness decision.
//!
//! A token is served as-is only while its claimed remaining lifetime is strictly
//! longer than the anticipation window. Unknown expiry always means refresh.

pub mod claims;

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use crate::helpers::time::{from_epoch_seconds, now};

pub use claims::{strip_scheme, Claims};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// keep using the current token
    Fresh,
    /// fetch a new token
    Stale,
}

/// Decide at wall-clock time.
pub fn evaluate(current_token: &str, anticipation_window: Duration) -> Freshness {
    evaluate_at(current_token, anticipation_window, now())
}

pub fn evaluate_at(
    current_token: &str,
    anticipation_window: Duration,
    now: DateTime<Utc>,
) -> Freshness {
    let claims = Claims::parse(strip_scheme(current_token));
    decide(claims, anticipation_window, now)
}

pub fn decide(claims: Claims, anticipation_window: Duration, now: DateTime<Utc>) -> Freshness {
    let Some(expire_at) = claims.expire_at().and_then(from_epoch_seconds) else {
        debug!(?claims, "token expiry unknown, refreshing");
        return Freshness::Stale;
    };

    let remaining = expire_at.signed_duration_since(now);
    let window = TimeDelta::from_std(anticipation_window).unwrap_or(TimeDelta::MAX);
    debug!(
        expire_at = %expire_at,
        remaining_ms = remaining.num_milliseconds(),
        window_ms = window.num_milliseconds(),
        "token expiry evaluated"
    );

    if remaining > window {
        Freshness::Fresh
    } else {
        Freshness::Stale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine};

    fn sample_jwt(exp: i64) -> String {
        let header = STANDARD_NO_PAD.encode(r#"{"alg":"none"}"#);
        let payload = STANDARD_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp));
        format!("{}.{}.", header, payload)
    }

    fn at(epoch_seconds: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(epoch_seconds, 0).unwrap()
    }

    const NOW: i64 = 1_750_000_000;

    #[test]
    fn token_outliving_window_is_fresh() {
        let token = sample_jwt(NOW + 60);
        assert_eq!(evaluate_at(&token, Duration::ZERO, at(NOW)), Freshness::Fresh);
        assert_eq!(evaluate_at(&token, Duration::from_secs(59), at(NOW)), Freshness::Fresh);
    }

    #[test]
    fn token_expiring_within_window_is_stale() {
        let token = sample_jwt(NOW + 60);
        assert_eq!(evaluate_at(&token, Duration::from_secs(61), at(NOW)), Freshness::Stale);
    }

    #[test]
    fn remaining_lifetime_equal_to_window_is_stale() {
        let token = sample_jwt(NOW + 60);
        assert_eq!(evaluate_at(&token, Duration::from_secs(60), at(NOW)), Freshness::Stale);
        assert_eq!(evaluate_at(&token, Duration::from_millis(59_999), at(NOW)), Freshness::Fresh);
    }

    #[test]
    fn expired_token_is_stale() {
        assert_eq!(evaluate_at(&sample_jwt(NOW - 1), Duration::ZERO, at(NOW)), Freshness::Stale);
        assert_eq!(evaluate_at(&sample_jwt(NOW), Duration::ZERO, at(NOW)), Freshness::Stale);
    }

    #[test]
    fn scheme_label_is_ignored() {
        let token = format!("bearer {}", sample_jwt(NOW + 3600));
        assert_eq!(evaluate_at(&token, Duration::from_secs(10), at(NOW)), Freshness::Fresh);
    }

    #[test]
    fn unknown_expiry_is_stale() {
        assert_eq!(evaluate_at("opaque", Duration::ZERO, at(NOW)), Freshness::Stale);
        assert_eq!(evaluate_at("bearer x.y.z", Duration::ZERO, at(NOW)), Freshness::Stale);
        assert_eq!(decide(Claims::Absent, Duration::ZERO, at(NOW)), Freshness::Stale);
    }

    #[test]
    fn unrepresentable_expiry_is_stale() {
        assert_eq!(decide(Claims::Present(i64::MAX), Duration::ZERO, at(NOW)), Freshness::Stale);
    }

    #[test]
    fn zero_epoch_is_stale() {
        assert_eq!(decide(Claims::Present(0), Duration::ZERO, at(NOW)), Freshness::Stale);
    }

    #[test]
    fn wall_clock_wrapper_agrees() {
        let far_future = Utc::now().timestamp() + 3600;
        assert_eq!(evaluate(&sample_jwt(far_future), Duration::from_secs(60)), Freshness::Fresh);
        assert_eq!(evaluate(&sample_jwt(far_future), Duration::from_secs(7200)), Freshness::Stale);
    }
}
