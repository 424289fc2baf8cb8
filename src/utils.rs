use std::{env, time::Duration};

const DEFAULT_PUT_TIMEOUT: Duration = Duration::from_secs(10);

/// Get the default write timeout, either from environment or default 10 seconds
pub fn get_default_put_timeout() -> Duration {
    parse_put_timeout(env::var("EPICS_DEVICE_PUT_TIMEOUT").ok().as_deref())
}

/// Whether writes wait for completion by default. Off unless the environment says so.
pub fn get_default_put_wait() -> bool {
    parse_put_wait(env::var("EPICS_DEVICE_PUT_WAIT").ok().as_deref())
}

/// Seconds to a timeout. Negative clamps to zero, too large for a Duration saturates.
fn parse_put_timeout(value: Option<&str>) -> Duration {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(|v| Duration::try_from_secs_f64(v.max(0.0)).unwrap_or(Duration::MAX))
        .unwrap_or(DEFAULT_PUT_TIMEOUT)
}

fn parse_put_wait(value: Option<&str>) -> bool {
    let Some(value) = value.map(str::trim) else {
        return false;
    };
    ["yes", "true", "1"]
        .iter()
        .any(|f| value.eq_ignore_ascii_case(f))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{parse_put_timeout, parse_put_wait};

    #[test]
    fn test_parse_put_wait() {
        assert!(parse_put_wait(Some("YES")));
        assert!(parse_put_wait(Some(" true ")));
        assert!(parse_put_wait(Some("1")));
        assert!(!parse_put_wait(Some("no")));
        assert!(!parse_put_wait(Some("")));
        assert!(!parse_put_wait(None));
    }

    #[test]
    fn test_parse_put_timeout() {
        assert_eq!(parse_put_timeout(None), Duration::from_secs(10));
        assert_eq!(parse_put_timeout(Some("0.25")), Duration::from_millis(250));
        assert_eq!(parse_put_timeout(Some("0.1")), Duration::from_millis(100));
        assert_eq!(parse_put_timeout(Some(" 5 ")), Duration::from_secs(5));
        assert_eq!(parse_put_timeout(Some("-3")), Duration::ZERO);
        assert_eq!(parse_put_timeout(Some("abc")), Duration::from_secs(10));
        assert_eq!(parse_put_timeout(Some("inf")), Duration::from_secs(10));
        assert_eq!(parse_put_timeout(Some("NaN")), Duration::from_secs(10));
        assert_eq!(parse_put_timeout(Some("1e30")), Duration::MAX);
    }
}
