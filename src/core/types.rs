use std::collections::HashMap;
use std::time::Duration;

/// Free-form runtime tunables attached to a namespace, replaced wholesale.
pub type ParametersMap = HashMap<String, String>;

/// Parameter key holding the slow-query threshold as a duration string.
pub const PARAM_SLOW_THRESHOLD: &str = "slow.threshold";

/// Threshold used before any configuration arrives.
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_secs(1);

/// Parse a duration string such as "300ms", "1.5s" or "2m30s".
///
/// Accepted units: ns, us, µs, ms, s, m, h. Components may be chained and
/// carry fractions. Bare numbers without a unit are rejected, as are empty
/// or malformed strings.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let mut total = Duration::ZERO;
    let mut rest = s;
    while !rest.is_empty() {
        let num_end = rest.find(|c: char| !c.is_ascii_digit() && c != '.')?;
        if num_end == 0 {
            return None;
        }
        let value: f64 = rest[..num_end].parse().ok()?;

        let unit_end = rest[num_end..]
            .find(|c: char| c.is_ascii_digit())
            .map(|i| num_end + i)
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[num_end..unit_end] {
            "ns" => 1.0,
            "us" | "µs" => 1_000.0,
            "ms" => 1_000_000.0,
            "s" => 1_000_000_000.0,
            "m" => 60.0 * 1_000_000_000.0,
            "h" => 3_600.0 * 1_000_000_000.0,
            _ => return None,
        };

        total += Duration::from_nanos((value * nanos_per_unit) as u64);
        rest = &rest[unit_end..];
    }

    Some(total)
}
