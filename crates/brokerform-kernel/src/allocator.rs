//! Deterministic identifier allocation.
//!
//! Names and ports are allocated per role: acceptors and connectors draw from
//! independent pools, so callers pass only the set belonging to one role.

use std::collections::BTreeSet;

/// First port handed out when a role has no endpoints yet.
pub const PORT_BASE: u32 = 5555;

/// Returns `prefix + i` for the smallest `i >= 0` not present in `existing`.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use brokerform_kernel::allocator::unique_name;
///
/// let taken = BTreeSet::from(["acceptors0", "acceptors2"]);
/// assert_eq!(unique_name("acceptors", &taken), "acceptors1");
/// ```
pub fn unique_name(prefix: &str, existing: &BTreeSet<&str>) -> String {
    let mut counter = 0u64;
    loop {
        let candidate = format!("{prefix}{counter}");
        if !existing.contains(candidate.as_str()) {
            return candidate;
        }
        counter += 1;
    }
}

/// Returns the port for the next endpoint of a role.
///
/// The next port is one past the current maximum, not the lowest free port.
/// A manually raised port therefore shifts every later allocation upward.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use brokerform_kernel::allocator::{PORT_BASE, next_port};
///
/// assert_eq!(next_port(&BTreeSet::new()), PORT_BASE);
/// assert_eq!(next_port(&BTreeSet::from([5555, 5557])), 5558);
/// ```
pub fn next_port(existing: &BTreeSet<u32>) -> u32 {
    existing
        .last()
        .map_or(PORT_BASE, |max| max.saturating_add(1))
}

/// Returns true if `name` can be used as an endpoint name.
///
/// Names become a segment of `rawProperties` keys, so they must be non-empty
/// and free of key (`.`) and value (`=`) separators.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['.', '=']) && !name.chars().any(char::is_whitespace)
}

/// The uniqueness predicate the engine applies on rename.
///
/// Presentation code uses the same check to explain a rejected rename.
pub fn is_name_available(name: &str, existing: &BTreeSet<&str>) -> bool {
    is_valid_name(name) && !existing.contains(name)
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn unique_name_starts_at_zero() {
        assert_eq!(unique_name("acceptors", &BTreeSet::new()), "acceptors0");
    }

    #[test]
    fn unique_name_fills_the_lowest_gap() {
        let taken = BTreeSet::from(["c0", "c1", "c3"]);
        assert_eq!(unique_name("c", &taken), "c2");
    }

    #[test]
    fn unique_name_ignores_other_prefixes() {
        let taken = BTreeSet::from(["connectors0", "connectors1"]);
        assert_eq!(unique_name("acceptors", &taken), "acceptors0");
    }

    #[test]
    fn next_port_follows_the_maximum() {
        assert_eq!(next_port(&BTreeSet::from([5555])), 5556);
        assert_eq!(next_port(&BTreeSet::from([5555, 9000, 5556])), 9001);
    }

    #[test]
    fn next_port_below_base_still_follows_maximum() {
        assert_eq!(next_port(&BTreeSet::from([80])), 81);
    }

    #[test]
    fn next_port_saturates() {
        assert_eq!(next_port(&BTreeSet::from([u32::MAX])), u32::MAX);
    }

    #[test_case("acceptors0" => true; "plain")]
    #[test_case("amqp-tls" => true; "dashed")]
    #[test_case("" => false; "empty")]
    #[test_case("a.b" => false; "dotted")]
    #[test_case("a=b" => false; "equals")]
    #[test_case("a b" => false; "spaced")]
    fn name_validity(name: &str) -> bool {
        is_valid_name(name)
    }

    #[test]
    fn taken_names_are_unavailable() {
        let taken = BTreeSet::from(["amqp"]);
        assert!(!is_name_available("amqp", &taken));
        assert!(is_name_available("mqtt", &taken));
    }
}
