//! Calendar rule field grammar
//!
//! Each of the five rule fields is a comma-separated list of parts matching
//! `[start] [operator] [stop] ["/" step]` with operators `*`, `-` and `~`.
//! Parsing resolves a part into the set of allowed integers for that field:
//!
//! - a plain integer allows that single value
//! - `*` allows the whole field range, optionally stepped (`*/5`)
//! - `start-stop` allows an inclusive range, optionally stepped
//! - `start~stop` resolves to random values, chosen here at parse time and
//!   fixed afterwards: a single uniform pick, or with a step, a stepped
//!   series from a randomized start point
//!
//! Randomness comes from the caller-supplied RNG, so a pinned seed yields
//! reproducible rules.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use rand::Rng;
use regex::{Captures, Regex};

use crate::error::{Error, Result};

static FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<start>\d{1,2})?(?P<operator>[*~-])?(?P<stop>\d{1,2})?(?:/(?P<step>\d{1,2}))?$")
        .unwrap()
});

// ============================================================================
// Field Bounds
// ============================================================================

/// Name and inclusive bounds of one rule field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name used in error messages
    pub name: &'static str,
    /// Smallest allowed value
    pub min: u32,
    /// Largest allowed value
    pub max: u32,
}

impl FieldSpec {
    /// Create a custom field spec
    pub const fn new(name: &'static str, min: u32, max: u32) -> Self {
        Self { name, min, max }
    }
}

/// Minute of the hour
pub const MINUTE: FieldSpec = FieldSpec::new("minute", 0, 59);
/// Hour of the day
pub const HOUR: FieldSpec = FieldSpec::new("hour", 0, 23);
/// Day of the month
pub const DAY: FieldSpec = FieldSpec::new("day", 1, 31);
/// Month of the year
pub const MONTH: FieldSpec = FieldSpec::new("month", 1, 12);
/// Day of the week, cron convention: 0 and 7 both denote Sunday
pub const WEEKDAY: FieldSpec = FieldSpec::new("weekday", 0, 7);

// ============================================================================
// Field Parsing
// ============================================================================

fn group(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name).and_then(|m| m.as_str().parse().ok())
}

/// Parse one rule field into its set of allowed integers
///
/// Random `~` parts are resolved against `rng` exactly once, here; the
/// returned set never changes afterwards. Fails with
/// [`Error::MalformedRule`] on any grammar violation, an out-of-bounds
/// start or stop, a zero step, or a field whose final set is empty.
pub fn parse_field(field: &str, spec: FieldSpec, rng: &mut impl Rng) -> Result<BTreeSet<u32>> {
    let mut allowed = BTreeSet::new();

    for part in field.split(',') {
        let caps = FIELD_PATTERN
            .captures(part)
            .ok_or_else(|| Error::malformed(spec.name, part))?;

        let start = group(&caps, "start");
        let stop = group(&caps, "stop");
        let step = group(&caps, "step");
        let operator = caps.name("operator").map(|m| m.as_str());

        // explicit values must stay within the field bounds
        let in_bounds = |value: u32| (spec.min..=spec.max).contains(&value);
        if start.is_some_and(|v| !in_bounds(v)) || stop.is_some_and(|v| !in_bounds(v)) {
            return Err(Error::malformed(spec.name, part));
        }
        if step == Some(0) {
            return Err(Error::malformed(spec.name, part));
        }

        match operator {
            None => {
                if stop.is_some() || step.is_some() {
                    return Err(Error::malformed(spec.name, part));
                }
                let value = start.ok_or_else(|| Error::malformed(spec.name, part))?;
                allowed.insert(value);
            }
            Some("*") => {
                let step = step.unwrap_or(1);
                allowed.extend((spec.min..=spec.max).step_by(step as usize));
            }
            Some("-") => {
                let start = start.unwrap_or(spec.min);
                let stop = stop.unwrap_or(spec.max);
                let step = step.unwrap_or(1);
                allowed.extend((start..=stop).step_by(step as usize));
            }
            Some("~") => {
                let start = start.unwrap_or(spec.min);
                let stop = stop.unwrap_or(spec.max);
                if stop < start {
                    return Err(Error::malformed(spec.name, part));
                }
                match step {
                    // a single random value
                    None => {
                        allowed.insert(rng.gen_range(start..=stop));
                    }
                    // a stepped series from a randomized start point
                    Some(step) => {
                        let first = if step > stop - start {
                            rng.gen_range(start..=stop)
                        } else {
                            rng.gen_range(start..=start + step - 1)
                        };
                        allowed.extend((first..=stop).step_by(step as usize));
                    }
                }
            }
            Some(_) => return Err(Error::malformed(spec.name, part)),
        }
    }

    if allowed.is_empty() {
        return Err(Error::malformed(spec.name, field));
    }

    Ok(allowed)
}
