//! Calendar rules
//!
//! A rule is five whitespace-separated fields (minute, hour, day of month,
//! month, day of week), each parsed by [`field::parse_field`] into a set of
//! allowed integers. Examples of valid rules:
//!
//! - `0 0 * * *` - midnight of every day
//! - `*/5 * * * *` - every 5 minutes
//! - `0 9 * * 1-5` - 9:00 of every weekday
//! - `0 0 1 */3 *` - midnight of the first day of every quarter
//! - `0~10 9 * * 1-5` - a random minute just past 9:00 of every weekday
//! - `~/30 * * * *` - twice an hour at random minutes
//!
//! Random values are chosen at parse time and do not change for the
//! lifetime of the rule. The weekday field is parsed against cron
//! convention (0 and 7 both Sunday) and remapped to the chrono convention
//! (Monday = 0) before it is stored, so evaluation needs no special case.

pub mod field;

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use field::{parse_field, FieldSpec};

// ============================================================================
// Parsed Rule
// ============================================================================

/// A parsed calendar rule: five resolved sets of allowed values
///
/// Immutable once constructed; random operators have already been resolved
/// to concrete integers. The weekday set uses Monday = 0 through Sunday = 6.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronRule {
    /// Allowed minutes, within [0, 59]
    pub minute: BTreeSet<u32>,
    /// Allowed hours, within [0, 23]
    pub hour: BTreeSet<u32>,
    /// Allowed days of the month, within [1, 31]
    pub day: BTreeSet<u32>,
    /// Allowed months, within [1, 12]
    pub month: BTreeSet<u32>,
    /// Allowed weekdays, Monday = 0 through Sunday = 6
    pub weekday: BTreeSet<u32>,
}

impl CronRule {
    /// Parse a five-field rule, resolving random operators against `rng`
    pub fn parse(rule: &str, rng: &mut impl Rng) -> Result<Self> {
        parse_rule(rule, rng)
    }

    /// Whether this rule matches the given instant
    pub fn matches<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> bool {
        check_rule(self, at)
    }
}

// ============================================================================
// Rule Parsing & Evaluation
// ============================================================================

/// Parse a five-field calendar rule into a [`CronRule`]
///
/// Fails with [`Error::MalformedRule`] unless the rule has exactly five
/// fields and every field parses within its bounds.
pub fn parse_rule(rule: &str, rng: &mut impl Rng) -> Result<CronRule> {
    let fields: Vec<&str> = rule.split_whitespace().collect();
    let [minute, hour, day, month, weekday] = fields[..] else {
        return Err(Error::malformed("rule", rule));
    };

    Ok(CronRule {
        minute: parse_field(minute, field::MINUTE, rng)?,
        hour: parse_field(hour, field::HOUR, rng)?,
        day: parse_field(day, field::DAY, rng)?,
        month: parse_field(month, field::MONTH, rng)?,
        weekday: remap_weekdays(parse_field(weekday, field::WEEKDAY, rng)?),
    })
}

// Cron numbers Sunday as both 0 and 7; chrono numbers Monday as 0.
fn remap_weekdays(cron_days: BTreeSet<u32>) -> BTreeSet<u32> {
    cron_days
        .into_iter()
        .map(|day| if day == 0 { 6 } else { day - 1 })
        .collect()
}

/// Whether `at` falls inside the rule: all five fields must match
pub fn check_rule<Tz: TimeZone>(rule: &CronRule, at: &DateTime<Tz>) -> bool {
    rule.minute.contains(&at.minute())
        && rule.hour.contains(&at.hour())
        && rule.day.contains(&at.day())
        && rule.month.contains(&at.month())
        && rule.weekday.contains(&at.weekday().num_days_from_monday())
}
