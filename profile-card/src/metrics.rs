// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Metric values rendered onto the profile card.
//!
//! The [`MetricsBundle`] is computed once per run and shared by both themes.
//! It expands into an ordered list of [`FieldDescriptor`] values whose
//! identifiers and column widths match the card template.

use std::fmt;

use chrono::{Months, NaiveDate};
use tracing::warn;

/// Birthday used when none is configured.
pub const DEFAULT_BIRTHDAY: &str = "2001-08-24";

const BIRTHDAY_SUFFIX: &str = " 🎂";

/// Scalar value written into a card element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricValue {
    /// Non-negative integer rendered with thousands separators.
    Count(u64),
    /// Free-form text rendered verbatim.
    Text(String)
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(value) => f.write_str(&group_thousands(*value)),
            Self::Text(value) => f.write_str(value)
        }
    }
}

impl From<u64> for MetricValue {
    fn from(value: u64) -> Self {
        Self::Count(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for MetricValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Identifier, value and target column width for one patched element.
///
/// A width of zero always yields an empty dot leader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Identifier of the value element.
    pub id:    &'static str,
    /// Value to render.
    pub value: MetricValue,
    /// Column width the value plus its leader should fill.
    pub width: usize
}

impl FieldDescriptor {
    /// Creates a descriptor.
    pub fn new(id: &'static str, value: impl Into<MetricValue>, width: usize) -> Self {
        Self {
            id,
            value: value.into(),
            width
        }
    }
}

/// Metrics shared by every theme variant in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsBundle {
    /// Human readable age, empty when the birthday could not be used.
    pub age:           String,
    /// Follower count.
    pub followers:     u64,
    /// Commit count.
    pub commits:       u64,
    /// Star count.
    pub stars:         u64,
    /// Repository count.
    pub repositories:  u64,
    /// Contributed repository count.
    pub contributions: u64,
    /// Lines added.
    pub lines_added:   u64,
    /// Lines deleted.
    pub lines_deleted: u64
}

impl MetricsBundle {
    /// Net lines of code, saturating at zero.
    pub fn net_lines(&self) -> u64 {
        self.lines_added.saturating_sub(self.lines_deleted)
    }

    /// Expands the bundle into the nine tracked fields in patch order.
    ///
    /// # Example
    ///
    /// ```
    /// use profile_card::MetricsBundle;
    ///
    /// let bundle = MetricsBundle {
    ///     followers: 250,
    ///     ..MetricsBundle::default()
    /// };
    /// let fields = bundle.descriptors();
    /// assert_eq!(fields.len(), 9);
    /// assert_eq!(fields[1].id, "follower_data");
    /// assert_eq!(fields[1].width, 10);
    /// ```
    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("age_data", self.age.as_str(), 22),
            FieldDescriptor::new("follower_data", self.followers, 10),
            FieldDescriptor::new("commit_data", self.commits, 22),
            FieldDescriptor::new("star_data", self.stars, 14),
            FieldDescriptor::new("repo_data", self.repositories, 6),
            FieldDescriptor::new("contrib_data", self.contributions, 0),
            FieldDescriptor::new("loc_data", self.net_lines(), 9),
            FieldDescriptor::new("loc_add", self.lines_added, 0),
            FieldDescriptor::new("loc_del", self.lines_deleted, 7),
        ]
    }
}

/// Formats an integer with `,` thousands separators.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Calendar distance between a birthday and a later date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgeSpan {
    /// Whole years.
    pub years:  u32,
    /// Whole months after the last full year.
    pub months: u32,
    /// Days after the last full month.
    pub days:   u32
}

impl AgeSpan {
    /// Computes the span from `birthday` to `today`.
    ///
    /// Whole months are counted first, clamping to the end of shorter months,
    /// then the remaining days. Returns `None` when `birthday` is after
    /// `today`.
    pub fn between(birthday: NaiveDate, today: NaiveDate) -> Option<Self> {
        if birthday > today {
            return None;
        }

        let mut months = month_distance(birthday, today);
        let mut anchor = birthday.checked_add_months(Months::new(months))?;
        if anchor > today {
            months = months.checked_sub(1)?;
            anchor = birthday.checked_add_months(Months::new(months))?;
        }
        let days = u32::try_from((today - anchor).num_days()).ok()?;

        Some(Self {
            years: months / 12,
            months: months % 12,
            days
        })
    }
}

impl fmt::Display for AgeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}, {} {}, {} {}",
            self.years,
            plural("year", self.years),
            self.months,
            plural("month", self.months),
            self.days,
            plural("day", self.days)
        )?;
        if self.months == 0 && self.days == 0 {
            f.write_str(BIRTHDAY_SUFFIX)?;
        }
        Ok(())
    }
}

/// Parses a `YYYY-MM-DD` birthday.
///
/// Components are split on `-` and may carry surrounding whitespace.
pub fn parse_birthday(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.trim().split('-').map(str::trim);
    let year = parts.next()?.parse::<i32>().ok()?;
    let month = parts.next()?.parse::<u32>().ok()?;
    let day = parts.next()?.parse::<u32>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Renders the age text for the card.
///
/// Unparseable or future birthdays degrade to an empty string.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use profile_card::format_age;
///
/// let today = NaiveDate::from_ymd_opt(2025, 10, 27).expect("valid date");
/// assert_eq!(format_age("2001-08-24", today), "24 years, 2 months, 3 days");
/// assert_eq!(format_age("not a date", today), "");
/// ```
pub fn format_age(birthday: &str, today: NaiveDate) -> String {
    let Some(date) = parse_birthday(birthday) else {
        warn!(birthday, "birthday is not a valid YYYY-MM-DD date, leaving age empty");
        return String::new();
    };
    match AgeSpan::between(date, today) {
        Some(span) => span.to_string(),
        None => {
            warn!(birthday, "birthday lies in the future, leaving age empty");
            String::new()
        }
    }
}

fn month_distance(from: NaiveDate, to: NaiveDate) -> u32 {
    use chrono::Datelike;

    let months = (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32;
    u32::try_from(months).unwrap_or(0)
}

fn plural(unit: &str, count: u32) -> String {
    if count == 1 { unit.to_owned() } else { format!("{unit}s") }
}
