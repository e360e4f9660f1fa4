//! Elapsed-time ("SLA") bucketing for pull requests.
//!
//! Two independent scales are derived from the same interval: a
//! human-readable bucket (`3 dias`) and a coarse [`Severity`] tier. They use
//! different hour boundaries (the hours bucket ends after 23h, the fresh
//! tier after 24h) and both are kept exactly as observed by users.

use chrono::{DateTime, Utc};

use super::locale::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
    Months,
}

impl SlaUnit {
    /// Localized label, singular only when `value == 1`.
    pub fn label(&self, value: u64, locale: Locale) -> &'static str {
        let (singular, plural) = match (locale, self) {
            (Locale::PtBr, SlaUnit::Seconds) => ("segundo", "segundos"),
            (Locale::PtBr, SlaUnit::Minutes) => ("minuto", "minutos"),
            (Locale::PtBr, SlaUnit::Hours) => ("hora", "horas"),
            (Locale::PtBr, SlaUnit::Days) => ("dia", "dias"),
            (Locale::PtBr, SlaUnit::Weeks) => ("semana", "semanas"),
            (Locale::PtBr, SlaUnit::Months) => ("mês", "meses"),
            (Locale::En, SlaUnit::Seconds) => ("second", "seconds"),
            (Locale::En, SlaUnit::Minutes) => ("minute", "minutes"),
            (Locale::En, SlaUnit::Hours) => ("hour", "hours"),
            (Locale::En, SlaUnit::Days) => ("day", "days"),
            (Locale::En, SlaUnit::Weeks) => ("week", "weeks"),
            (Locale::En, SlaUnit::Months) => ("month", "months"),
        };
        if value == 1 {
            singular
        } else {
            plural
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SlaUnit::Seconds => "⚡",
            SlaUnit::Minutes => "◷",
            SlaUnit::Hours => "⏱",
            SlaUnit::Days => "▦",
            SlaUnit::Weeks => "▤",
            SlaUnit::Months => "▣",
        }
    }
}

/// Elapsed time in its largest fitting unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sla {
    pub value: u64,
    pub unit: SlaUnit,
}

impl Sla {
    pub fn label(&self, locale: Locale) -> String {
        format!("{} {}", self.value, self.unit.label(self.value, locale))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Fresh,
    Moderate,
    Old,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Fresh => "fresh",
            Severity::Moderate => "moderate",
            Severity::Old => "old",
            Severity::Critical => "critical",
        }
    }
}

/// Milliseconds from `creation` to `closed` (or `now` when still open),
/// clamped at zero for clock skew.
fn elapsed_millis(creation: DateTime<Utc>, closed: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u64 {
    let end = closed.unwrap_or(now);
    (end - creation).num_milliseconds().max(0) as u64
}

/// Bucket the interval into seconds, minutes, hours, days, weeks or months.
///
/// Each unit is floored from the one below it; the first bucket whose
/// value fits wins. Months are 30-day blocks.
pub fn calculate_sla(
    creation: DateTime<Utc>,
    closed: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Sla {
    let seconds = elapsed_millis(creation, closed, now) / 1000;
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let weeks = days / 7;
    let months = days / 30;

    let (value, unit) = if seconds <= 59 {
        (seconds, SlaUnit::Seconds)
    } else if minutes <= 59 {
        (minutes, SlaUnit::Minutes)
    } else if hours <= 23 {
        (hours, SlaUnit::Hours)
    } else if days <= 6 {
        (days, SlaUnit::Days)
    } else if weeks <= 4 {
        (weeks, SlaUnit::Weeks)
    } else {
        (months, SlaUnit::Months)
    };

    Sla { value, unit }
}

/// Severity tier from whole elapsed hours: ≤24 fresh, ≤72 moderate,
/// ≤168 old, beyond that critical.
pub fn severity(
    creation: DateTime<Utc>,
    closed: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Severity {
    let hours = elapsed_millis(creation, closed, now) / (1000 * 60 * 60);

    if hours <= 24 {
        Severity::Fresh
    } else if hours <= 72 {
        Severity::Moderate
    } else if hours <= 168 {
        Severity::Old
    } else {
        Severity::Critical
    }
}
