//! Date and time normalization
//!
//! Ledger and log cells hold dates and times either as native values or as
//! text written by some earlier version of the tooling (`Mon Oct 19 2026`,
//! `10/19/2026`, `3:45:12 PM`, ...). Every conversion from a cell to a date
//! or timestamp goes through this module.
//!
//! # Fallback order
//!
//! A timestamp is the date text and time text joined by one space, parsed
//! against the configured locale first, then ISO, en-US, fr-FR and finally
//! the JavaScript `toDateString()` layout. The first pattern that matches
//! wins; when none does the result is `None`.
//!
//! For each attempt, every date or time component is turned into text:
//! 1. native temporal cell: formatted in the locale being tried
//! 2. text cell: used as is, with narrow and non-breaking spaces folded to
//!    plain spaces
//! 3. anything else: no component

use crate::io::table::CellValue;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// `Date.prototype.toDateString()` layout, as found in older ledgers
const LEGACY_DATE_PATTERN: &str = "%a %b %d %Y";

/// Locale used to format and parse date and time text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Locale {
    /// `10/19/2026` and `3:45:12 PM`
    #[default]
    EnUs,
    /// `19/10/2026` and `15:45:12`
    FrFr,
    /// `2026-10-19` and `15:45:12`
    Iso,
}

impl Locale {
    const ALL: [Locale; 3] = [Locale::Iso, Locale::EnUs, Locale::FrFr];

    fn date_format(self) -> &'static str {
        match self {
            Locale::EnUs => "%-m/%-d/%Y",
            Locale::FrFr => "%d/%m/%Y",
            Locale::Iso => "%Y-%m-%d",
        }
    }

    fn time_format(self) -> &'static str {
        match self {
            Locale::EnUs => "%-I:%M:%S %p",
            Locale::FrFr | Locale::Iso => "%H:%M:%S",
        }
    }

    fn date_pattern(self) -> &'static str {
        match self {
            Locale::EnUs => "%m/%d/%Y",
            Locale::FrFr => "%d/%m/%Y",
            Locale::Iso => "%Y-%m-%d",
        }
    }

    fn time_pattern(self) -> &'static str {
        match self {
            Locale::EnUs => "%I:%M:%S %p",
            Locale::FrFr | Locale::Iso => "%H:%M:%S",
        }
    }

    /// Date text as the transaction log stores it
    pub fn format_date(self, date: NaiveDate) -> String {
        date.format(self.date_format()).to_string()
    }

    /// Time text as the transaction log stores it
    pub fn format_time(self, time: NaiveTime) -> String {
        time.format(self.time_format()).to_string()
    }

    /// This locale followed by the others in fallback order
    fn fallback_chain(self) -> impl Iterator<Item = Locale> {
        std::iter::once(self).chain(Self::ALL.into_iter().filter(move |l| *l != self))
    }
}

/// Fold the space variants locale formatters emit into ASCII spaces
pub fn normalize_text(text: &str) -> String {
    text.replace(['\u{202f}', '\u{a0}'], " ").trim().to_string()
}

fn cell_text(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) => Some(normalize_text(s)).filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Date component of a cell as text
pub fn date_text(cell: &CellValue, locale: Locale) -> Option<String> {
    match cell {
        CellValue::Date(d) => Some(locale.format_date(*d)),
        CellValue::DateTime(ts) => Some(locale.format_date(ts.date())),
        _ => cell_text(cell),
    }
}

/// Time component of a cell as text
pub fn time_text(cell: &CellValue, locale: Locale) -> Option<String> {
    match cell {
        CellValue::Time(t) => Some(locale.format_time(*t)),
        CellValue::DateTime(ts) => Some(locale.format_time(ts.time())),
        _ => cell_text(cell),
    }
}

/// Rebuild a timestamp from separately stored date and time cells
///
/// Returns `None` when either component is missing or the combination does
/// not parse under any known layout.
pub fn reconstruct_timestamp(
    date: &CellValue,
    time: &CellValue,
    locale: Locale,
) -> Option<NaiveDateTime> {
    let attempt = |date_locale: Locale, date_pattern: &str, time_locale: Locale| {
        let combined = format!(
            "{} {}",
            date_text(date, date_locale)?,
            time_text(time, time_locale)?
        );
        let pattern = format!("{} {}", date_pattern, time_locale.time_pattern());
        NaiveDateTime::parse_from_str(&combined, &pattern).ok()
    };

    locale
        .fallback_chain()
        .find_map(|l| attempt(l, l.date_pattern(), l))
        .or_else(|| {
            [Locale::FrFr, Locale::EnUs]
                .into_iter()
                .find_map(|l| attempt(locale, LEGACY_DATE_PATTERN, l))
        })
}

/// Read a cell as a calendar date
///
/// Native dates and timestamps are used directly; text is tried against the
/// configured locale, the other locales and the legacy layout.
pub fn parse_calendar_date(cell: &CellValue, locale: Locale) -> Option<NaiveDate> {
    match cell {
        CellValue::Date(d) => Some(*d),
        CellValue::DateTime(ts) => Some(ts.date()),
        _ => {
            let text = cell_text(cell)?;
            locale
                .fallback_chain()
                .map(Locale::date_pattern)
                .chain(std::iter::once(LEGACY_DATE_PATTERN))
                .find_map(|pattern| NaiveDate::parse_from_str(&text, pattern).ok())
        }
    }
}
