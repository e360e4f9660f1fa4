use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Language used for user-facing labels and date formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en")]
    En,
}

impl Locale {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pt-br" | "pt_br" | "pt" => Some(Locale::PtBr),
            "en" | "en-us" | "en_us" => Some(Locale::En),
            _ => None,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::PtBr => f.write_str("pt-BR"),
            Locale::En => f.write_str("en"),
        }
    }
}

/// Format a timestamp as a short date-time in the locale's convention.
///
/// pt-BR: `15/01/2024, 10:30`; en: `01/15/2024, 10:30 AM`.
pub fn format_timestamp<Tz>(dt: &DateTime<Tz>, locale: Locale) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match locale {
        Locale::PtBr => dt.format("%d/%m/%Y, %H:%M").to_string(),
        Locale::En => dt.format("%m/%d/%Y, %I:%M %p").to_string(),
    }
}

/// Fold a character to its base letter: lowercase, diacritics removed.
///
/// Only the Latin-1 accents used in Portuguese and Spanish names are folded.
/// Other letters (`å`, `ø`, `ł`, ...) are lowercased and then compare by code
/// point, which differs from a full ICU base-strength collation.
fn fold_char(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ç' | 'Ç' => 'c',
        'ñ' | 'Ñ' => 'n',
        _ => c.to_lowercase().next().unwrap_or(c),
    }
}

/// Compare two names at "base" strength: case and accents are ignored,
/// so `"ana"`, `"Ana"` and `"Âna"` compare equal.
pub fn collate(a: &str, b: &str) -> Ordering {
    a.chars().map(fold_char).cmp(b.chars().map(fold_char))
}
