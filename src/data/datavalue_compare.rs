use crate::data::datatable::DataValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use icu::collator::options::{CollatorOptions, Strength};
use icu::collator::{Collator, CollatorBorrowed};
use icu::locale::Locale;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

pub const DEFAULT_LOCALE: &str = "fr";

/// Locale-aware, case-insensitive string ordering.
///
/// Backed by an ICU collator at secondary strength (accents matter, case
/// does not). Falls back to comparing lower-cased text when the locale
/// cannot be loaded.
#[derive(Clone)]
pub struct Collation {
    locale: String,
    collator: Option<Arc<CollatorBorrowed<'static>>>,
}

impl Collation {
    pub fn new(locale: &str) -> Self {
        let collator = match locale.parse::<Locale>() {
            Ok(parsed) => {
                let mut options = CollatorOptions::default();
                options.strength = Some(Strength::Secondary);
                match Collator::try_new(parsed.into(), options) {
                    Ok(collator) => Some(Arc::new(collator)),
                    Err(e) => {
                        warn!(target: "sort", "No collation data for '{}': {}", locale, e);
                        None
                    }
                }
            }
            Err(e) => {
                warn!(target: "sort", "Invalid locale '{}': {}", locale, e);
                None
            }
        };

        Self {
            locale: locale.to_string(),
            collator,
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn compare_str(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.to_lowercase().cmp(&b.to_lowercase()),
        }
    }
}

impl Default for Collation {
    fn default() -> Self {
        Self::new(DEFAULT_LOCALE)
    }
}

impl fmt::Debug for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collation")
            .field("locale", &self.locale)
            .field("icu", &self.collator.is_some())
            .finish()
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Rank of a value kind. Values of different ranks never compare by content.
fn type_rank(value: &DataValue) -> u8 {
    match value {
        DataValue::Integer(_) | DataValue::Float(_) => 0,
        DataValue::Boolean(_) => 1,
        DataValue::DateTime(_) => 2,
        DataValue::String(_) | DataValue::Array(_) => 3,
        DataValue::Null => 4,
    }
}

fn compare_numbers(a: &DataValue, b: &DataValue) -> Ordering {
    match (a, b) {
        (DataValue::Integer(a), DataValue::Integer(b)) => a.cmp(b),
        _ => {
            let (a, b) = (a.as_f64().unwrap_or_default(), b.as_f64().unwrap_or_default());
            a.total_cmp(&b)
        }
    }
}

/// Parsable timestamps first in chronological order, then unparsable text
fn compare_dates(a: &str, b: &str, collation: &Collation) -> Ordering {
    match (parse_timestamp(a), parse_timestamp(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => collation.compare_str(a, b),
    }
}

/// Compare two cell values in ascending order.
///
/// This is a total order. Values are ranked by kind first: numbers, then
/// booleans, dates, text and arrays, and `Null` last. Within a rank numbers
/// compare numerically, booleans false-first, dates chronologically and text
/// through the collation.
pub fn compare_datavalues(a: &DataValue, b: &DataValue, collation: &Collation) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (DataValue::Boolean(a), DataValue::Boolean(b)) => a.cmp(b),
        (DataValue::DateTime(a), DataValue::DateTime(b)) => compare_dates(a, b, collation),
        (DataValue::String(a), DataValue::String(b)) => collation.compare_str(a, b),
        (DataValue::Null, DataValue::Null) => Ordering::Equal,
        (a, b) if a.is_numeric() => compare_numbers(a, b),
        (a, b) => collation.compare_str(&a.to_string(), &b.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> DataValue {
        DataValue::String(v.to_string())
    }

    #[test]
    fn test_integer_comparison() {
        let c = Collation::default();
        assert_eq!(
            compare_datavalues(&DataValue::Integer(1), &DataValue::Integer(2), &c),
            Ordering::Less
        );
        assert_eq!(
            compare_datavalues(&DataValue::Integer(2), &DataValue::Integer(2), &c),
            Ordering::Equal
        );
    }

    #[test]
    fn test_mixed_numeric_comparison() {
        let c = Collation::default();
        assert_eq!(
            compare_datavalues(&DataValue::Integer(10), &DataValue::Float(9.5), &c),
            Ordering::Greater
        );
        // numeric, not lexical
        assert_eq!(
            compare_datavalues(&DataValue::Integer(9), &DataValue::Integer(10), &c),
            Ordering::Less
        );
    }

    #[test]
    fn test_strings_ignore_case() {
        let c = Collation::default();
        assert_eq!(compare_datavalues(&s("alice"), &s("Bob"), &c), Ordering::Less);
        assert_eq!(compare_datavalues(&s("Zoé"), &s("adam"), &c), Ordering::Greater);
        assert_eq!(compare_datavalues(&s("Actif"), &s("actif"), &c), Ordering::Equal);
    }

    #[test]
    fn test_accented_letters_sort_with_base_letter() {
        let c = Collation::default();
        // "é" collates next to "e", not after "z"
        assert_eq!(compare_datavalues(&s("élodie"), &s("zoé"), &c), Ordering::Less);
    }

    #[test]
    fn test_null_comparison() {
        let c = Collation::default();
        assert_eq!(
            compare_datavalues(&DataValue::Null, &DataValue::Integer(1), &c),
            Ordering::Greater
        );
        assert_eq!(
            compare_datavalues(&s("zzz"), &DataValue::Null, &c),
            Ordering::Less
        );
        assert_eq!(
            compare_datavalues(&DataValue::Null, &DataValue::Null, &c),
            Ordering::Equal
        );
    }

    #[test]
    fn test_kinds_are_ranked_before_content() {
        let c = Collation::default();
        // "1a" sorts after every number, not between 2 and 10
        assert_eq!(compare_datavalues(&DataValue::Integer(10), &s("1a"), &c), Ordering::Less);
        assert_eq!(compare_datavalues(&s("1a"), &DataValue::Integer(2), &c), Ordering::Greater);
        assert_eq!(
            compare_datavalues(&DataValue::Boolean(true), &DataValue::Float(99.0), &c),
            Ordering::Greater
        );
        assert_eq!(
            compare_datavalues(
                &DataValue::DateTime("2024-01-01".into()),
                &s("abc"),
                &c
            ),
            Ordering::Less
        );
    }

    #[test]
    fn test_unparsable_dates_after_parsable_ones() {
        let c = Collation::default();
        let valid = DataValue::DateTime("2030-01-01".into());
        let broken = DataValue::DateTime("2024-13-45".into());
        assert_eq!(compare_datavalues(&valid, &broken, &c), Ordering::Less);
        assert_eq!(compare_datavalues(&broken, &valid, &c), Ordering::Greater);
    }

    #[test]
    fn test_nan_floats_compare_consistently() {
        let c = Collation::default();
        let nan = DataValue::Float(f64::NAN);
        let one = DataValue::Float(1.0);
        assert_eq!(
            compare_datavalues(&nan, &one, &c),
            compare_datavalues(&one, &nan, &c).reverse()
        );
        assert_ne!(compare_datavalues(&nan, &one, &c), Ordering::Equal);
    }

    #[test]
    fn test_mixed_kinds_sort_without_panicking() {
        let c = Collation::default();
        let mut values: Vec<DataValue> = (0..300)
            .map(|i| match i % 6 {
                0 => DataValue::Integer(i),
                1 => s(&format!("{}a", i)),
                2 => DataValue::Float(i as f64 / 3.0),
                3 => DataValue::DateTime(if i % 4 == 1 { "bad".into() } else { "2024-05-01".into() }),
                4 => DataValue::Boolean(i % 4 == 0),
                _ => DataValue::Array(vec![s("x"), DataValue::Integer(i)]),
            })
            .collect();
        values.sort_by(|a, b| compare_datavalues(a, b, &c));

        let ranks: Vec<u8> = values.iter().map(type_rank).collect();
        assert!(ranks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_dates_compare_chronologically() {
        let c = Collation::default();
        assert_eq!(
            compare_datavalues(
                &DataValue::DateTime("2024-02-01".into()),
                &DataValue::DateTime("2024-01-31T23:00:00Z".into()),
                &c
            ),
            Ordering::Greater
        );
    }

    #[test]
    fn test_invalid_locale_falls_back() {
        let c = Collation::new("not a locale!!");
        assert_eq!(c.compare_str("abc", "ABD"), Ordering::Less);
        assert_eq!(c.locale(), "not a locale!!");
    }
}
