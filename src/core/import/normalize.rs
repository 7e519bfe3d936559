//! Per-field normalization of raw patient input
//!
//! Every function here is pure and total: malformed input never fails, it
//! falls back to the documented default. The batch loop only fails a row
//! for reasons outside these rules (unreadable row, exhausted sequence,
//! rejected insert).

use crate::domain::ids::PatientId;
use chrono::{Datelike, NaiveDate};

/// Marker spreadsheet exports use for "no value"
pub const PLACEHOLDER: &str = "#";

/// Token whose presence marks a row as male
pub const MALE_TOKEN: &str = "nam";

/// Trimmed value, or `None` when empty or the placeholder
fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty() && *s != PLACEHOLDER)
}

/// Keeps a supplied id only when it is exactly 12 ASCII digits
///
/// `None` means the caller has to synthesize one.
pub fn normalize_id(raw: Option<&str>) -> Option<PatientId> {
    present(raw).and_then(|s| PatientId::new(s).ok())
}

/// Trimmed name, or `placeholder` when empty
pub fn normalize_name(raw: Option<&str>, placeholder: &str) -> String {
    present(raw).unwrap_or(placeholder).to_string()
}

/// 1 when the text contains "nam" in any case, otherwise 0
pub fn normalize_sex(raw: Option<&str>) -> u8 {
    match present(raw) {
        Some(s) if s.to_lowercase().contains(MALE_TOKEN) => 1,
        _ => 0,
    }
}

/// Four ASCII digits, or the year of `today`
pub fn normalize_birth_year(raw: Option<&str>, today: NaiveDate) -> String {
    match present(raw) {
        Some(s) if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) => s.to_string(),
        _ => format!("{:04}", today.year()),
    }
}

/// Parses `D/M/YYYY` or `YYYY-MM-DD`, falling back to `today`
///
/// Anything containing `#`, empty input, a slash form without exactly three
/// numeric parts and a four-digit year, or a string that is not a real
/// calendar date all yield `today`.
pub fn normalize_arrival_date(raw: Option<&str>, today: NaiveDate) -> NaiveDate {
    let Some(input) = raw.map(str::trim) else {
        return today;
    };
    if input.is_empty() || input.contains(PLACEHOLDER) {
        return today;
    }

    let candidate = if input.contains('/') {
        match slash_to_iso(input) {
            Some(iso) => iso,
            None => return today,
        }
    } else {
        input.to_string()
    };

    if !is_iso_shape(&candidate) {
        return today;
    }

    NaiveDate::parse_from_str(&candidate, "%Y-%m-%d").unwrap_or(today)
}

/// `D/M/YYYY` to `YYYY-MM-DD` text, without calendar validation
fn slash_to_iso(input: &str) -> Option<String> {
    let parts: Vec<&str> = input.split('/').collect();
    let &[day, month, year] = parts.as_slice() else {
        return None;
    };

    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !numeric(day) || !numeric(month) || !numeric(year) || year.len() != 4 {
        return None;
    }

    Some(format!("{year}-{month:0>2}-{day:0>2}"))
}

/// `NNNN-NN-NN` with ASCII digits
fn is_iso_shape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Trimmed text, or `None` when empty or the placeholder
pub fn normalize_optional_text(raw: Option<&str>) -> Option<String> {
    present(raw).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        day(2025, 1, 10)
    }

    #[test]
    fn test_id_kept_when_twelve_digits() {
        let id = normalize_id(Some(" 010124000123 ")).unwrap();
        assert_eq!(id.as_str(), "010124000123");
    }

    #[test]
    fn test_id_rejected_otherwise() {
        assert!(normalize_id(Some("abc")).is_none());
        assert!(normalize_id(Some("1001250000")).is_none());
        assert!(normalize_id(Some("#")).is_none());
        assert!(normalize_id(None).is_none());
    }

    #[test]
    fn test_name_placeholder() {
        assert_eq!(normalize_name(Some("  Lê Văn C "), "Không tên"), "Lê Văn C");
        assert_eq!(normalize_name(Some("   "), "Không tên"), "Không tên");
        assert_eq!(normalize_name(Some("#"), "Không tên"), "Không tên");
        assert_eq!(normalize_name(None, "X"), "X");
    }

    #[test]
    fn test_sex_matches_male_token() {
        assert_eq!(normalize_sex(Some("Nam")), 1);
        assert_eq!(normalize_sex(Some("NAM")), 1);
        assert_eq!(normalize_sex(Some("giới tính: nam")), 1);
        assert_eq!(normalize_sex(Some("Nữ")), 0);
        assert_eq!(normalize_sex(Some("1")), 0);
        assert_eq!(normalize_sex(None), 0);
    }

    #[test]
    fn test_birth_year_fallback() {
        assert_eq!(normalize_birth_year(Some("1985"), today()), "1985");
        assert_eq!(normalize_birth_year(Some(" 1985 "), today()), "1985");
        assert_eq!(normalize_birth_year(Some("85"), today()), "2025");
        assert_eq!(normalize_birth_year(Some("#"), today()), "2025");
        assert_eq!(normalize_birth_year(Some("19a5"), today()), "2025");
        assert_eq!(normalize_birth_year(None, today()), "2025");
    }

    #[test]
    fn test_arrival_date_slash_form() {
        assert_eq!(
            normalize_arrival_date(Some("05/03/2024"), today()),
            day(2024, 3, 5)
        );
        assert_eq!(
            normalize_arrival_date(Some("5/3/2024"), today()),
            day(2024, 3, 5)
        );
    }

    #[test]
    fn test_arrival_date_iso_form() {
        assert_eq!(
            normalize_arrival_date(Some("2023-12-31"), today()),
            day(2023, 12, 31)
        );
    }

    #[test]
    fn test_arrival_date_fallbacks() {
        assert_eq!(normalize_arrival_date(Some("#"), today()), today());
        assert_eq!(normalize_arrival_date(Some(""), today()), today());
        assert_eq!(normalize_arrival_date(None, today()), today());
        assert_eq!(normalize_arrival_date(Some("31/02/2024"), today()), today());
        assert_eq!(normalize_arrival_date(Some("05/03/24"), today()), today());
        assert_eq!(normalize_arrival_date(Some("05/03"), today()), today());
        assert_eq!(normalize_arrival_date(Some("a/b/2024"), today()), today());
        assert_eq!(normalize_arrival_date(Some("5 / 3 / 2024"), today()), today());
        assert_eq!(normalize_arrival_date(Some("2024-3-5"), today()), today());
        assert_eq!(normalize_arrival_date(Some("March 5"), today()), today());
    }

    #[test]
    fn test_arrival_date_idempotent_on_iso() {
        let once = normalize_arrival_date(Some("2024-03-05"), today());
        let twice = normalize_arrival_date(Some(&once.format("%Y-%m-%d").to_string()), today());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(
            normalize_optional_text(Some(" 0901234567 ")).as_deref(),
            Some("0901234567")
        );
        assert_eq!(normalize_optional_text(Some("#")), None);
        assert_eq!(normalize_optional_text(Some("  ")), None);
    }
}
