//! Field normalization cases seen in real spreadsheet exports

use chrono::NaiveDate;
use clinic_admin::core::import::normalize::{
    normalize_arrival_date, normalize_birth_year, normalize_id, normalize_name, normalize_sex,
};
use test_case::test_case;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
}

#[test_case(Some("5/3/2024") => "2024-03-05" ; "day month year")]
#[test_case(Some("05/03/2024") => "2024-03-05" ; "zero padded")]
#[test_case(Some(" 31/12/1999 ") => "1999-12-31" ; "surrounding spaces")]
#[test_case(Some("2024-03-05") => "2024-03-05" ; "already iso")]
#[test_case(Some("31/02/2024") => "2025-01-10" ; "impossible date")]
#[test_case(Some("5 / 3 / 2024") => "2025-01-10" ; "spaces inside parts")]
#[test_case(Some("5/3/24") => "2025-01-10" ; "two digit year")]
#[test_case(Some("5/3") => "2025-01-10" ; "missing year")]
#[test_case(Some("5-3-2024") => "2025-01-10" ; "dashes in wrong order")]
#[test_case(Some("#") => "2025-01-10" ; "placeholder")]
#[test_case(Some("12/#/2024") => "2025-01-10" ; "embedded placeholder")]
#[test_case(Some("") => "2025-01-10" ; "empty")]
#[test_case(None => "2025-01-10" ; "absent")]
fn arrival_date(raw: Option<&str>) -> String {
    normalize_arrival_date(raw, today()).to_string()
}

#[test_case(Some("Nam") => 1 ; "male")]
#[test_case(Some("NAM") => 1 ; "upper case")]
#[test_case(Some("  nam ") => 1 ; "padded")]
#[test_case(Some("Nữ") => 0 ; "female")]
#[test_case(Some("Khác") => 0 ; "other")]
#[test_case(Some("#") => 0 ; "placeholder")]
#[test_case(None => 0 ; "absent")]
fn sex(raw: Option<&str>) -> u8 {
    normalize_sex(raw)
}

#[test_case(Some("1980") => "1980" ; "four digits")]
#[test_case(Some(" 1980 ") => "1980" ; "padded")]
#[test_case(Some("80") => "2025" ; "two digits")]
#[test_case(Some("1980.5") => "2025" ; "not an integer")]
#[test_case(Some("#") => "2025" ; "placeholder")]
#[test_case(None => "2025" ; "absent")]
fn birth_year(raw: Option<&str>) -> String {
    normalize_birth_year(raw, today())
}

#[test_case(Some("100125000001") => Some("100125000001".to_string()) ; "twelve digits")]
#[test_case(Some("10012500001") => None ; "eleven digits")]
#[test_case(Some("1001250000012") => None ; "thirteen digits")]
#[test_case(Some("10012500000A") => None ; "letter")]
#[test_case(Some("#") => None ; "placeholder")]
#[test_case(None => None ; "absent")]
fn supplied_id(raw: Option<&str>) -> Option<String> {
    normalize_id(raw).map(|id| id.as_str().to_string())
}

#[test_case(Some("  Nguyễn Văn A ") => "Nguyễn Văn A" ; "trimmed")]
#[test_case(Some("#") => "Không tên" ; "placeholder")]
#[test_case(Some("   ") => "Không tên" ; "blank")]
#[test_case(None => "Không tên" ; "absent")]
fn name(raw: Option<&str>) -> String {
    normalize_name(raw, "Không tên")
}
