//! Normalized member record built from one legacy export row

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::parse;

/// One raw export line: column header -> raw cell value
pub type RawRow = HashMap<String, String>;

/// Country name -> ISO 3166-1 alpha-2 code
const COUNTRY_CODES: &[(&str, &str)] = &[
    ("Deutschland", "DE"),
    ("Germany", "DE"),
    ("Österreich", "AT"),
    ("Austria", "AT"),
    ("Schweiz", "CH"),
    ("Switzerland", "CH"),
];

/// Length caps applied to free-text columns, matching the remote schema
const MAX_STREET: usize = 100;
const MAX_ZIP: usize = 5;
const MAX_PHONE: usize = 50;
const MAX_EMAIL: usize = 100;

/// Sex derived from the salutation column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    F,
    M,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::F => "F",
            Sex::M => "M",
        }
    }
}

/// Regional chapter of the club
///
/// The raw column carries German region names; only the five known values
/// are accepted, everything else leaves the field unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    Nord,
    Sued,
    Ost,
    West,
    Mitte,
}

impl Region {
    /// Accepts the raw spellings of the legacy export (`Süd` maps to `Sued`)
    pub fn from_raw(value: &str) -> Option<Self> {
        match value {
            "Nord" => Some(Region::Nord),
            "Süd" => Some(Region::Sued),
            "Ost" => Some(Region::Ost),
            "West" => Some(Region::West),
            "Mitte" => Some(Region::Mitte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Nord => "Nord",
            Region::Sued => "Sued",
            Region::Ost => "Ost",
            Region::West => "West",
            Region::Mitte => "Mitte",
        }
    }
}

/// Normalized in-memory representation of one legacy member
///
/// Built once per import run from one CSV row. The sanitizer and conflict
/// resolver may mutate it before matching; it is read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct NormalizedMember {
    /// Legacy primary key, the durable cross-system join key
    pub external_id: Option<i64>,
    pub sex: Option<Sex>,
    pub title: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address1: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub region: Option<Region>,
    pub country_code: Option<String>,
    /// Mobile number preferred over landline
    pub phone: Option<String>,
    pub is_breeder: bool,
    pub is_active_breeder: bool,
    pub membership_number: Option<i64>,
    /// Username derived from the membership number; the orchestrator
    /// synthesizes `user-{external_id}` when this is unset
    pub derived_username: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub member_since: Option<NaiveDate>,
    pub cancellation_on: Option<NaiveDate>,
    /// Computed from the membership flag and the membership date window
    pub blocked: bool,
    pub kennel_name: Option<String>,
    /// Contact email, present only if it passed the grammar check
    pub email: Option<String>,
}

fn cell<'a>(row: &'a RawRow, header: &str) -> &'a str {
    row.get(header).map(String::as_str).unwrap_or("")
}

fn country_code(value: &str) -> Option<String> {
    let name = parse::non_blank(value)?;
    for (candidate, code) in COUNTRY_CODES {
        if *candidate == name {
            return Some((*code).to_string());
        }
    }
    // Unknown country names degrade to their first two characters
    if name.chars().count() >= 2 {
        Some(name.chars().take(2).collect::<String>().to_uppercase())
    } else {
        None
    }
}

impl NormalizedMember {
    /// Build a normalized member from one raw export row
    ///
    /// `today` anchors the activity-window computation; the binary passes the
    /// local current date.
    pub fn from_row(row: &RawRow, today: NaiveDate) -> Self {
        let external_id = parse::parse_integer(cell(row, "ID Person"));

        let membership_number = parse::parse_integer(cell(row, "membership number"));
        let derived_username = membership_number.map(|n| n.to_string());

        let phone = parse::clean_string(cell(row, "mobile"), Some(MAX_PHONE))
            .or_else(|| parse::clean_string(cell(row, "phone"), Some(MAX_PHONE)));

        let email = parse::clean_string(cell(row, "email"), Some(MAX_EMAIL))
            .filter(|e| parse::is_valid_email(e));

        let member_since = parse::parse_date(cell(row, "date of joining"));
        let cancellation_on = parse::parse_date(cell(row, "date of leaving"));
        let is_member = parse::parse_boolean(cell(row, "person is a member"));

        // Activity window: a membership that has not started yet, or already
        // ended, blocks the record. An explicit "not a member" flag always
        // blocks; the date logic can only add blocking, never remove it.
        let blocked_by_date = member_since.is_some_and(|d| d > today)
            || cancellation_on.is_some_and(|d| d < today);
        let blocked = match is_member {
            Some(flag) => !flag || blocked_by_date,
            None => blocked_by_date,
        };

        Self {
            external_id,
            sex: parse::parse_sex(cell(row, "salutation")),
            title: parse::clean_string(cell(row, "title"), None),
            first_name: parse::clean_string(cell(row, "firstname"), None),
            last_name: parse::clean_string(cell(row, "lastname"), None),
            address1: parse::clean_string(cell(row, "street"), Some(MAX_STREET)),
            zip: parse::clean_string(cell(row, "zipcode"), Some(MAX_ZIP)),
            city: parse::clean_string(cell(row, "city"), None),
            region: parse::non_blank(cell(row, "oblast")).and_then(Region::from_raw),
            country_code: country_code(cell(row, "country")),
            phone,
            is_breeder: parse::parse_boolean(cell(row, "person is a breeder")).unwrap_or(false),
            is_active_breeder: parse::parse_boolean(cell(row, "person is an active breeder"))
                .unwrap_or(false),
            membership_number,
            derived_username,
            date_of_birth: parse::parse_date(cell(row, "date of birth")),
            date_of_death: parse::parse_date(cell(row, "date of death")),
            member_since,
            cancellation_on,
            blocked,
            kennel_name: parse::clean_string(cell(row, "breeding station"), None),
            email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 24).expect("valid date")
    }

    fn dmy(date: NaiveDate) -> String {
        date.format("%d/%m/%Y").to_string()
    }

    #[test]
    fn non_member_flag_blocks_regardless_of_dates() {
        let past = today() - Days::new(365);
        let m = NormalizedMember::from_row(
            &row(&[
                ("date of joining", &dmy(past)),
                ("person is a member", "0"),
            ]),
            today(),
        );
        assert!(m.blocked);
    }

    #[test]
    fn future_joining_date_blocks() {
        let future = today() + Days::new(365);
        let m = NormalizedMember::from_row(
            &row(&[
                ("date of joining", &dmy(future)),
                ("person is a member", "1"),
            ]),
            today(),
        );
        assert!(m.blocked);
    }

    #[test]
    fn past_leaving_date_blocks() {
        let joined = today() - Days::new(700);
        let left = today() - Days::new(365);
        let m = NormalizedMember::from_row(
            &row(&[
                ("date of joining", &dmy(joined)),
                ("date of leaving", &dmy(left)),
                ("person is a member", "1"),
            ]),
            today(),
        );
        assert!(m.blocked);
    }

    #[test]
    fn active_member_is_not_blocked() {
        let joined = today() - Days::new(365);
        let m = NormalizedMember::from_row(
            &row(&[
                ("date of joining", &dmy(joined)),
                ("person is a member", "1"),
            ]),
            today(),
        );
        assert!(!m.blocked);
    }

    #[test]
    fn blocked_defaults_to_false_without_any_signal() {
        let m = NormalizedMember::from_row(&row(&[("firstname", "Anna")]), today());
        assert!(!m.blocked);
    }

    #[test]
    fn future_leaving_date_does_not_block() {
        let joined = today() - Days::new(700);
        let leaves = today() + Days::new(30);
        let m = NormalizedMember::from_row(
            &row(&[
                ("date of joining", &dmy(joined)),
                ("date of leaving", &dmy(leaves)),
                ("person is a member", "1"),
            ]),
            today(),
        );
        assert!(!m.blocked);
    }

    #[test]
    fn invalid_email_is_dropped() {
        let m = NormalizedMember::from_row(&row(&[("email", "not-an-email")]), today());
        assert_eq!(m.email, None);

        let m = NormalizedMember::from_row(&row(&[("email", "anna@example.com")]), today());
        assert_eq!(m.email.as_deref(), Some("anna@example.com"));
    }

    #[test]
    fn username_is_derived_from_membership_number() {
        let m = NormalizedMember::from_row(&row(&[("membership number", "4200")]), today());
        assert_eq!(m.membership_number, Some(4200));
        assert_eq!(m.derived_username.as_deref(), Some("4200"));

        let m = NormalizedMember::from_row(&row(&[("ID Person", "17")]), today());
        assert_eq!(m.derived_username, None);
    }

    #[test]
    fn region_accepts_only_known_names() {
        let m = NormalizedMember::from_row(&row(&[("oblast", "Süd")]), today());
        assert_eq!(m.region, Some(Region::Sued));

        let m = NormalizedMember::from_row(&row(&[("oblast", "Bayern")]), today());
        assert_eq!(m.region, None);
    }

    #[test]
    fn country_code_lookup_and_fallback() {
        let m = NormalizedMember::from_row(&row(&[("country", "Deutschland")]), today());
        assert_eq!(m.country_code.as_deref(), Some("DE"));

        let m = NormalizedMember::from_row(&row(&[("country", "Frankreich")]), today());
        assert_eq!(m.country_code.as_deref(), Some("FR"));

        let m = NormalizedMember::from_row(&row(&[("country", "X")]), today());
        assert_eq!(m.country_code, None);
    }

    #[test]
    fn mobile_is_preferred_over_landline() {
        let m = NormalizedMember::from_row(
            &row(&[("mobile", "0151 234"), ("phone", "030 567")]),
            today(),
        );
        assert_eq!(m.phone.as_deref(), Some("0151 234"));

        let m = NormalizedMember::from_row(&row(&[("phone", "030 567")]), today());
        assert_eq!(m.phone.as_deref(), Some("030 567"));
    }

    #[test]
    fn full_row_maps_every_field() {
        let joined = today() - Days::new(365);
        let m = NormalizedMember::from_row(
            &row(&[
                ("ID Person", "1234"),
                ("salutation", "Frau"),
                ("title", "Dr."),
                ("firstname", "Anna"),
                ("lastname", "Muster"),
                ("street", "Hauptstr. 1"),
                ("email", "anna@example.com"),
                ("zipcode", "123456"),
                ("city", "Berlin"),
                ("oblast", "Nord"),
                ("country", "Deutschland"),
                ("mobile", "0151 234"),
                ("phone", "030 567"),
                ("person is a breeder", "1"),
                ("person is an active breeder", "0"),
                ("membership number", "4200"),
                ("date of birth", "01/02/1980"),
                ("date of death", "-"),
                ("date of joining", &dmy(joined)),
                ("date of leaving", ""),
                ("person is a member", "1"),
                ("breeding station", "vom Beispielhof"),
            ]),
            today(),
        );

        assert_eq!(m.external_id, Some(1234));
        assert_eq!(m.sex, Some(Sex::F));
        assert_eq!(m.title.as_deref(), Some("Dr."));
        assert_eq!(m.first_name.as_deref(), Some("Anna"));
        assert_eq!(m.last_name.as_deref(), Some("Muster"));
        assert_eq!(m.address1.as_deref(), Some("Hauptstr. 1"));
        // Zip is capped at five characters
        assert_eq!(m.zip.as_deref(), Some("12345"));
        assert_eq!(m.city.as_deref(), Some("Berlin"));
        assert_eq!(m.region, Some(Region::Nord));
        assert_eq!(m.country_code.as_deref(), Some("DE"));
        assert_eq!(m.phone.as_deref(), Some("0151 234"));
        assert!(m.is_breeder);
        assert!(!m.is_active_breeder);
        assert_eq!(m.membership_number, Some(4200));
        assert_eq!(m.derived_username.as_deref(), Some("4200"));
        assert_eq!(m.date_of_birth, NaiveDate::from_ymd_opt(1980, 2, 1));
        assert_eq!(m.date_of_death, None);
        assert_eq!(m.member_since, Some(joined));
        assert_eq!(m.cancellation_on, None);
        assert!(!m.blocked);
        assert_eq!(m.kennel_name.as_deref(), Some("vom Beispielhof"));
        assert_eq!(m.email.as_deref(), Some("anna@example.com"));
    }
}
