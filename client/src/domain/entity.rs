//! Shared plumbing for entities synchronised with the REST backend.
//!
//! [`SyncEntity`] is the seam between the generic sync service and the
//! concrete Buch and Kunde mappers. The helpers here cover the HAL and HTTP
//! details both mappers share: self links, `ETag` versions, `Location` ids,
//! German long dates and search query strings.

use chrono::{Datelike, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generate a closed enum with fixed wire names, `as_str`, `Display` and a
/// case-insensitive `FromStr`.
macro_rules! wire_enum {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Name used on the wire and in query parameters.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::domain::entity::UnknownVariant;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(value.trim()))
                    .ok_or_else(|| $crate::domain::entity::UnknownVariant {
                        kind: stringify!($name),
                        value: value.to_owned(),
                    })
            }
        }
    };
}

pub(crate) use wire_enum;

/// Raised when text does not name a variant of a wire enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} value: {value}")]
pub struct UnknownVariant {
    /// Enum name.
    pub kind: &'static str,
    /// Rejected input.
    pub value: String,
}

/// Entity record exchanged with a REST collection.
pub trait SyncEntity: Clone + Send + Sync + 'static {
    /// JSON representation sent to and received from the backend.
    type Wire: Serialize + DeserializeOwned + Send;

    /// Filter struct accepted by `find`.
    type Criteria: SearchCriteria + Send + Sync;

    /// Collection path below the REST base, e.g. `buecher`.
    const COLLECTION: &'static str;

    /// Key under `_embedded` holding the collection items.
    const EMBEDDED_KEY: &'static str;

    /// Human-readable entity name used in logs and messages.
    const LABEL: &'static str;

    /// Build the record from a server payload and its optional `ETag`.
    fn from_server(wire: Self::Wire, etag: Option<&str>) -> Self;

    /// Wire payload for `POST` and `PUT`. Never carries hyperlinks.
    fn to_wire(&self) -> Self::Wire;

    /// Server-assigned id.
    fn id(&self) -> Option<&str>;

    /// Store the id assigned by the server.
    fn set_id(&mut self, id: String);

    /// Optimistic concurrency version from the last fetch or update.
    fn version(&self) -> Option<u32>;

    /// Store a new version after an update.
    fn set_version(&mut self, version: u32);

    /// Stamp the record's timestamp field before it is created.
    fn stamp(&mut self, today: NaiveDate);
}

/// Search filters translated to query parameters.
pub trait SearchCriteria {
    /// Query parameters in a stable order. Empty, absent and `false` fields
    /// produce no parameter.
    fn to_query(&self) -> Vec<(String, String)>;

    /// Query string without the leading `?`.
    fn query_string(&self) -> String {
        query_string(&self.to_query())
    }
}

/// `application/x-www-form-urlencoded` serialisation of `params`.
pub fn query_string(params: &[(String, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

/// A single HAL link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalLink {
    /// Link target.
    pub href: String,
}

/// HAL `_links` object; only `self` is interpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalLinks {
    /// Canonical URL of the resource.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<HalLink>,
}

impl HalLinks {
    /// Id taken from the last path segment of the self link.
    pub fn self_id(&self) -> Option<String> {
        self.self_link
            .as_ref()
            .and_then(|link| last_path_segment(&link.href))
    }
}

/// Last non-empty segment of a URL or path, e.g. the id in a `Location`
/// header.
pub fn last_path_segment(href: &str) -> Option<String> {
    href.rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
}

/// Version number carried in an `ETag` such as `"3"` or `W/"3"`.
pub fn parse_etag_version(etag: &str) -> Option<u32> {
    let trimmed = etag.trim();
    let strong = trimmed.strip_prefix("W/").unwrap_or(trimmed);
    strong.trim_matches('"').parse().ok()
}

const GERMAN_MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// German long date, e.g. `7. Mai 2020`.
pub fn format_german_date(date: NaiveDate) -> String {
    let month = GERMAN_MONTHS
        .get(date.month0() as usize)
        .copied()
        .unwrap_or_default();
    format!("{}. {} {}", date.day(), month, date.year())
}

#[cfg(test)]
mod tests {
    //! Helpers shared by the entity mappers.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("\"3\"", Some(3))]
    #[case("W/\"12\"", Some(12))]
    #[case("0", Some(0))]
    #[case("\"abc\"", None)]
    #[case("", None)]
    fn etag_versions(#[case] etag: &str, #[case] expected: Option<u32>) {
        assert_eq!(parse_etag_version(etag), expected);
    }

    #[rstest]
    #[case("https://localhost:3000/rest/buecher/00000000-0000-0000-0000-000000000001", Some("00000000-0000-0000-0000-000000000001"))]
    #[case("/rest/kunden/7", Some("7"))]
    #[case("7", Some("7"))]
    #[case("/rest/kunden/", None)]
    fn ids_come_from_the_last_segment(#[case] href: &str, #[case] expected: Option<&str>) {
        assert_eq!(last_path_segment(href).as_deref(), expected);
    }

    #[rstest]
    #[case(2020, 5, 7, "7. Mai 2020")]
    #[case(2021, 3, 1, "1. März 2021")]
    #[case(1999, 12, 31, "31. Dezember 1999")]
    fn german_long_dates(#[case] y: i32, #[case] m: u32, #[case] d: u32, #[case] expected: &str) {
        let date = NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
        assert_eq!(format_german_date(date), expected);
    }

    #[test]
    fn query_string_encodes_reserved_characters() {
        let params = vec![("titel".to_owned(), "a&b c".to_owned())];
        assert_eq!(query_string(&params), "titel=a%26b+c");
    }

    wire_enum! {
        /// Test enum.
        pub enum Colour {
            /// Red.
            Red => "RED",
            /// Dark blue.
            DarkBlue => "DARK_BLUE",
        }
    }

    #[rstest]
    #[case("RED", Colour::Red)]
    #[case("dark_blue", Colour::DarkBlue)]
    #[case(" Red ", Colour::Red)]
    fn wire_enums_parse_case_insensitively(#[case] input: &str, #[case] expected: Colour) {
        assert_eq!(input.parse::<Colour>(), Ok(expected));
    }

    #[test]
    fn wire_enums_reject_unknown_names() {
        let err = "GREEN".parse::<Colour>().expect_err("unknown colour");
        assert_eq!(err.to_string(), "unknown Colour value: GREEN");
    }

    #[test]
    fn wire_enums_serialise_to_wire_names() {
        let json = serde_json::to_string(&Colour::DarkBlue).expect("serialises");
        assert_eq!(json, "\"DARK_BLUE\"");
    }
}
