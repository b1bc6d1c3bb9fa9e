//! Buch entity: wire payload, form input, search criteria and behaviour.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entity::{
    HalLinks, SearchCriteria, SyncEntity, format_german_date, parse_etag_version, wire_enum,
};

/// Highest rating a Buch can have.
pub const MAX_RATING: u8 = 5;

/// Tag for JavaScript books.
pub const JAVASCRIPT: &str = "JAVASCRIPT";

/// Tag for TypeScript books.
pub const TYPESCRIPT: &str = "TYPESCRIPT";

const UNKNOWN_TITEL: &str = "unbekannt";

wire_enum! {
    /// Publication format.
    pub enum BuchArt {
        /// Printed edition.
        Druckausgabe => "DRUCKAUSGABE",
        /// Kindle edition.
        Kindle => "KINDLE",
    }
}

wire_enum! {
    /// Publisher.
    pub enum Verlag {
        /// Bar Verlag.
        BarVerlag => "BAR_VERLAG",
        /// Foo Verlag.
        FooVerlag => "FOO_VERLAG",
    }
}

/// Buch as sent to and received from the `buecher` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuchWire {
    /// Server id.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titel: Option<String>,
    /// Rating 0..=5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// Format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art: Option<BuchArt>,
    /// Publisher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verlag: Option<Verlag>,
    /// Publication date as `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datum: Option<NaiveDate>,
    /// Price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preis: Option<f64>,
    /// Discount as a fraction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rabatt: Option<f64>,
    /// Availability.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lieferbar: Option<bool>,
    /// Tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schlagwoerter: Option<Vec<String>>,
    /// ISBN.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    /// HAL links; read but never written.
    #[serde(rename = "_links", default, skip_serializing)]
    pub links: Option<HalLinks>,
}

/// Raw input from a create or edit form.
///
/// Rating arrives as text, the discount in percent and tags as checkboxes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuchForm {
    /// Title; `None` maps to `unbekannt`.
    pub titel: Option<String>,
    /// Rating as typed.
    pub rating: String,
    /// Format.
    pub art: Option<BuchArt>,
    /// Publisher.
    pub verlag: Option<Verlag>,
    /// Publication date.
    pub datum: Option<NaiveDate>,
    /// Price.
    pub preis: Option<f64>,
    /// Discount in percent.
    pub rabatt_prozent: Option<f64>,
    /// Availability.
    pub lieferbar: Option<bool>,
    /// JavaScript checkbox.
    pub javascript: bool,
    /// TypeScript checkbox.
    pub typescript: bool,
    /// ISBN.
    pub isbn: Option<String>,
}

/// Master data replaced by [`Buch::update_stammdaten`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuchStammdaten {
    /// Title.
    pub titel: String,
    /// Format.
    pub art: Option<BuchArt>,
    /// Publisher.
    pub verlag: Option<Verlag>,
    /// Rating, clamped to 0..=5.
    pub rating: Option<u8>,
    /// Publication date.
    pub datum: Option<NaiveDate>,
    /// Price.
    pub preis: Option<f64>,
    /// Discount as a fraction.
    pub rabatt: f64,
    /// ISBN.
    pub isbn: Option<String>,
}

/// In-memory Buch record.
#[derive(Debug, Clone, PartialEq)]
pub struct Buch {
    /// Server id; `None` until created.
    pub id: Option<String>,
    /// Version from the last `ETag`; `None` for form-built records.
    pub version: Option<u32>,
    /// Title.
    pub titel: String,
    /// Rating 0..=5.
    pub rating: Option<u8>,
    /// Format.
    pub art: Option<BuchArt>,
    /// Publisher.
    pub verlag: Option<Verlag>,
    /// Publication date.
    pub datum: Option<NaiveDate>,
    /// Price.
    pub preis: Option<f64>,
    /// Discount as a fraction.
    pub rabatt: f64,
    /// Availability.
    pub lieferbar: Option<bool>,
    /// Tags such as [`JAVASCRIPT`].
    pub schlagwoerter: Vec<String>,
    /// ISBN.
    pub isbn: Option<String>,
}

impl Buch {
    /// Build a record from form input. Never carries a version.
    pub fn from_form(form: BuchForm) -> Self {
        let mut schlagwoerter = Vec::new();
        if form.javascript {
            schlagwoerter.push(JAVASCRIPT.to_owned());
        }
        if form.typescript {
            schlagwoerter.push(TYPESCRIPT.to_owned());
        }
        let buch = Self {
            id: None,
            version: None,
            titel: form.titel.unwrap_or_else(|| UNKNOWN_TITEL.to_owned()),
            rating: parse_rating(&form.rating),
            art: form.art,
            verlag: form.verlag,
            datum: form.datum,
            preis: form.preis,
            rabatt: form.rabatt_prozent.map_or(0.0, |percent| percent / 100.0),
            lieferbar: form.lieferbar,
            schlagwoerter,
            isbn: form.isbn,
        };
        debug!(?buch, "Buch from form");
        buch
    }

    /// Case-insensitive substring match on the title.
    pub fn contains_titel(&self, fragment: &str) -> bool {
        self.titel
            .to_lowercase()
            .contains(&fragment.to_lowercase())
    }

    /// Raise the rating by one, up to [`MAX_RATING`]. No-op without a rating.
    pub fn rate_up(&mut self) {
        if let Some(rating) = self.rating.as_mut() {
            if *rating < MAX_RATING {
                *rating += 1;
            }
        }
    }

    /// Lower the rating by one, down to zero. No-op without a rating.
    pub fn rate_down(&mut self) {
        if let Some(rating) = self.rating.as_mut() {
            *rating = rating.saturating_sub(1);
        }
    }

    /// Five flags, the first `rating` of them set.
    pub fn rating_stars(&self) -> [bool; MAX_RATING as usize] {
        let filled = self.rating.unwrap_or(0);
        std::array::from_fn(|index| index < usize::from(filled))
    }

    /// `true` when the record belongs to `verlag`.
    pub fn has_verlag(&self, verlag: Verlag) -> bool {
        self.verlag == Some(verlag)
    }

    /// Replace the master data.
    pub fn update_stammdaten(&mut self, stammdaten: BuchStammdaten) {
        self.titel = stammdaten.titel;
        self.art = stammdaten.art;
        self.verlag = stammdaten.verlag;
        self.rating = stammdaten.rating.map(|rating| rating.min(MAX_RATING));
        self.datum = stammdaten.datum;
        self.preis = stammdaten.preis;
        self.rabatt = stammdaten.rabatt;
        self.isbn = stammdaten.isbn;
    }

    /// `true` when at least one tag is set.
    pub fn has_schlagwoerter(&self) -> bool {
        !self.schlagwoerter.is_empty()
    }

    /// `true` when `schlagwort` is set.
    pub fn has_schlagwort(&self, schlagwort: &str) -> bool {
        self.schlagwoerter.iter().any(|tag| tag == schlagwort)
    }

    /// Replace the tags from the two checkboxes.
    pub fn update_schlagwoerter(&mut self, javascript: bool, typescript: bool) {
        self.schlagwoerter.clear();
        if javascript {
            self.schlagwoerter.push(JAVASCRIPT.to_owned());
        }
        if typescript {
            self.schlagwoerter.push(TYPESCRIPT.to_owned());
        }
    }

    /// Publication date as a German long date, empty without a date.
    pub fn datum_formatted(&self) -> String {
        self.datum.map(format_german_date).unwrap_or_default()
    }
}

fn parse_rating(raw: &str) -> Option<u8> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    trimmed
        .parse::<u8>()
        .ok()
        .map(|rating| rating.min(MAX_RATING))
}

impl SyncEntity for Buch {
    type Wire = BuchWire;
    type Criteria = BuchCriteria;

    const COLLECTION: &'static str = "buecher";
    const EMBEDDED_KEY: &'static str = "buecher";
    const LABEL: &'static str = "Buch";

    fn from_server(wire: BuchWire, etag: Option<&str>) -> Self {
        let id = wire
            .id
            .or_else(|| wire.links.as_ref().and_then(HalLinks::self_id));
        Self {
            id,
            version: etag.and_then(parse_etag_version),
            titel: wire.titel.unwrap_or_else(|| UNKNOWN_TITEL.to_owned()),
            rating: wire.rating,
            art: wire.art,
            verlag: wire.verlag,
            datum: wire.datum,
            preis: wire.preis,
            rabatt: wire.rabatt.unwrap_or(0.0),
            lieferbar: wire.lieferbar,
            schlagwoerter: wire.schlagwoerter.unwrap_or_default(),
            isbn: wire.isbn,
        }
    }

    fn to_wire(&self) -> BuchWire {
        BuchWire {
            id: self.id.clone(),
            titel: Some(self.titel.clone()),
            rating: self.rating,
            art: self.art,
            verlag: self.verlag,
            datum: self.datum,
            preis: self.preis,
            rabatt: Some(self.rabatt),
            lieferbar: self.lieferbar,
            schlagwoerter: Some(self.schlagwoerter.clone()),
            isbn: self.isbn.clone(),
            links: None,
        }
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn version(&self) -> Option<u32> {
        self.version
    }

    fn set_version(&mut self, version: u32) {
        self.version = Some(version);
    }

    fn stamp(&mut self, today: NaiveDate) {
        self.datum = Some(today);
    }
}

/// Filters for the Buch search form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuchCriteria {
    /// Title fragment.
    pub titel: Option<String>,
    /// Format.
    pub art: Option<BuchArt>,
    /// Rating; zero means "any".
    pub rating: Option<u8>,
    /// Only JavaScript books.
    pub javascript: bool,
    /// Only TypeScript books.
    pub typescript: bool,
}

impl SearchCriteria for BuchCriteria {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(titel) = self.titel.as_deref().filter(|titel| !titel.is_empty()) {
            params.push(("titel".to_owned(), titel.to_owned()));
        }
        if let Some(rating) = self.rating.filter(|rating| *rating > 0) {
            params.push(("rating".to_owned(), rating.to_string()));
        }
        if let Some(art) = self.art {
            params.push(("art".to_owned(), art.as_str().to_owned()));
        }
        // One `schlagwoerter` pair per tag; both flags send both values.
        if self.javascript {
            params.push(("schlagwoerter".to_owned(), JAVASCRIPT.to_owned()));
        }
        if self.typescript {
            params.push(("schlagwoerter".to_owned(), TYPESCRIPT.to_owned()));
        }
        params
    }
}
