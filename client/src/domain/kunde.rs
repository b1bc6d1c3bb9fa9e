//! Kunde entity: wire payload, form input, search criteria and behaviour.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::entity::{
    HalLinks, SearchCriteria, SyncEntity, format_german_date, parse_etag_version, wire_enum,
};

const UNKNOWN_NACHNAME: &str = "unbekannt";

wire_enum! {
    /// Gender.
    pub enum Geschlecht {
        /// Male.
        Maennlich => "MAENNLICH",
        /// Female.
        Weiblich => "WEIBLICH",
        /// Diverse.
        Divers => "DIVERS",
    }
}

wire_enum! {
    /// Marital status.
    pub enum Familienstand {
        /// Single.
        Ledig => "LEDIG",
        /// Married.
        Verheiratet => "VERHEIRATET",
        /// Divorced.
        Geschieden => "GESCHIEDEN",
        /// Widowed.
        Verwitwet => "VERWITWET",
    }
}

wire_enum! {
    /// Interest, sent as a one-letter code.
    pub enum Interesse {
        /// Sport.
        Sport => "S",
        /// Reading.
        Lesen => "L",
        /// Travel.
        Reisen => "R",
    }
}

/// Postal address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adresse {
    /// Postal code.
    pub plz: String,
    /// City.
    pub ort: String,
}

/// Kunde as sent to and received from the `kunden` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KundeWire {
    /// Server id.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Surname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nachname: Option<String>,
    /// E-mail address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Newsletter subscription.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newsletter: Option<bool>,
    /// Date of birth as `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geburtsdatum: Option<NaiveDate>,
    /// Gender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geschlecht: Option<Geschlecht>,
    /// Marital status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub familienstand: Option<Familienstand>,
    /// Interest codes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interessen: Option<Vec<Interesse>>,
    /// Address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adresse: Option<Adresse>,
    /// HAL links; read but never written.
    #[serde(rename = "_links", default, skip_serializing)]
    pub links: Option<HalLinks>,
}

/// Raw input from a create or edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KundeForm {
    /// Surname; `None` maps to `unbekannt`.
    pub nachname: Option<String>,
    /// E-mail address.
    pub email: Option<String>,
    /// Newsletter checkbox.
    pub newsletter: Option<bool>,
    /// Date of birth.
    pub geburtsdatum: Option<NaiveDate>,
    /// Gender.
    pub geschlecht: Option<Geschlecht>,
    /// Marital status.
    pub familienstand: Option<Familienstand>,
    /// Sport checkbox.
    pub sport: bool,
    /// Reading checkbox.
    pub lesen: bool,
    /// Travel checkbox.
    pub reisen: bool,
    /// Postal code.
    pub plz: Option<String>,
    /// City.
    pub ort: Option<String>,
}

/// Master data replaced by [`Kunde::update_stammdaten`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KundeStammdaten {
    /// Surname.
    pub nachname: String,
    /// E-mail address.
    pub email: Option<String>,
    /// Newsletter subscription.
    pub newsletter: Option<bool>,
    /// Date of birth.
    pub geburtsdatum: Option<NaiveDate>,
    /// Gender.
    pub geschlecht: Option<Geschlecht>,
    /// Marital status.
    pub familienstand: Option<Familienstand>,
    /// Address.
    pub adresse: Option<Adresse>,
}

/// In-memory Kunde record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kunde {
    /// Server id; `None` until created.
    pub id: Option<String>,
    /// Version from the last `ETag`; `None` for form-built records.
    pub version: Option<u32>,
    /// Surname.
    pub nachname: String,
    /// E-mail address.
    pub email: Option<String>,
    /// Newsletter subscription.
    pub newsletter: Option<bool>,
    /// Date of birth.
    pub geburtsdatum: Option<NaiveDate>,
    /// Gender.
    pub geschlecht: Option<Geschlecht>,
    /// Marital status.
    pub familienstand: Option<Familienstand>,
    /// Interests in form order.
    pub interessen: Vec<Interesse>,
    /// Address.
    pub adresse: Option<Adresse>,
}

impl Kunde {
    /// Build a record from form input. Never carries a version.
    pub fn from_form(form: KundeForm) -> Self {
        let adresse = match (form.plz, form.ort) {
            (None, None) => None,
            (plz, ort) => Some(Adresse {
                plz: plz.unwrap_or_default(),
                ort: ort.unwrap_or_default(),
            }),
        };
        let kunde = Self {
            id: None,
            version: None,
            nachname: form
                .nachname
                .unwrap_or_else(|| UNKNOWN_NACHNAME.to_owned()),
            email: form.email,
            newsletter: form.newsletter,
            geburtsdatum: form.geburtsdatum,
            geschlecht: form.geschlecht,
            familienstand: form.familienstand,
            interessen: interessen_from_flags(form.sport, form.lesen, form.reisen),
            adresse,
        };
        debug!(?kunde, "Kunde from form");
        kunde
    }

    /// Case-insensitive substring match on the surname.
    pub fn contains_nachname(&self, fragment: &str) -> bool {
        self.nachname
            .to_lowercase()
            .contains(&fragment.to_lowercase())
    }

    /// `true` when the record has `geschlecht`.
    pub fn has_geschlecht(&self, geschlecht: Geschlecht) -> bool {
        self.geschlecht == Some(geschlecht)
    }

    /// Replace the master data.
    pub fn update_stammdaten(&mut self, stammdaten: KundeStammdaten) {
        self.nachname = stammdaten.nachname;
        self.email = stammdaten.email;
        self.newsletter = stammdaten.newsletter;
        self.geburtsdatum = stammdaten.geburtsdatum;
        self.geschlecht = stammdaten.geschlecht;
        self.familienstand = stammdaten.familienstand;
        self.adresse = stammdaten.adresse;
    }

    /// `true` when at least one interest is set.
    pub fn has_interessen(&self) -> bool {
        !self.interessen.is_empty()
    }

    /// `true` when `interesse` is set.
    pub fn has_interesse(&self, interesse: Interesse) -> bool {
        self.interessen.contains(&interesse)
    }

    /// Replace the interests from the three checkboxes.
    pub fn update_interessen(&mut self, sport: bool, lesen: bool, reisen: bool) {
        self.interessen = interessen_from_flags(sport, lesen, reisen);
    }

    /// Date of birth as a German long date, empty without a date.
    pub fn geburtsdatum_formatted(&self) -> String {
        self.geburtsdatum
            .map(format_german_date)
            .unwrap_or_default()
    }
}

fn interessen_from_flags(sport: bool, lesen: bool, reisen: bool) -> Vec<Interesse> {
    [
        (sport, Interesse::Sport),
        (lesen, Interesse::Lesen),
        (reisen, Interesse::Reisen),
    ]
    .into_iter()
    .filter_map(|(set, interesse)| set.then_some(interesse))
    .collect()
}

impl SyncEntity for Kunde {
    type Wire = KundeWire;
    type Criteria = KundeCriteria;

    const COLLECTION: &'static str = "kunden";
    const EMBEDDED_KEY: &'static str = "kundeList";
    const LABEL: &'static str = "Kunde";

    fn from_server(wire: KundeWire, etag: Option<&str>) -> Self {
        let id = wire
            .id
            .or_else(|| wire.links.as_ref().and_then(HalLinks::self_id));
        Self {
            id,
            version: etag.and_then(parse_etag_version),
            nachname: wire
                .nachname
                .unwrap_or_else(|| UNKNOWN_NACHNAME.to_owned()),
            email: wire.email,
            newsletter: wire.newsletter,
            geburtsdatum: wire.geburtsdatum,
            geschlecht: wire.geschlecht,
            familienstand: wire.familienstand,
            interessen: wire.interessen.unwrap_or_default(),
            adresse: wire.adresse,
        }
    }

    fn to_wire(&self) -> KundeWire {
        KundeWire {
            id: self.id.clone(),
            nachname: Some(self.nachname.clone()),
            email: self.email.clone(),
            newsletter: self.newsletter,
            geburtsdatum: self.geburtsdatum,
            geschlecht: self.geschlecht,
            familienstand: self.familienstand,
            interessen: Some(self.interessen.clone()),
            adresse: self.adresse.clone(),
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

    /// Kunde records carry no creation timestamp; the date of birth is user
    /// data and stays as entered.
    fn stamp(&mut self, _today: NaiveDate) {}
}

/// Filters for the Kunde search form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KundeCriteria {
    /// Surname fragment.
    pub nachname: Option<String>,
    /// Gender.
    pub geschlecht: Option<Geschlecht>,
    /// Marital status.
    pub familienstand: Option<Familienstand>,
    /// Only customers interested in sport.
    pub sport: bool,
    /// Only customers interested in reading.
    pub lesen: bool,
    /// Only customers interested in travel.
    pub reisen: bool,
}

impl SearchCriteria for KundeCriteria {
    fn to_query(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(nachname) = self.nachname.as_deref().filter(|name| !name.is_empty()) {
            params.push(("nachname".to_owned(), nachname.to_owned()));
        }
        if let Some(familienstand) = self.familienstand {
            params.push(("familienstand".to_owned(), familienstand.as_str().to_owned()));
        }
        if let Some(geschlecht) = self.geschlecht {
            params.push(("geschlechtType".to_owned(), geschlecht.as_str().to_owned()));
        }
        for (set, name) in [
            (self.sport, "sport"),
            (self.lesen, "lesen"),
            (self.reisen, "reisen"),
        ] {
            if set {
                params.push((name.to_owned(), "true".to_owned()));
            }
        }
        params
    }
}
