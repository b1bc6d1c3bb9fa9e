//! Command-line grammar.
//!
//! Search and create arguments convert into the domain's criteria and form
//! types. Update arguments patch a fetched record: omitted flags keep the
//! stored value.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::config::{ClientSettings, LoginFlow};
use crate::domain::buch::{BuchArt, JAVASCRIPT, TYPESCRIPT, Verlag};
use crate::domain::kunde::{Familienstand, Geschlecht, Interesse};
use crate::domain::{
    Adresse, Buch, BuchCriteria, BuchForm, BuchStammdaten, Kunde, KundeCriteria, KundeForm,
    KundeStammdaten,
};

/// Administration client for Buch and Kunde records.
#[derive(Debug, Parser)]
#[command(name = "admin-client", version)]
pub struct Cli {
    /// Settings overrides accepted by every command.
    #[command(flatten)]
    pub global: GlobalArgs,
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Flags overriding configured settings.
#[derive(Debug, Clone, Default, Args)]
pub struct GlobalArgs {
    /// REST base URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// File persisting the session cookies.
    #[arg(long, global = true)]
    pub cookie_file: Option<PathBuf>,
    /// Login flow.
    #[arg(long, global = true, value_enum)]
    pub login_flow: Option<LoginFlow>,
    /// Request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

impl GlobalArgs {
    /// Overlay the flags that were given onto `settings`.
    pub fn apply(self, settings: &mut ClientSettings) {
        if let Some(base_url) = self.base_url {
            settings.base_url = Some(base_url);
        }
        if let Some(cookie_file) = self.cookie_file {
            settings.cookie_file = Some(cookie_file);
        }
        if let Some(login_flow) = self.login_flow {
            settings.login_flow = Some(login_flow.as_str().to_owned());
        }
        if let Some(timeout_secs) = self.timeout_secs {
            settings.request_timeout_secs = Some(timeout_secs);
        }
    }
}

/// Top-level commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the credentials.
    Login {
        /// Login name.
        #[arg(long, short)]
        username: String,
        /// Password.
        #[arg(long, short)]
        password: String,
    },
    /// Discard the stored credentials.
    Logout,
    /// Show the login state.
    Status,
    /// Work with Buch records.
    #[command(subcommand)]
    Buch(BuchCommand),
    /// Work with Kunde records.
    #[command(subcommand)]
    Kunde(KundeCommand),
}

/// Buch operations.
#[derive(Debug, Subcommand)]
pub enum BuchCommand {
    /// Search the collection.
    Find(BuchFindArgs),
    /// Show one record.
    Show {
        /// Record id.
        id: String,
    },
    /// Create a record (admin only).
    Create(BuchCreateArgs),
    /// Update a record (admin only).
    Update(BuchUpdateArgs),
    /// Delete a record (admin only).
    Delete {
        /// Record id.
        id: String,
    },
}

/// Kunde operations.
#[derive(Debug, Subcommand)]
pub enum KundeCommand {
    /// Search the collection.
    Find(KundeFindArgs),
    /// Show one record.
    Show {
        /// Record id.
        id: String,
    },
    /// Create a record (admin only).
    Create(KundeCreateArgs),
    /// Update a record (admin only).
    Update(KundeUpdateArgs),
    /// Delete a record (admin only).
    Delete {
        /// Record id.
        id: String,
    },
}

/// Buch search filters.
#[derive(Debug, Clone, Default, Args)]
pub struct BuchFindArgs {
    /// Part of the title.
    #[arg(long)]
    pub titel: Option<String>,
    /// Edition type.
    #[arg(long)]
    pub art: Option<BuchArt>,
    /// Minimum rating; 0 means any.
    #[arg(long)]
    pub rating: Option<u8>,
    /// Only records tagged JAVASCRIPT.
    #[arg(long)]
    pub javascript: bool,
    /// Only records tagged TYPESCRIPT.
    #[arg(long)]
    pub typescript: bool,
}

impl From<BuchFindArgs> for BuchCriteria {
    fn from(args: BuchFindArgs) -> Self {
        Self {
            titel: args.titel,
            art: args.art,
            rating: args.rating,
            javascript: args.javascript,
            typescript: args.typescript,
        }
    }
}

/// Fields of a new Buch.
///
/// There is no date flag: creating a record stamps it with today's date.
#[derive(Debug, Clone, Default, Args)]
pub struct BuchCreateArgs {
    /// Title.
    #[arg(long)]
    pub titel: Option<String>,
    /// Rating from 0 to 5; empty for none.
    #[arg(long, default_value = "")]
    pub rating: String,
    /// Edition type.
    #[arg(long)]
    pub art: Option<BuchArt>,
    /// Publisher.
    #[arg(long)]
    pub verlag: Option<Verlag>,
    /// Price.
    #[arg(long)]
    pub preis: Option<f64>,
    /// Discount in percent.
    #[arg(long)]
    pub rabatt: Option<f64>,
    /// Mark the record as available.
    #[arg(long)]
    pub lieferbar: bool,
    /// Tag with JAVASCRIPT.
    #[arg(long)]
    pub javascript: bool,
    /// Tag with TYPESCRIPT.
    #[arg(long)]
    pub typescript: bool,
    /// ISBN.
    #[arg(long)]
    pub isbn: Option<String>,
}

impl From<BuchCreateArgs> for BuchForm {
    fn from(args: BuchCreateArgs) -> Self {
        Self {
            titel: args.titel,
            rating: args.rating,
            art: args.art,
            verlag: args.verlag,
            datum: None,
            preis: args.preis,
            rabatt_prozent: args.rabatt,
            lieferbar: Some(args.lieferbar),
            javascript: args.javascript,
            typescript: args.typescript,
            isbn: args.isbn,
        }
    }
}

/// Changes to an existing Buch; omitted flags keep the stored value.
#[derive(Debug, Clone, Default, Args)]
pub struct BuchUpdateArgs {
    /// Record id.
    pub id: String,
    /// New title.
    #[arg(long)]
    pub titel: Option<String>,
    /// New edition type.
    #[arg(long)]
    pub art: Option<BuchArt>,
    /// New publisher.
    #[arg(long)]
    pub verlag: Option<Verlag>,
    /// New rating from 0 to 5.
    #[arg(long)]
    pub rating: Option<u8>,
    /// New publication date, `YYYY-MM-DD`.
    #[arg(long)]
    pub datum: Option<NaiveDate>,
    /// New price.
    #[arg(long)]
    pub preis: Option<f64>,
    /// Discount in percent.
    #[arg(long)]
    pub rabatt: Option<f64>,
    /// New ISBN.
    #[arg(long)]
    pub isbn: Option<String>,
    /// Set or clear the JAVASCRIPT tag.
    #[arg(long)]
    pub javascript: Option<bool>,
    /// Set or clear the TYPESCRIPT tag.
    #[arg(long)]
    pub typescript: Option<bool>,
}

impl BuchUpdateArgs {
    /// Patch `buch` with the given flags.
    pub fn apply(self, buch: &mut Buch) {
        let stammdaten = BuchStammdaten {
            titel: self.titel.unwrap_or_else(|| buch.titel.clone()),
            art: self.art.or(buch.art),
            verlag: self.verlag.or(buch.verlag),
            rating: self.rating.or(buch.rating),
            datum: self.datum.or(buch.datum),
            preis: self.preis.or(buch.preis),
            rabatt: self.rabatt.map_or(buch.rabatt, |percent| percent / 100.0),
            isbn: self.isbn.or_else(|| buch.isbn.clone()),
        };
        buch.update_stammdaten(stammdaten);

        if self.javascript.is_some() || self.typescript.is_some() {
            let javascript = self
                .javascript
                .unwrap_or_else(|| buch.has_schlagwort(JAVASCRIPT));
            let typescript = self
                .typescript
                .unwrap_or_else(|| buch.has_schlagwort(TYPESCRIPT));
            buch.update_schlagwoerter(javascript, typescript);
        }
    }
}

/// Kunde search filters.
#[derive(Debug, Clone, Default, Args)]
pub struct KundeFindArgs {
    /// Part of the surname.
    #[arg(long)]
    pub nachname: Option<String>,
    /// Gender.
    #[arg(long)]
    pub geschlecht: Option<Geschlecht>,
    /// Marital status.
    #[arg(long)]
    pub familienstand: Option<Familienstand>,
    /// Only customers interested in sport.
    #[arg(long)]
    pub sport: bool,
    /// Only customers interested in reading.
    #[arg(long)]
    pub lesen: bool,
    /// Only customers interested in travel.
    #[arg(long)]
    pub reisen: bool,
}

impl From<KundeFindArgs> for KundeCriteria {
    fn from(args: KundeFindArgs) -> Self {
        Self {
            nachname: args.nachname,
            geschlecht: args.geschlecht,
            familienstand: args.familienstand,
            sport: args.sport,
            lesen: args.lesen,
            reisen: args.reisen,
        }
    }
}

/// Fields of a new Kunde.
#[derive(Debug, Clone, Default, Args)]
pub struct KundeCreateArgs {
    /// Surname.
    #[arg(long)]
    pub nachname: Option<String>,
    /// Email address.
    #[arg(long)]
    pub email: Option<String>,
    /// Subscribe to the newsletter.
    #[arg(long)]
    pub newsletter: bool,
    /// Date of birth, `YYYY-MM-DD`.
    #[arg(long)]
    pub geburtsdatum: Option<NaiveDate>,
    /// Gender.
    #[arg(long)]
    pub geschlecht: Option<Geschlecht>,
    /// Marital status.
    #[arg(long)]
    pub familienstand: Option<Familienstand>,
    /// Interested in sport.
    #[arg(long)]
    pub sport: bool,
    /// Interested in reading.
    #[arg(long)]
    pub lesen: bool,
    /// Interested in travel.
    #[arg(long)]
    pub reisen: bool,
    /// Postcode.
    #[arg(long)]
    pub plz: Option<String>,
    /// City.
    #[arg(long)]
    pub ort: Option<String>,
}

impl From<KundeCreateArgs> for KundeForm {
    fn from(args: KundeCreateArgs) -> Self {
        Self {
            nachname: args.nachname,
            email: args.email,
            newsletter: Some(args.newsletter),
            geburtsdatum: args.geburtsdatum,
            geschlecht: args.geschlecht,
            familienstand: args.familienstand,
            sport: args.sport,
            lesen: args.lesen,
            reisen: args.reisen,
            plz: args.plz,
            ort: args.ort,
        }
    }
}

/// Changes to an existing Kunde; omitted flags keep the stored value.
#[derive(Debug, Clone, Default, Args)]
pub struct KundeUpdateArgs {
    /// Record id.
    pub id: String,
    /// New surname.
    #[arg(long)]
    pub nachname: Option<String>,
    /// New email address.
    #[arg(long)]
    pub email: Option<String>,
    /// Subscribe to or leave the newsletter.
    #[arg(long)]
    pub newsletter: Option<bool>,
    /// New date of birth, `YYYY-MM-DD`.
    #[arg(long)]
    pub geburtsdatum: Option<NaiveDate>,
    /// New gender.
    #[arg(long)]
    pub geschlecht: Option<Geschlecht>,
    /// New marital status.
    #[arg(long)]
    pub familienstand: Option<Familienstand>,
    /// New postcode.
    #[arg(long)]
    pub plz: Option<String>,
    /// New city.
    #[arg(long)]
    pub ort: Option<String>,
    /// Set or clear the sport interest.
    #[arg(long)]
    pub sport: Option<bool>,
    /// Set or clear the reading interest.
    #[arg(long)]
    pub lesen: Option<bool>,
    /// Set or clear the travel interest.
    #[arg(long)]
    pub reisen: Option<bool>,
}

impl KundeUpdateArgs {
    /// Patch `kunde` with the given flags.
    pub fn apply(self, kunde: &mut Kunde) {
        let adresse = match (self.plz, self.ort, kunde.adresse.clone()) {
            (None, None, current) => current,
            (plz, ort, current) => {
                let current = current.unwrap_or_default();
                Some(Adresse {
                    plz: plz.unwrap_or(current.plz),
                    ort: ort.unwrap_or(current.ort),
                })
            }
        };
        let stammdaten = KundeStammdaten {
            nachname: self.nachname.unwrap_or_else(|| kunde.nachname.clone()),
            email: self.email.or_else(|| kunde.email.clone()),
            newsletter: self.newsletter.or(kunde.newsletter),
            geburtsdatum: self.geburtsdatum.or(kunde.geburtsdatum),
            geschlecht: self.geschlecht.or(kunde.geschlecht),
            familienstand: self.familienstand.or(kunde.familienstand),
            adresse,
        };
        kunde.update_stammdaten(stammdaten);

        if self.sport.is_some() || self.lesen.is_some() || self.reisen.is_some() {
            let sport = self
                .sport
                .unwrap_or_else(|| kunde.has_interesse(Interesse::Sport));
            let lesen = self
                .lesen
                .unwrap_or_else(|| kunde.has_interesse(Interesse::Lesen));
            let reisen = self
                .reisen
                .unwrap_or_else(|| kunde.has_interesse(Interesse::Reisen));
            kunde.update_interessen(sport, lesen, reisen);
        }
    }
}
