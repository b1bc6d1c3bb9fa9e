//! View states and their text rendering.
//!
//! Commands produce a [`View`]; [`render`] turns it into the text printed on
//! stdout without touching any service.

use std::fmt::Write as _;

use super::messages::{ADMIN_REQUIRED, NotFoundText};
use crate::domain::buch::{JAVASCRIPT, TYPESCRIPT};
use crate::domain::{Buch, Interesse, Kunde, Roles};

/// Login state shown by `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    /// An authorization value is stored.
    pub logged_in: bool,
    /// The stored roles include `ROLE_ADMIN`.
    pub admin: bool,
    /// Stored roles.
    pub roles: Roles,
}

/// Outcome of one command.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Current login state.
    Session(SessionView),
    /// Login succeeded with these roles.
    LoggedIn(Roles),
    /// Credentials were cleared.
    LoggedOut,
    /// Search hits.
    Buecher(Vec<Buch>),
    /// One record in detail.
    Buch(Box<Buch>),
    /// Search hits.
    Kunden(Vec<Kunde>),
    /// One record in detail.
    Kunde(Box<Kunde>),
    /// A record was created with `id`.
    Created {
        /// Entity label, e.g. `Buch`.
        label: &'static str,
        /// Id assigned by the server.
        id: String,
    },
    /// A record was updated to `version`.
    Updated {
        /// Entity label.
        label: &'static str,
        /// Record id.
        id: String,
        /// Version after the update.
        version: Option<u32>,
    },
    /// A record was deleted.
    Removed {
        /// Entity label.
        label: &'static str,
        /// Id of the deleted record.
        id: String,
    },
    /// A mutating command was refused for lack of the admin role.
    Forbidden,
    /// A command failed with a user-facing message.
    Failed(String),
}

impl View {
    /// `true` for views reporting a failure.
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Forbidden | Self::Failed(_))
    }
}

/// Text for `view`, without a trailing newline.
pub fn render(view: &View) -> String {
    match view {
        View::Session(session) => render_session(session),
        View::LoggedIn(roles) if roles.is_empty() => "Login erfolgreich.".to_owned(),
        View::LoggedIn(roles) => format!("Login erfolgreich. Rollen: {roles}"),
        View::LoggedOut => "Abgemeldet.".to_owned(),
        View::Buecher(buecher) => render_list::<Buch>(buecher, buch_row),
        View::Buch(buch) => buch_details(buch),
        View::Kunden(kunden) => render_list::<Kunde>(kunden, kunde_row),
        View::Kunde(kunde) => kunde_details(kunde),
        View::Created { label, id } => format!("{label} {id} wurde angelegt."),
        View::Updated {
            label,
            id,
            version: Some(version),
        } => format!("{label} {id} wurde aktualisiert (Version {version})."),
        View::Updated { label, id, .. } => format!("{label} {id} wurde aktualisiert."),
        View::Removed { label, id } => format!("{label} {id} wurde gelöscht."),
        View::Forbidden => ADMIN_REQUIRED.to_owned(),
        View::Failed(message) => message.clone(),
    }
}

fn render_session(session: &SessionView) -> String {
    if !session.logged_in {
        return "Nicht angemeldet.".to_owned();
    }
    let who = if session.admin {
        "Angemeldet als Administrator"
    } else {
        "Angemeldet"
    };
    if session.roles.is_empty() {
        format!("{who}.")
    } else {
        format!("{who}. Rollen: {}", session.roles)
    }
}

fn render_list<E: NotFoundText>(items: &[E], row: fn(&E) -> String) -> String {
    if items.is_empty() {
        return E::NONE_FOUND.to_owned();
    }
    items.iter().map(row).collect::<Vec<_>>().join("\n")
}

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|value| !value.is_empty()).unwrap_or("-")
}

fn yes_no(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "ja",
        Some(false) => "nein",
        None => "-",
    }
}

fn stars(buch: &Buch) -> String {
    buch.rating_stars()
        .iter()
        .map(|filled| if *filled { '★' } else { '☆' })
        .collect()
}

fn buch_row(buch: &Buch) -> String {
    format!(
        "{}  {}  {}  {}",
        or_dash(buch.id.as_deref()),
        buch.titel,
        stars(buch),
        or_dash(Some(buch.datum_formatted().as_str())),
    )
}

fn buch_details(buch: &Buch) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Buch {}", or_dash(buch.id.as_deref()));
    let _ = writeln!(out, "Titel: {}", buch.titel);
    let _ = writeln!(out, "Art: {}", or_dash(buch.art.map(|art| art.as_str())));
    let _ = writeln!(
        out,
        "Verlag: {}",
        or_dash(buch.verlag.map(|verlag| verlag.as_str()))
    );
    let _ = writeln!(out, "Rating: {}", stars(buch));
    let _ = writeln!(out, "Datum: {}", or_dash(Some(buch.datum_formatted().as_str())));
    match buch.preis {
        Some(preis) => {
            let _ = writeln!(out, "Preis: {preis:.2} €");
        }
        None => {
            let _ = writeln!(out, "Preis: -");
        }
    }
    let _ = writeln!(out, "Rabatt: {:.1} %", buch.rabatt * 100.0);
    let _ = writeln!(out, "Lieferbar: {}", yes_no(buch.lieferbar));
    let tags: Vec<&str> = [JAVASCRIPT, TYPESCRIPT]
        .into_iter()
        .filter(|tag| buch.has_schlagwort(tag))
        .collect();
    let _ = writeln!(out, "Schlagwörter: {}", or_dash(Some(tags.join(", ").as_str())));
    let _ = writeln!(out, "ISBN: {}", or_dash(buch.isbn.as_deref()));
    let _ = write!(out, "Version: {}", version_text(buch.version));
    out
}

fn kunde_row(kunde: &Kunde) -> String {
    format!(
        "{}  {}  {}  {}",
        or_dash(kunde.id.as_deref()),
        kunde.nachname,
        or_dash(kunde.email.as_deref()),
        or_dash(kunde.geschlecht.map(|geschlecht| geschlecht.as_str())),
    )
}

fn interesse_text(interesse: Interesse) -> &'static str {
    match interesse {
        Interesse::Sport => "Sport",
        Interesse::Lesen => "Lesen",
        Interesse::Reisen => "Reisen",
    }
}

fn kunde_details(kunde: &Kunde) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Kunde {}", or_dash(kunde.id.as_deref()));
    let _ = writeln!(out, "Nachname: {}", kunde.nachname);
    let _ = writeln!(out, "E-Mail: {}", or_dash(kunde.email.as_deref()));
    let _ = writeln!(out, "Newsletter: {}", yes_no(kunde.newsletter));
    let _ = writeln!(
        out,
        "Geburtsdatum: {}",
        or_dash(Some(kunde.geburtsdatum_formatted().as_str()))
    );
    let _ = writeln!(
        out,
        "Geschlecht: {}",
        or_dash(kunde.geschlecht.map(|geschlecht| geschlecht.as_str()))
    );
    let _ = writeln!(
        out,
        "Familienstand: {}",
        or_dash(kunde.familienstand.map(|familienstand| familienstand.as_str()))
    );
    let interessen: Vec<&str> = kunde
        .interessen
        .iter()
        .copied()
        .map(interesse_text)
        .collect();
    let _ = writeln!(out, "Interessen: {}", or_dash(Some(interessen.join(", ").as_str())));
    let adresse = kunde
        .adresse
        .as_ref()
        .map(|adresse| format!("{} {}", adresse.plz, adresse.ort));
    let _ = writeln!(out, "Adresse: {}", or_dash(adresse.as_deref()));
    let _ = write!(out, "Version: {}", version_text(kunde.version));
    out
}

fn version_text(version: Option<u32>) -> String {
    version.map_or_else(|| "-".to_owned(), |version| version.to_string())
}
