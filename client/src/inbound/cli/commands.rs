//! Command dispatch.
//!
//! `Console` turns parsed commands into service calls and the resulting
//! [`View`]. Create, update and delete check the admin role first and send
//! nothing when it is missing.

use tracing::{debug, warn};

use super::args::{BuchCommand, Command, KundeCommand};
use super::messages::{
    NotFoundText, find_failure, lookup_failure, remove_failure, save_failure, update_failure,
};
use super::render::{SessionView, View};
use crate::domain::{Buch, EntitySyncService, Kunde, SessionService, SyncEntity};

/// Dispatches commands against the session and both sync services.
pub struct Console {
    session: SessionService,
    buecher: EntitySyncService<Buch>,
    kunden: EntitySyncService<Kunde>,
}

impl Console {
    /// Assemble the console from its services.
    pub fn new(
        session: SessionService,
        buecher: EntitySyncService<Buch>,
        kunden: EntitySyncService<Kunde>,
    ) -> Self {
        Self {
            session,
            buecher,
            kunden,
        }
    }

    /// Session facade, e.g. to subscribe to login events.
    pub const fn session(&self) -> &SessionService {
        &self.session
    }

    /// Run `command` and describe the outcome.
    pub async fn execute(&self, command: Command) -> View {
        match command {
            Command::Login { username, password } => {
                match self.session.login(&username, &password).await {
                    Ok(roles) => View::LoggedIn(roles),
                    Err(err) => View::Failed(err.to_string()),
                }
            }
            Command::Logout => {
                self.session.logout();
                View::LoggedOut
            }
            Command::Status => View::Session(SessionView {
                logged_in: self.session.is_logged_in(),
                admin: self.session.is_admin(),
                roles: self.session.roles(),
            }),
            Command::Buch(command) => self.buch(command).await,
            Command::Kunde(command) => self.kunde(command).await,
        }
    }

    async fn buch(&self, command: BuchCommand) -> View {
        let service = &self.buecher;
        match command {
            BuchCommand::Find(args) => match service.find(Some(&args.into())).await {
                Ok(buecher) => View::Buecher(buecher),
                Err(err) => View::Failed(find_failure::<Buch>(&err)),
            },
            BuchCommand::Show { id } => match lookup(service, &id).await {
                Ok(buch) => View::Buch(Box::new(buch)),
                Err(view) => view,
            },
            BuchCommand::Create(args) => {
                if let Some(denied) = self.require_admin() {
                    return denied;
                }
                create(service, Buch::from_form(args.into())).await
            }
            BuchCommand::Update(args) => {
                if let Some(denied) = self.require_admin() {
                    return denied;
                }
                let mut buch = match lookup(service, &args.id).await {
                    Ok(buch) => buch,
                    Err(view) => return view,
                };
                args.apply(&mut buch);
                update(service, buch).await
            }
            BuchCommand::Delete { id } => {
                if let Some(denied) = self.require_admin() {
                    return denied;
                }
                remove(service, &id).await
            }
        }
    }

    async fn kunde(&self, command: KundeCommand) -> View {
        let service = &self.kunden;
        match command {
            KundeCommand::Find(args) => match service.find(Some(&args.into())).await {
                Ok(kunden) => View::Kunden(kunden),
                Err(err) => View::Failed(find_failure::<Kunde>(&err)),
            },
            KundeCommand::Show { id } => match lookup(service, &id).await {
                Ok(kunde) => View::Kunde(Box::new(kunde)),
                Err(view) => view,
            },
            KundeCommand::Create(args) => {
                if let Some(denied) = self.require_admin() {
                    return denied;
                }
                create(service, Kunde::from_form(args.into())).await
            }
            KundeCommand::Update(args) => {
                if let Some(denied) = self.require_admin() {
                    return denied;
                }
                let mut kunde = match lookup(service, &args.id).await {
                    Ok(kunde) => kunde,
                    Err(view) => return view,
                };
                args.apply(&mut kunde);
                update(service, kunde).await
            }
            KundeCommand::Delete { id } => {
                if let Some(denied) = self.require_admin() {
                    return denied;
                }
                remove(service, &id).await
            }
        }
    }

    fn require_admin(&self) -> Option<View> {
        if self.session.is_admin() {
            None
        } else {
            warn!(logged_in = self.session.is_logged_in(), "admin role required");
            Some(View::Forbidden)
        }
    }
}

async fn lookup<E>(service: &EntitySyncService<E>, id: &str) -> Result<E, View>
where
    E: SyncEntity + NotFoundText,
{
    service
        .find_by_id(Some(id))
        .await
        .map_err(|err| View::Failed(lookup_failure::<E>(&err)))
}

async fn create<E>(service: &EntitySyncService<E>, mut entity: E) -> View
where
    E: SyncEntity,
{
    match service.save(&mut entity).await {
        Ok(id) => {
            debug!(entity = E::LABEL, %id, "created");
            View::Created { label: E::LABEL, id }
        }
        Err(err) => View::Failed(save_failure(&err)),
    }
}

async fn update<E>(service: &EntitySyncService<E>, mut entity: E) -> View
where
    E: SyncEntity + NotFoundText,
{
    match service.update(&mut entity).await {
        Ok(updated) => View::Updated {
            label: E::LABEL,
            id: updated.id().unwrap_or_default().to_owned(),
            version: updated.version(),
        },
        Err(err) => View::Failed(update_failure::<E>(&err)),
    }
}

async fn remove<E>(service: &EntitySyncService<E>, id: &str) -> View
where
    E: SyncEntity + NotFoundText,
{
    let entity = match lookup(service, id).await {
        Ok(entity) => entity,
        Err(view) => return view,
    };
    match service.remove(&entity).await {
        Ok(removed) => View::Removed {
            label: E::LABEL,
            id: removed.id,
        },
        Err(err) => View::Failed(remove_failure::<E>(&err)),
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
