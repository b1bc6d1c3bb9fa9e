//! Administration client entry-point: loads settings, wires the cookie
//! store, REST transport, login flow and sync services, then runs one
//! command.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]

use std::ffi::OsString;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use admin_client::config::{ClientSettings, LoginFlow};
use admin_client::domain::ports::{CredentialStore, RestTransport, TokenAcquisition};
use admin_client::domain::{
    BasicAuthLogin, BearerTokenLogin, EntitySyncService, SessionCache, SessionService,
};
use admin_client::inbound::cli::{Cli, Console, render};
use admin_client::outbound::cookies::CookieJarCredentialStore;
use admin_client::outbound::http::ReqwestTransport;
use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use mockable::{Clock, DefaultClock};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let Cli { global, command } = Cli::parse();
    let mut settings = ClientSettings::load_from_iter([OsString::from("admin-client")])
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    global.apply(&mut settings);
    debug!(?settings, "settings loaded");

    let console = build_console(&settings)?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to start the async runtime")?;
    let view = runtime.block_on(console.execute(command));

    println!("{}", render(&view));
    Ok(if view.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn build_console(settings: &ClientSettings) -> Result<Console> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let store: Arc<dyn CredentialStore> = Arc::new(
        open_cookie_store(&settings.cookie_file(), Arc::clone(&clock))?
            .with_scope(settings.cookie_scope()),
    );
    let transport: Arc<dyn RestTransport> = Arc::new(
        ReqwestTransport::new(settings.base_url()?, settings.request_timeout())
            .wrap_err("failed to build the HTTP client")?,
    );
    let login_flow: Arc<dyn TokenAcquisition> = match settings.login_flow()? {
        LoginFlow::Bearer => Arc::new(BearerTokenLogin::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            Arc::clone(&clock),
        )),
        LoginFlow::Basic => Arc::new(BasicAuthLogin::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            Arc::clone(&clock),
        )),
    };

    let cache = SessionCache::new();
    Ok(Console::new(
        SessionService::new(Arc::clone(&store), login_flow),
        EntitySyncService::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            Arc::clone(&clock),
            cache.buch(),
        ),
        EntitySyncService::new(transport, store, clock, cache.kunde()),
    ))
}

fn open_cookie_store(path: &Path, clock: Arc<dyn Clock>) -> Result<CookieJarCredentialStore> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| eyre!("cookie file {} has no usable file name", path.display()))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Dir::create_ambient_dir_all(parent, ambient_authority())
        .wrap_err_with(|| format!("failed to create {}", parent.display()))?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())
        .wrap_err_with(|| format!("failed to open {}", parent.display()))?;
    Ok(CookieJarCredentialStore::persistent(dir, file_name, clock))
}
