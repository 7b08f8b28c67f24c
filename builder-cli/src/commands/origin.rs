//! `builder origin check|create|list`

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use builder_api::{AvailabilityChecker, BuilderApiClient};
use builder_core::{
    config, session, Action, AppStore, BuilderConfig, Origin, OriginName, Session,
};
use builder_web::actions;
use builder_web::{
    Collaborators, OriginCreatePage, RequireSignIn, StoreRouter, WorkflowConfig, WorkflowError,
    WorkflowState,
};

use crate::{home, runtime};

#[derive(Subcommand, Debug)]
pub enum OriginCommand {
    /// Check whether an origin name is still available.
    Check(NameArgs),

    /// Create a new origin owned by the signed-in user.
    Create(NameArgs),

    /// List origins owned by the signed-in user.
    List(ListArgs),
}

#[derive(Args, Debug)]
pub struct NameArgs {
    /// Origin name: lowercase letters, digits, '-' and '_'.
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

pub fn run(cmd: OriginCommand) -> Result<()> {
    let home = home()?;
    let config = config::load_at(&home).context("failed to load config")?;
    let session = session::load_at(&home).context("failed to load session")?;

    match cmd {
        OriginCommand::Check(args) => check(&config, session, args),
        OriginCommand::Create(args) => create(&config, session, args),
        OriginCommand::List(args) => list(&config, session, args),
    }
}

fn require_session(session: Option<Session>) -> Result<Session> {
    session.ok_or_else(|| anyhow!("not signed in; run `builder sign-in` first"))
}

fn check(config: &BuilderConfig, session: Option<Session>, args: NameArgs) -> Result<()> {
    OriginName::validate(&args.name)
        .with_context(|| format!("'{}' is not a valid origin name", args.name))?;

    let client = BuilderApiClient::from_config(config, session.map(|s| s.auth_token));
    let available = runtime()?
        .block_on(client.check_availability(&args.name))
        .with_context(|| format!("availability check failed for '{}'", args.name))?;

    if available {
        println!("{} '{}' is available", "✓".green(), args.name);
        Ok(())
    } else {
        bail!("'{}' is already taken", args.name)
    }
}

fn create(config: &BuilderConfig, session: Option<Session>, args: NameArgs) -> Result<()> {
    runtime()?.block_on(create_origin(config, session, &args.name))
}

/// Drive the origin creation page the way a user would: load the user's
/// origins, mount, type the name, wait for the availability check, submit.
async fn create_origin(
    config: &BuilderConfig,
    session: Option<Session>,
    name: &str,
) -> Result<()> {
    let token = session.as_ref().map(|s| s.auth_token.clone());
    let client = Arc::new(BuilderApiClient::from_config(config, token.clone()));

    let store = AppStore::default();
    if let Some(session) = session {
        store.dispatch(Action::SignIn(session));
    }
    if let Some(token) = token.as_deref() {
        actions::fetch_my_origins(&store, client.as_ref(), token)
            .await
            .context("failed to load your origins")?;
    }

    let router = Arc::new(StoreRouter::new(store.clone()));
    let collaborators = Collaborators {
        checker: client.clone(),
        api: client,
        router: router.clone(),
        guard: Arc::new(RequireSignIn::new(router)),
    };
    let page = match OriginCreatePage::mount(
        store.clone(),
        collaborators,
        WorkflowConfig::from(config),
    ) {
        Ok(page) => page,
        Err(WorkflowError::NotSignedIn) => bail!("not signed in; run `builder sign-in` first"),
        Err(err) => return Err(err.into()),
    };

    page.input(name);
    let state = page.settle().await;
    if state != WorkflowState::Valid {
        match page.field().error() {
            Some(err) => bail!("cannot create '{name}': {err}"),
            None => bail!("cannot create '{name}' ({state})"),
        }
    }

    let origin = page
        .submit()
        .await
        .with_context(|| format!("failed to create origin '{name}'"))?;

    let state = store.get_state();
    println!("{} Created origin '{}'", "✓".green(), origin.name);
    if let Some(route) = state.route.as_deref() {
        println!("  {}", route.bright_black());
    }
    if state.origins.current.as_ref() == Some(&origin) {
        println!("  '{}' is now your current origin", origin.name);
    }
    Ok(())
}

#[derive(Tabled)]
struct OriginRow {
    #[tabled(rename = "origin")]
    name: String,
    #[tabled(rename = "visibility")]
    visibility: String,
    #[tabled(rename = "signing key")]
    key: String,
}

#[derive(Serialize)]
struct OriginListJson<'a> {
    username: &'a str,
    origins: &'a [Origin],
}

fn list(config: &BuilderConfig, session: Option<Session>, args: ListArgs) -> Result<()> {
    let session = require_session(session)?;
    let client = BuilderApiClient::from_config(config, Some(session.auth_token.clone()));
    let store = AppStore::default();
    store.dispatch(Action::SignIn(session.clone()));

    let origins = runtime()?
        .block_on(actions::fetch_my_origins(
            &store,
            &client,
            &session.auth_token,
        ))
        .context("failed to load your origins")?;

    if args.json {
        let payload = OriginListJson {
            username: &session.username,
            origins: &origins,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("failed to serialize origins")?
        );
        return Ok(());
    }

    print_table(&session.username, &origins);
    Ok(())
}

fn print_table(username: &str, origins: &[Origin]) {
    if origins.is_empty() {
        println!("{} owns no origins.", username);
        println!("Run: builder origin create <name>");
        return;
    }

    println!("{}", format!("Origins owned by {username}").bold());
    let rows: Vec<OriginRow> = origins
        .iter()
        .map(|origin| OriginRow {
            name: origin.name.to_string(),
            visibility: origin
                .default_package_visibility
                .clone()
                .unwrap_or_else(|| "public".to_string()),
            key: origin
                .private_key_name
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
