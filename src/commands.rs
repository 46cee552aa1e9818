//! Subcommand bodies: thin orchestration over config, client, and engine.

use anyhow::{Context, Result};

use crate::browser;
use crate::cli::{OpenArgs, SyncArgs};
use crate::client::{HttpRoleClient, RoleStore};
use crate::config::RemoteConfig;
use crate::engine::Reconciler;
use crate::index::RoleIndex;
use crate::schema;
use crate::ui;

fn connect() -> Result<HttpRoleClient> {
    let config = RemoteConfig::from_env()?;
    HttpRoleClient::new(&config).context("could not encode the auth token")
}

/// Reconcile the desired-state file, then optionally open sessions.
pub fn sync(args: &SyncArgs) -> Result<()> {
    let client = connect()?;
    let desired = schema::load_desired(&args.file)?;
    log::info!("{} desired roles from {}", desired.len(), args.file.display());

    let mut reconciler = Reconciler::from_store(&client)?;
    log::info!("{} roles in the remote store", reconciler.index().len());

    let report = reconciler.reconcile(&desired);
    ui::display_report(&report);

    let mut opened = Vec::new();
    for name in &args.open {
        match open_one(&client, &mut reconciler, name, args.no_open_browser) {
            Ok(()) => opened.push(name.clone()),
            Err(err) => ui::error(&format!("open failed for {name}: {err}")),
        }
    }

    // Machine-parsable summary, one JSON document on stdout.
    let summary = serde_json::json!({
        "base": client.base(),
        "file": args.file,
        "created": report.created,
        "updated": report.updated,
        "unchanged": report.unchanged,
        "errors": report.errors,
        "opened": opened,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

/// Print the current remote snapshot.
pub fn list() -> Result<()> {
    let client = connect()?;
    let roles = client
        .list()
        .context("could not fetch the remote role listing")?;

    if roles.is_empty() {
        ui::info("no roles in the remote store");
        return Ok(());
    }

    for role in &roles {
        println!("{:>6}  {}", role.role_id, role.name);
        if let Some(description) = role.description.as_deref()
            && !description.is_empty()
        {
            ui::kv("description", description);
        }
    }
    Ok(())
}

/// Open sessions by name, creating missing roles first.
pub fn open(args: &OpenArgs) -> Result<()> {
    let client = connect()?;
    let mut reconciler = Reconciler::from_store(&client)?;

    for name in &args.names {
        if let Err(err) = open_one(&client, &mut reconciler, name, args.no_open_browser) {
            ui::error(&format!("open failed for {name}: {err}"));
        }
    }
    Ok(())
}

fn open_one(
    client: &HttpRoleClient,
    reconciler: &mut Reconciler<'_>,
    name: &str,
    no_browser: bool,
) -> Result<()> {
    let (role, path) = reconciler.open(name)?;
    let url = format!("{}{}", client.base(), path);
    ui::success(&format!("{} (role_id={}): {}", role.name, role.role_id, url));

    if !no_browser {
        browser::open_url(&url)?;
    }
    Ok(())
}

/// Standalone deletion by name. Reconciliation never deletes; this is the
/// only code path that does, and only when invoked explicitly.
pub fn delete(names: &[String]) -> Result<()> {
    let client = connect()?;
    let snapshot = client
        .list()
        .context("could not fetch the remote role listing")?;
    let mut index = RoleIndex::build(snapshot)?;

    if index.is_empty() {
        ui::info("remote store is empty; nothing to delete");
        return Ok(());
    }

    for name in names {
        let Some(role_id) = index.get(name).map(|r| r.role_id) else {
            ui::warn(&format!("skipping delete: no role named {name}"));
            continue;
        };
        match client.delete(role_id) {
            Ok(()) => {
                index.remove(name);
                ui::success(&format!("deleted {name} (role_id={role_id})"));
            }
            Err(err) => ui::error(&format!("delete failed for {name}: {err}")),
        }
    }
    Ok(())
}
