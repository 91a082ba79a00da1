#![forbid(unsafe_code)]

//! `recbind-demo`: package detail screen over a JSON catalog.
//!
//! Mounts a [`PackageScreen`] for `--name`/`--version`, applies each `--set`
//! as a live store update, follows an optional `--navigate` route change and
//! unmounts. Every frame the screen paints is printed as it appears.
//!
//! Logging goes to stderr; set `RUST_LOG=debug` to see binding activity.

mod cli;

use std::io::{self, Write};

use clap::Parser;
use recbind_core::{BindConfig, CompositeKeyResolver, ConfigError, RecordError};
use recbind_runtime::{MemoryStore, RouteContext};
use recbind_view::PackageScreen;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("failed to read catalog {path}: {source}")]
    Catalog {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid catalog: {0}")]
    Record(#[from] RecordError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();
    let stdout = io::stdout();
    run(&cli, &mut stdout.lock())?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: &Cli, out: &mut impl Write) -> Result<(), DemoError> {
    let config = match &cli.config {
        Some(path) => BindConfig::load(path)?,
        None => BindConfig::default(),
    };
    let resolver = CompositeKeyResolver::from_config(&config.key);

    let text = std::fs::read_to_string(&cli.catalog).map_err(|source| DemoError::Catalog {
        path: cli.catalog.display().to_string(),
        source,
    })?;
    let store = MemoryStore::new();
    let loaded = store.load_catalog_json(&text, &resolver)?;
    tracing::info!(records = loaded, catalog = %cli.catalog.display(), "catalog loaded");

    let ctx = RouteContext::new(cli.route());
    let mut screen = PackageScreen::new(store.clone(), resolver, ctx.clone(), config.binding);
    screen.follow(&ctx);

    if let Err(err) = screen.on_mount() {
        tracing::warn!(%err, "mount did not bind");
    }
    let mut printed = flush_frames(&screen, 0, out)?;

    for assignment in &cli.sets {
        let Some(key) = screen.controller().key() else {
            tracing::warn!(field = %assignment.field, "no package bound; skipping update");
            continue;
        };
        store.update(&key, |record| {
            record.set(assignment.field.as_str(), assignment.value.clone());
        });
        printed = flush_frames(&screen, printed, out)?;
    }

    if let Some(target) = &cli.navigate {
        tracing::info!(name = %target.name, version = %target.version, "navigating");
        ctx.navigate(target.route());
        printed = flush_frames(&screen, printed, out)?;
    }

    screen.on_unmount();
    flush_frames(&screen, printed, out)?;
    Ok(())
}

/// Print frames painted since `printed`; returns the new count.
fn flush_frames(
    screen: &PackageScreen<MemoryStore>,
    printed: usize,
    out: &mut impl Write,
) -> Result<usize, DemoError> {
    let frames = screen.frames();
    for (index, frame) in frames.iter().enumerate().skip(printed) {
        writeln!(out, "--- frame {} ---", index + 1)?;
        out.write_all(frame.render_text().as_bytes())?;
    }
    Ok(frames.len())
}
