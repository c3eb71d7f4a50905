//! Sync command: bring the output folder up to date with the manifest

use std::path::Path;
use std::thread;

use console::Term;
use tracing::{info, warn};

use super::{ensure_output_root, load_manifest};
use crate::cli::SyncArgs;
use crate::engine::Engine;
use crate::error::Result;
use crate::storage::LocalFolder;
use crate::ui::{self, PlainRenderer, ProgressRenderer, Renderer};

/// Run sync command
pub fn run(vendors: &Path, args: SyncArgs) -> Result<()> {
    let manifest = load_manifest(vendors)?;
    ensure_output_root(&args.folder)?;
    let storage = LocalFolder::new(&args.folder)?;

    let mut engine = Engine::new(&manifest)?;
    if args.force {
        engine.force_refresh();
    }

    let cancel = engine.cancel_handle();
    if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
        warn!(error = %e, "could not install Ctrl-C handler, interrupting will not stop cleanly");
    }

    let plain = args.plain || !Term::stderr().features().is_attended();
    let mut renderer: Box<dyn Renderer> = if plain {
        Box::new(PlainRenderer::new(&manifest.packages))
    } else {
        Box::new(ProgressRenderer::new(&manifest.packages))
    };

    let (subscription, events) = engine.events().channel();
    let render = thread::spawn(move || ui::drive(renderer.as_mut(), events));

    let result = engine.run(&storage);
    // unsubscribing drops the sender, so the renderer also stops after a failure
    engine.events().unsubscribe(subscription);
    if render.join().is_err() {
        warn!("renderer stopped unexpectedly");
    }

    let summary = result?;
    info!(
        root = %storage.root().display(),
        fetched = summary.fetched,
        up_to_date = summary.up_to_date,
        "vendoring complete"
    );
    Ok(())
}
