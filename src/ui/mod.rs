//! Presentation of sync progress
//!
//! Renderers are pure consumers of [`EngineEvent`]s: they never feed back
//! into the engine. Two flavours exist:
//! - [`ProgressRenderer`]: one indicatif bar per package (default)
//! - [`PlainRenderer`]: one line per finished package, for logs and pipes
//!
//! [`drive`] pumps a channel subscribed on the engine into a renderer until
//! the run is over.

mod plain;
mod progress;

pub use plain::PlainRenderer;
pub use progress::ProgressRenderer;

use std::sync::mpsc::Receiver;

use crate::engine::EngineEvent;
use crate::manifest::Package;

/// Something that turns engine events into output
pub trait Renderer: Send {
    fn render(&mut self, event: &EngineEvent);

    /// The run failed; leave whatever is on screen in place
    fn abandon(&mut self) {}
}

/// Render events until [`EngineEvent::AllDone`] or until the sending side is
/// dropped. Returns whether `AllDone` was seen.
pub fn drive(renderer: &mut dyn Renderer, events: Receiver<EngineEvent>) -> bool {
    for event in events {
        renderer.render(&event);
        if event == EngineEvent::AllDone {
            return true;
        }
    }
    renderer.abandon();
    false
}

/// `Foo.Bar (1.0.0.12)`
pub(crate) fn package_label(package: &Package) -> String {
    format!("{} ({})", package.package_id, package.package_version)
}

/// Width of the widest package label plus one space
pub(crate) fn label_width(packages: &[Package]) -> usize {
    packages
        .iter()
        .map(|p| package_label(p).chars().count())
        .max()
        .unwrap_or(0)
        + 1
}
