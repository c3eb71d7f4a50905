//! Progress bars, one line per package

use std::collections::HashMap;

use console::Style;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

use super::{Renderer, label_width, package_label};
use crate::engine::EngineEvent;
use crate::manifest::Package;

const TEMPLATE: &str = "{prefix} [{bar:30.cyan/blue}] {msg}";

/// Interactive renderer showing every package of the manifest at once
pub struct ProgressRenderer {
    multi: MultiProgress,
    bars: HashMap<Package, ProgressBar>,
}

impl ProgressRenderer {
    /// Bars drawn to stderr
    pub fn new(packages: &[Package]) -> Self {
        Self::with_draw_target(packages, ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(packages: &[Package], target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        let width = label_width(packages);
        let dim = Style::new().dim();

        let mut bars = HashMap::new();
        for package in packages {
            if bars.contains_key(package) {
                continue;
            }
            let bar = multi.add(ProgressBar::new(1));
            bar.set_style(style.clone());
            bar.set_prefix(format!(
                "{}",
                dim.apply_to(format!("{:<width$}", package_label(package)))
            ));
            bar.set_message("waiting");
            bars.insert(package.clone(), bar);
        }
        Self { multi, bars }
    }

    fn bar(&self, package: &Package) -> Option<&ProgressBar> {
        self.bars.get(package)
    }
}

impl Renderer for ProgressRenderer {
    fn render(&mut self, event: &EngineEvent) {
        let Some(bar) = event.package().and_then(|p| self.bar(p)) else {
            if *event == EngineEvent::AllDone {
                let _ = self
                    .multi
                    .println(format!("{}", Style::new().green().apply_to("All done")));
            }
            return;
        };

        let yellow = Style::new().yellow();
        let green = Style::new().green();
        match event {
            EngineEvent::Resolving { source, .. } => {
                bar.set_message(format!(
                    "{}",
                    yellow.apply_to(format!("Resolving (from {})", source.name))
                ));
            }
            EngineEvent::Downloading { source, .. } => {
                bar.set_message(format!(
                    "{}",
                    yellow.apply_to(format!("Downloading (from {})", source.name))
                ));
            }
            EngineEvent::Downloaded { .. } => bar.set_message("Downloaded"),
            EngineEvent::Cleaning { .. } => {
                bar.set_message(format!("{}", yellow.apply_to("Cleaning")));
            }
            EngineEvent::Decompressing { current, total, .. } => {
                bar.set_length(*total as u64);
                bar.set_position(*current as u64 + 1);
                bar.set_message(format!(
                    "{}",
                    yellow.apply_to(format!("Decompressing {:05}/{:05}", current + 1, total))
                ));
            }
            EngineEvent::AlreadyUpToDate { .. } => {
                bar.set_position(bar.length().unwrap_or(1));
                bar.finish_with_message(format!("{}", green.apply_to("Up to date")));
            }
            EngineEvent::Done { .. } => {
                bar.set_position(bar.length().unwrap_or(1));
                bar.finish_with_message(format!("{}", green.apply_to("Done")));
            }
            EngineEvent::AllDone => {}
        }
    }

    fn abandon(&mut self) {
        for bar in self.bars.values() {
            if !bar.is_finished() {
                bar.abandon();
            }
        }
    }
}
