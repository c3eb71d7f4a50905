//! Line-per-package output

use std::io::{self, Write};

use console::Style;

use super::{Renderer, label_width, package_label};
use crate::engine::EngineEvent;
use crate::manifest::Package;

/// Prints one line when a package finishes and `Ok` at the end.
///
/// Intermediate steps are not shown.
pub struct PlainRenderer<W: Write + Send = io::Stdout> {
    out: W,
    width: usize,
}

impl PlainRenderer {
    pub fn new(packages: &[Package]) -> Self {
        Self::with_writer(packages, io::stdout())
    }
}

impl<W: Write + Send> PlainRenderer<W> {
    pub fn with_writer(packages: &[Package], out: W) -> Self {
        Self {
            out,
            width: label_width(packages),
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&self, event: &EngineEvent) -> Option<String> {
        let (package, status) = match event {
            EngineEvent::AlreadyUpToDate { package } => {
                (package, Style::new().green().apply_to("already up-to-date"))
            }
            EngineEvent::Done { package } => (package, Style::new().green().apply_to("done")),
            EngineEvent::AllDone => {
                return Some(format!("\n{}", Style::new().bold().apply_to("Ok")));
            }
            _ => return None,
        };
        Some(format!(
            "{:<width$}{status}",
            package_label(package),
            width = self.width
        ))
    }
}

impl<W: Write + Send> Renderer for PlainRenderer<W> {
    fn render(&mut self, event: &EngineEvent) {
        if let Some(line) = self.line(event) {
            // output errors only mean nobody is watching
            let _ = writeln!(self.out, "{line}");
        }
    }
}
