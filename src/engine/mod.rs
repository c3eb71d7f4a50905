//! Sync engine
//!
//! Brings an output tree up to date with the versions pinned in a manifest.
//!
//! Packages are grouped by source. Each source group runs on its own worker
//! thread and processes its packages one after another in manifest order.
//! For every package the engine:
//!
//! 1. skips it when the folder's version marker already names the pinned
//!    version (unless a forced refresh was requested)
//! 2. looks the package up in its source
//! 3. downloads the archive into the output folder
//! 4. purges the folder, keeping the fresh archive, when `clean` is set
//! 5. extracts the archive
//! 6. writes the version marker
//!
//! Progress is reported through the engine's [`EventBus`]. Once every group
//! finished, [`EngineEvent::AllDone`] is emitted exactly once.

mod events;
mod extract;
mod marker;


pub use events::{EngineEvent, EventBus};
pub use marker::{MARKER_FILE, VersionMarker};

use extract::extract_archive;

use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tracing::{debug, info, warn};

use crate::error::{NuvendError, Result, feed, manifest as manifest_error};
use crate::feed::{PackageRepository, open_repository};
use crate::manifest::{Package, ParsedManifest, Source};
use crate::storage::{self, LocalBaseFolder};
use crate::version::{PackageIdentity, PackageVersion};

/// Cooperative cancellation flag shared with a running engine
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Ask the engine to stop before its next step
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Packages downloaded and extracted
    pub fetched: usize,
    /// Packages whose marker already matched
    pub up_to_date: usize,
}

impl std::ops::Add for RunSummary {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            fetched: self.fetched + other.fetched,
            up_to_date: self.up_to_date + other.up_to_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Fetched,
    UpToDate,
}

struct PendingPackage {
    package: Package,
    identity: PackageIdentity,
}

/// All packages of one source, processed by one worker
struct SourceGroup {
    source: Source,
    repository: Arc<dyn PackageRepository>,
    packages: Vec<PendingPackage>,
}

/// Synchronizes the packages of one manifest
pub struct Engine {
    groups: Vec<SourceGroup>,
    force_refresh: bool,
    events: EventBus,
    cancel: CancelHandle,
}

impl Engine {
    /// Build an engine for a validated manifest, opening one repository per
    /// declared source
    pub fn new(manifest: &ParsedManifest) -> Result<Self> {
        Self::with_repositories(manifest, open_repository)
    }

    /// Build an engine with a custom repository factory
    pub fn with_repositories<F>(manifest: &ParsedManifest, mut open: F) -> Result<Self>
    where
        F: FnMut(&Source) -> Result<Arc<dyn PackageRepository>>,
    {
        let mut repositories: HashMap<&str, Arc<dyn PackageRepository>> = HashMap::new();
        for name in manifest.source_names() {
            let Some(source) = manifest.source(name) else {
                continue;
            };
            if manifest.sources.iter().filter(|s| s.name == name).count() > 1 {
                warn!(
                    source = name,
                    url = %source.url,
                    "source declared more than once, using the last declaration"
                );
            }
            debug!(source = name, url = %source.url, "opening repository");
            repositories.insert(name, open(source)?);
        }

        let mut groups: Vec<SourceGroup> = Vec::new();
        for package in &manifest.packages {
            let source = manifest
                .source(&package.source_name)
                .ok_or_else(|| manifest_error::unknown_source(&package.source_name))?;
            let repository = repositories
                .get(source.name.as_str())
                .cloned()
                .ok_or_else(|| manifest_error::unknown_source(&source.name))?;
            let identity = PackageIdentity::parse(&package.package_id, &package.package_version)?;

            let pending = PendingPackage {
                package: package.clone(),
                identity,
            };
            match groups.iter_mut().find(|g| g.source.name == source.name) {
                Some(group) => group.packages.push(pending),
                None => groups.push(SourceGroup {
                    source: source.clone(),
                    repository,
                    packages: vec![pending],
                }),
            }
        }

        warn_shared_folders(&groups);

        Ok(Self {
            groups,
            force_refresh: false,
            events: EventBus::new(),
            cancel: CancelHandle::default(),
        })
    }

    /// Re-fetch every package on the next run, ignoring version markers
    pub fn force_refresh(&mut self) -> &mut Self {
        self.force_refresh = true;
        self
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Handle for stopping a run from another thread, e.g. a Ctrl-C handler
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Number of packages the engine will visit
    pub fn package_count(&self) -> usize {
        self.groups.iter().map(|g| g.packages.len()).sum()
    }

    /// Synchronize every package into `storage`.
    ///
    /// Source groups run concurrently. The first failing group's error is
    /// returned once all groups have stopped; [`EngineEvent::AllDone`] is
    /// only emitted when every group succeeded.
    pub fn run(&self, storage: &dyn LocalBaseFolder) -> Result<RunSummary> {
        debug!(
            groups = self.groups.len(),
            packages = self.package_count(),
            force = self.force_refresh,
            "starting sync"
        );

        let results: Vec<Result<RunSummary>> = thread::scope(|scope| {
            let workers: Vec<_> = self
                .groups
                .iter()
                .map(|group| {
                    let worker = thread::Builder::new()
                        .name(format!("source-{}", group.source.name))
                        .spawn_scoped(scope, move || self.sync_group(storage, group));
                    (group, worker)
                })
                .collect();

            workers
                .into_iter()
                .map(|(group, worker)| -> Result<RunSummary> {
                    let handle = worker?;
                    handle.join().unwrap_or_else(|_| {
                        Err(NuvendError::IoError {
                            message: format!("worker for source '{}' panicked", group.source.name),
                        })
                    })
                })
                .collect()
        });

        let mut summary = RunSummary::default();
        for result in results {
            summary = summary + result?;
        }

        info!(
            fetched = summary.fetched,
            up_to_date = summary.up_to_date,
            "sync finished"
        );
        self.events.emit(&EngineEvent::AllDone);
        Ok(summary)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(NuvendError::Cancelled);
        }
        Ok(())
    }

    fn sync_group(
        &self,
        storage: &dyn LocalBaseFolder,
        group: &SourceGroup,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for pending in &group.packages {
            self.check_cancelled()?;
            match self.sync_package(storage, group, pending)? {
                Outcome::Fetched => summary.fetched += 1,
                Outcome::UpToDate => summary.up_to_date += 1,
            }
        }
        Ok(summary)
    }

    fn sync_package(
        &self,
        storage: &dyn LocalBaseFolder,
        group: &SourceGroup,
        pending: &PendingPackage,
    ) -> Result<Outcome> {
        let package = &pending.package;
        let folder = package.output_folder.as_str();
        let version = pending.identity.version.to_full_string();

        if !self.force_refresh && storage.contains_folder(folder) {
            match VersionMarker::read(storage, folder) {
                Some(marker) if marker.version == version => {
                    debug!(package = %pending.identity, "already up to date");
                    self.events.emit(&EngineEvent::AlreadyUpToDate {
                        package: package.clone(),
                    });
                    return Ok(Outcome::UpToDate);
                }
                Some(marker) => {
                    info!(
                        package = %package.package_id,
                        installed = %marker.version,
                        pinned = %version,
                        "updating package"
                    );
                }
                None => debug!(folder, "no version marker"),
            }
        }

        self.resolve(group, pending);
        self.check_cancelled()?;

        let archive_name = pending.identity.archive_file_name();
        let archive_path = storage::join(folder, &archive_name);
        self.download(storage, group, pending, &archive_path)?;
        self.check_cancelled()?;

        if package.clean_on_update {
            self.events.emit(&EngineEvent::Cleaning {
                package: package.clone(),
                folder: folder.to_string(),
            });
            storage.clean(folder, &[archive_name.as_str()])?;
            self.check_cancelled()?;
        }

        extract_archive(storage, &archive_path, folder, |entry, current, total| {
            self.events.emit(&EngineEvent::Decompressing {
                package: package.clone(),
                source: group.source.clone(),
                entry: entry.to_string(),
                current,
                total,
            });
        })?;

        VersionMarker::new(version).write(storage, folder)?;
        self.events.emit(&EngineEvent::Done {
            package: package.clone(),
        });
        Ok(Outcome::Fetched)
    }

    /// Existence check. The download decides whether the package exists, so
    /// lookup failures are only logged.
    fn resolve(&self, group: &SourceGroup, pending: &PendingPackage) {
        self.events.emit(&EngineEvent::Resolving {
            package: pending.package.clone(),
            source: group.source.clone(),
        });

        let id = &pending.identity.id;
        let wanted = pending.identity.version.to_normalized_string();
        match group.repository.all_versions(id) {
            Ok(versions) => {
                let listed = versions.iter().any(|v| {
                    PackageVersion::parse(id, v)
                        .is_ok_and(|v| v.to_normalized_string().eq_ignore_ascii_case(&wanted))
                });
                if !listed {
                    warn!(
                        package = %id,
                        version = %wanted,
                        source = %group.source.name,
                        "version not listed by source"
                    );
                }
            }
            Err(e) => {
                warn!(
                    package = %id,
                    source = %group.source.name,
                    error = %e,
                    "could not list versions"
                );
            }
        }
    }

    fn download(
        &self,
        storage: &dyn LocalBaseFolder,
        group: &SourceGroup,
        pending: &PendingPackage,
        archive_path: &str,
    ) -> Result<()> {
        let identity = &pending.identity;
        let failed = |reason: String| {
            feed::download_failed(
                &identity.id,
                identity.version.to_full_string(),
                &group.source.name,
                reason,
            )
        };

        let mut sink = storage.open_for_writing(archive_path)?;
        self.events.emit(&EngineEvent::Downloading {
            package: pending.package.clone(),
            source: group.source.clone(),
        });
        info!(package = %identity, source = %group.source.name, "downloading");

        let copied = group
            .repository
            .copy_archive(&identity.id, &identity.version, &mut *sink)
            .map_err(|e| failed(e.to_string()))?;
        if !copied {
            return Err(failed("source has no archive for this version".to_string()));
        }
        sink.flush()?;
        drop(sink);

        self.events.emit(&EngineEvent::Downloaded {
            package: pending.package.clone(),
            source: group.source.clone(),
        });
        Ok(())
    }
}

fn warn_shared_folders(groups: &[SourceGroup]) {
    let mut owners: HashMap<&str, HashSet<&str>> = HashMap::new();
    for group in groups {
        for pending in &group.packages {
            owners
                .entry(pending.package.output_folder.as_str())
                .or_default()
                .insert(group.source.name.as_str());
        }
    }
    for (folder, sources) in owners {
        if sources.len() > 1 {
            let mut sources: Vec<&str> = sources.into_iter().collect();
            sources.sort_unstable();
            warn!(
                folder,
                sources = %sources.join(", "),
                "output folder is shared by packages of different sources; their writes are not coordinated"
            );
        }
    }
}
