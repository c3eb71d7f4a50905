//! Progress events emitted by the sync engine
//!
//! Listeners subscribe on the engine's [`EventBus`] before a run. Every event
//! is delivered to every listener in emission order. Events of one source
//! group never reorder; events of different groups may interleave.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::manifest::{Package, Source};

/// Something the engine did or is about to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Probing the source for the package
    Resolving { package: Package, source: Source },
    /// Archive download started
    Downloading { package: Package, source: Source },
    /// Archive fully written to the output folder
    Downloaded { package: Package, source: Source },
    /// Purging the output folder before extraction
    Cleaning { package: Package, folder: String },
    /// Visiting archive entry `current` (0-based) of `total`
    Decompressing {
        package: Package,
        source: Source,
        entry: String,
        current: usize,
        total: usize,
    },
    /// Marker already names the pinned version, nothing fetched
    AlreadyUpToDate { package: Package },
    /// Package extracted and marker written
    Done { package: Package },
    /// Every source group finished; always the last event of a run
    AllDone,
}

impl EngineEvent {
    /// The package this event concerns, `None` for [`EngineEvent::AllDone`]
    pub fn package(&self) -> Option<&Package> {
        match self {
            EngineEvent::Resolving { package, .. }
            | EngineEvent::Downloading { package, .. }
            | EngineEvent::Downloaded { package, .. }
            | EngineEvent::Cleaning { package, .. }
            | EngineEvent::Decompressing { package, .. }
            | EngineEvent::AlreadyUpToDate { package }
            | EngineEvent::Done { package } => Some(package),
            EngineEvent::AllDone => None,
        }
    }
}

type Listener = Arc<dyn Fn(&EngineEvent) + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Observer list owned by one engine
#[derive(Default)]
pub struct EventBus {
    listeners: Mutex<Vec<(Subscription, Listener)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn listeners(&self) -> MutexGuard<'_, Vec<(Subscription, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener called synchronously for every event.
    ///
    /// Listeners of different source groups may run concurrently. A listener
    /// may itself subscribe or unsubscribe on the same bus.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&EngineEvent) + Send + Sync + 'static,
    {
        let subscription = Subscription(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners().push((subscription, Arc::new(listener)));
        subscription
    }

    /// Remove a listener; false when it was not subscribed.
    ///
    /// An emission already in progress still reaches the removed listener.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut listeners = self.listeners();
        let before = listeners.len();
        listeners.retain(|(s, _)| *s != subscription);
        listeners.len() != before
    }

    /// Subscribe a buffered channel.
    ///
    /// The receiver yields events until the bus is dropped or the
    /// subscription removed.
    pub fn channel(&self) -> (Subscription, Receiver<EngineEvent>) {
        let (tx, rx) = mpsc::channel();
        let subscription = self.subscribe(move |event| {
            // a dropped receiver only means nobody is rendering
            let _ = tx.send(event.clone());
        });
        (subscription, rx)
    }

    /// Deliver an event to every listener registered when the call starts
    pub fn emit(&self, event: &EngineEvent) {
        let listeners: Vec<Listener> = self
            .listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}
