//! Structured events emitted during a render pass.
//!
//! Components receive an [`EventSink`] instead of logging through a global.
//! The default sink forwards to `tracing`; tests can record into a
//! [`MemorySink`] and assert on what happened.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    TargetDeleted {
        path: PathBuf,
    },
    TargetCreated {
        path: PathBuf,
    },
    SourceScanned {
        root: PathBuf,
        files: usize,
    },
    StylesheetInstalled {
        name: String,
    },
    PageRendered {
        source: String,
        target: String,
    },
    LinkRewritten {
        page: String,
        from: String,
        to: String,
    },
    ExtensionIgnored {
        name: String,
    },
    AssetCopied {
        path: String,
    },
    EngineFinished {
        engine: String,
        claimed: usize,
    },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: RenderEvent);
}

/// Forwards events to the `tracing` subscriber installed by the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: RenderEvent) {
        match event {
            RenderEvent::TargetDeleted { path } => {
                info!(path = %path.display(), "deleting target directory")
            }
            RenderEvent::TargetCreated { path } => {
                info!(path = %path.display(), "creating target directory")
            }
            RenderEvent::SourceScanned { root, files } => {
                debug!(root = %root.display(), files, "scanned source directory")
            }
            RenderEvent::StylesheetInstalled { name } => {
                debug!(%name, "installed stylesheet")
            }
            RenderEvent::PageRendered { source, target } => {
                info!(%source, %target, "rendered page")
            }
            RenderEvent::LinkRewritten { page, from, to } => {
                debug!(%page, %from, %to, "rewrote link")
            }
            RenderEvent::ExtensionIgnored { name } => {
                warn!(%name, "ignoring unsupported markdown extension")
            }
            RenderEvent::AssetCopied { path } => debug!(%path, "copied asset"),
            RenderEvent::EngineFinished { engine, claimed } => {
                debug!(%engine, claimed, "engine finished")
            }
        }
    }
}

/// Records every event, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<RenderEvent>>,
}

impl MemorySink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<RenderEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: RenderEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

pub fn default_sink() -> Arc<dyn EventSink> {
    Arc::new(TracingSink)
}
