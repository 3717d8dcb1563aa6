//! Configuration file watcher for hot reload.
//!
//! Each file event reloads and validates the file, then compares it with the
//! last configuration handed out. Saves that change nothing effective
//! (whitespace, comments, editor touch) are dropped; otherwise the changed
//! sections are logged and the new configuration is sent to the server.

use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Watcher, RecursiveMode, Event, RecommendedWatcher, Config};
use tokio::sync::mpsc;
use crate::config::loader::load_config;
use crate::config::schema::ServiceConfig;

/// Top-level sections that differ between two configurations.
pub fn changed_sections(old: &ServiceConfig, new: &ServiceConfig) -> Vec<&'static str> {
    let mut sections = Vec::new();
    if old.listener != new.listener {
        sections.push("listener");
    }
    if old.department_service != new.department_service {
        sections.push("department_service");
    }
    if old.circuit_breaker != new.circuit_breaker {
        sections.push("circuit_breaker");
    }
    if old.timeouts != new.timeouts {
        sections.push("timeouts");
    }
    if old.observability != new.observability {
        sections.push("observability");
    }
    if old.admin != new.admin {
        sections.push("admin");
    }
    sections
}

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    current: ServiceConfig,
    update_tx: mpsc::UnboundedSender<ServiceConfig>,
}

impl ConfigWatcher {
    /// Create a watcher for `path`, starting from the configuration the
    /// service was launched with.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(
        path: &Path,
        current: ServiceConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ServiceConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (Self {
            path: path.to_path_buf(),
            current,
            update_tx,
        }, update_rx)
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for events to keep flowing.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let ConfigWatcher { path, mut current, update_tx } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        match load_config(&path) {
                            Ok(new_config) => {
                                if let Some(sections) = forward_if_changed(&mut current, new_config, &update_tx) {
                                    tracing::info!(sections = ?sections, "Config file changed, reloading");
                                }
                            }
                            Err(e) => {
                                tracing::error!("Failed to reload config: {}. Keeping current configuration.", e);
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Config watcher started");
        Ok(watcher)
    }
}

/// Send `new_config` if it differs from `current`, returning the changed
/// sections. Unchanged reloads return `None` and send nothing.
fn forward_if_changed(
    current: &mut ServiceConfig,
    new_config: ServiceConfig,
    tx: &mpsc::UnboundedSender<ServiceConfig>,
) -> Option<Vec<&'static str>> {
    let sections = changed_sections(current, &new_config);
    if sections.is_empty() {
        tracing::debug!("Config file touched without effective changes, skipping reload");
        return None;
    }

    *current = new_config.clone();
    if tx.send(new_config).is_err() {
        tracing::debug!("Config receiver dropped, ignoring reload");
    }
    Some(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_changed_sections() {
        let old = ServiceConfig::default();
        assert!(changed_sections(&old, &old.clone()).is_empty());

        let mut new = old.clone();
        new.circuit_breaker.cooldown_ms = 5_000;
        new.admin.enabled = true;
        assert_eq!(changed_sections(&old, &new), vec!["circuit_breaker", "admin"]);
    }

    #[test]
    fn test_unchanged_reload_is_skipped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut current = ServiceConfig::default();

        assert_eq!(forward_if_changed(&mut current, ServiceConfig::default(), &tx), None);
        assert!(rx.try_recv().is_err());

        let mut reloaded = ServiceConfig::default();
        reloaded.circuit_breaker.failure_threshold = 2;
        assert_eq!(
            forward_if_changed(&mut current, reloaded.clone(), &tx),
            Some(vec!["circuit_breaker"])
        );
        assert_eq!(rx.try_recv().unwrap(), reloaded);
        assert_eq!(current, reloaded);

        // Saving the same content again is a no-op.
        assert_eq!(forward_if_changed(&mut current, reloaded, &tx), None);
        assert!(rx.try_recv().is_err());
    }
}
