//! Filesystem watcher that drives live reload broadcasts.

use std::path::{Path, PathBuf};
use std::time::Instant;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::observability::metrics;
use crate::reload::policy::ReloadTrigger;
use crate::reload::registry::{BroadcastReport, ClientRegistry};

/// Watches the served root and tells every connected client to reload.
///
/// The watcher lives as long as this value; dropping it stops the watch and
/// ends the background dispatch task.
pub struct ChangeNotifier {
    root: PathBuf,
    trigger: ReloadTrigger,
    registry: ClientRegistry,
    watcher: Option<RecommendedWatcher>,
}

impl ChangeNotifier {
    pub fn new(root: &Path, trigger: ReloadTrigger, registry: ClientRegistry) -> Self {
        Self {
            root: root.to_path_buf(),
            trigger,
            registry,
            watcher: None,
        }
    }

    /// Start watching the root recursively.
    ///
    /// Must be called from within a tokio runtime: the dispatch loop is
    /// spawned onto it.
    pub fn start(&mut self) -> Result<(), notify::Error> {
        let (tx, mut rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

        // The notify callback runs on its own thread; never block it.
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        self.watcher = Some(watcher);

        let trigger = self.trigger;
        let registry = self.registry.clone();
        tokio::spawn(async move {
            while let Some(res) = rx.recv().await {
                match res {
                    Ok(event) => {
                        Self::dispatch(&event, trigger, &registry);
                    }
                    Err(e) => tracing::warn!(error = %e, "Watch error"),
                }
            }
            tracing::debug!("Change notifier stopped");
        });

        tracing::info!(root = %self.root.display(), trigger = ?self.trigger, "Watching for changes");
        Ok(())
    }

    /// Whether the watcher is running.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Apply the reload policy to one event and broadcast if it qualifies.
    ///
    /// Each qualifying event yields one broadcast; bursts are not coalesced.
    pub fn dispatch(
        event: &Event,
        trigger: ReloadTrigger,
        registry: &ClientRegistry,
    ) -> Option<BroadcastReport> {
        if !trigger.qualifies(&event.kind) {
            tracing::trace!(kind = ?event.kind, "Ignoring filesystem event");
            return None;
        }

        let start = Instant::now();
        let report = registry.broadcast();
        metrics::record_reload_broadcast(report.delivered, report.failed);

        tracing::info!(
            paths = ?event.paths,
            kind = ?event.kind,
            delivered = report.delivered,
            failed = report.failed,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Reload broadcast"
        );
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::registry::ChannelSink;
    use notify::event::{CreateKind, DataChange, EventKind, ModifyKind};
    use std::sync::Arc;
    use std::time::Duration;

    fn modify_event(path: &str) -> Event {
        Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Content))).add_path(path.into())
    }

    #[test]
    fn test_dispatch_broadcasts_on_modify() {
        let registry = ClientRegistry::new();
        let (sink, mut rx) = ChannelSink::new(4);
        registry.register(Arc::new(sink));

        let report = ChangeNotifier::dispatch(&modify_event("/site/a.css"), ReloadTrigger::Modify, &registry);
        assert_eq!(report, Some(BroadcastReport { delivered: 1, failed: 0 }));
        assert_eq!(rx.try_recv(), Ok(()));
    }

    #[test]
    fn test_dispatch_ignores_create_under_modify_policy() {
        let registry = ClientRegistry::new();
        let (sink, mut rx) = ChannelSink::new(4);
        registry.register(Arc::new(sink));

        let event = Event::new(EventKind::Create(CreateKind::File)).add_path("/site/new.js".into());
        assert!(ChangeNotifier::dispatch(&event, ReloadTrigger::Modify, &registry).is_none());
        assert!(rx.try_recv().is_err());

        assert!(ChangeNotifier::dispatch(&event, ReloadTrigger::Any, &registry).is_some());
        assert_eq!(rx.try_recv(), Ok(()));
    }

    #[test]
    fn test_burst_yields_one_broadcast_per_event() {
        let registry = ClientRegistry::new();
        let (sink, mut rx) = ChannelSink::new(16);
        registry.register(Arc::new(sink));

        for _ in 0..5 {
            ChangeNotifier::dispatch(&modify_event("/site/a.css"), ReloadTrigger::Modify, &registry);
        }
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 5);
    }

    #[test]
    fn test_dispatch_with_no_clients() {
        let registry = ClientRegistry::new();
        let report = ChangeNotifier::dispatch(&modify_event("/x"), ReloadTrigger::Modify, &registry);
        assert_eq!(report, Some(BroadcastReport::default()));
    }

    #[tokio::test]
    async fn test_file_write_reaches_client() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let file = root.join("style.css");
        std::fs::write(&file, "body {}").unwrap();

        let registry = ClientRegistry::new();
        let (sink, mut rx) = ChannelSink::new(16);
        registry.register(Arc::new(sink));

        let mut notifier = ChangeNotifier::new(&root, ReloadTrigger::Modify, registry);
        notifier.start().unwrap();
        assert!(notifier.is_watching());

        let mut received = false;
        for attempt in 0..20 {
            std::fs::write(&file, format!("body {{ order: {attempt} }}")).unwrap();
            if tokio::time::timeout(Duration::from_millis(250), rx.recv()).await.is_ok() {
                received = true;
                break;
            }
        }
        assert!(received, "no reload after modifying a watched file");
    }
}
