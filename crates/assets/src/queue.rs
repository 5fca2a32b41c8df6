use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::asset::Asset;
use crate::error::AssetError;
use crate::id::{AssetId, AssetRequest};

/// Completion of a load request.
#[derive(Debug)]
pub enum AssetEvent {
    Loaded { request: AssetRequest, asset: Asset },
    Failed { request: AssetRequest, error: AssetError },
}

impl AssetEvent {
    pub fn id(&self) -> AssetId {
        self.request().id
    }

    pub fn request(&self) -> &AssetRequest {
        match self {
            Self::Loaded { request, .. } | Self::Failed { request, .. } => request,
        }
    }
}

/// Create a connected outbox/inbox pair.
pub fn asset_channel() -> (AssetOutbox, AssetInbox) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (AssetOutbox { tx }, AssetInbox { rx })
}

/// Sending half, handed to loaders. Cheap to clone, `Send`.
#[derive(Debug, Clone)]
pub struct AssetOutbox {
    tx: Sender<AssetEvent>,
}

impl AssetOutbox {
    /// Post a completion back to the control thread. Returns `false` when
    /// the receiving host no longer exists; the event is dropped.
    pub fn deliver(&self, event: AssetEvent) -> bool {
        let id = event.id();
        match self.tx.send(event) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(%id, "asset host is gone, dropping result");
                false
            }
        }
    }
}

/// Receiving half, owned by the scene host and drained between frames.
/// `Send + Sync`, so a host can live behind a shared reference.
#[derive(Debug)]
pub struct AssetInbox {
    rx: Receiver<AssetEvent>,
}

impl AssetInbox {
    pub fn try_next(&self) -> Option<AssetEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Take everything that has arrived so far, in arrival order.
    pub fn drain(&self) -> Vec<AssetEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::AssetKind;

    fn failed(path: &str) -> AssetEvent {
        AssetEvent::Failed {
            request: AssetRequest::new(AssetKind::Texture, path),
            error: AssetError::Unsupported("test".into()),
        }
    }

    #[test]
    fn drain_preserves_arrival_order() {
        let (outbox, inbox) = asset_channel();
        assert!(outbox.deliver(failed("a.png")));
        assert!(outbox.deliver(failed("b.png")));

        let events = inbox.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].request().path.to_str(), Some("a.png"));
        assert_eq!(events[1].request().path.to_str(), Some("b.png"));
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn delivery_to_dropped_inbox_is_refused() {
        let (outbox, inbox) = asset_channel();
        drop(inbox);
        assert!(!outbox.deliver(failed("a.png")));
    }

    #[test]
    fn outbox_clones_deliver_from_other_threads() {
        let (outbox, inbox) = asset_channel();
        let remote = outbox.clone();
        std::thread::spawn(move || remote.deliver(failed("t.png")))
            .join()
            .unwrap();
        assert_eq!(inbox.drain().len(), 1);
    }

    #[test]
    fn events_survive_every_outbox_dropping() {
        let (outbox, inbox) = asset_channel();
        let remote = outbox.clone();
        assert!(remote.deliver(failed("late.png")));
        drop(remote);
        drop(outbox);

        let events = inbox.drain();
        assert_eq!(events.len(), 1);
        assert!(inbox.try_next().is_none());
    }

    #[test]
    fn inbox_is_shareable_between_threads() {
        fn shareable<T: Send + Sync>() {}
        shareable::<AssetInbox>();
        shareable::<AssetOutbox>();
    }
}
