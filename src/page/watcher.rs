use tokio::sync::mpsc;

use super::tree::NodeId;

/// Subscription to subtree insertions on a document. Each batch holds the
/// roots of the newly inserted subtrees, in insertion order.
///
/// The subscription stays registered until the watcher is dropped.
#[derive(Debug)]
pub struct MutationWatcher {
    receiver: mpsc::UnboundedReceiver<Vec<NodeId>>,
}

/// Document-side half of a [`MutationWatcher`].
#[derive(Debug, Clone)]
pub(crate) struct MutationSink {
    sender: mpsc::UnboundedSender<Vec<NodeId>>,
}

pub(crate) fn subscription() -> (MutationSink, MutationWatcher) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (MutationSink { sender }, MutationWatcher { receiver })
}

impl MutationSink {
    /// Returns `false` once the watcher has been dropped.
    pub(crate) fn publish(&self, batch: Vec<NodeId>) -> bool {
        self.sender.send(batch).is_ok()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl MutationWatcher {
    /// Waits for the next batch; `None` when the document is gone.
    pub async fn next_batch(&mut self) -> Option<Vec<NodeId>> {
        self.receiver.recv().await
    }

    /// Drains whatever is queued without waiting, merged into one batch.
    pub fn drain_pending(&mut self) -> Vec<NodeId> {
        let mut merged = Vec::new();
        while let Ok(batch) = self.receiver.try_recv() {
            merged.extend(batch);
        }
        merged
    }
}
