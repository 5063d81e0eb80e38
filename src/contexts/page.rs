use tokio::task::JoinHandle;

use crate::{
    domain::{PostList, ProfileSnapshot, ScoreLabel},
    infrastructure::shutdown::ShutdownListener,
    messaging::{Endpoint, Envelope, Inbox, Request, Response, TransportError},
    page::{DocumentTree, NodeId, PageExtractor, SharedDocument, badge},
};

/// Page-resident context for one tab: answers extraction requests, applies
/// scores, and keeps badges on identity elements the host renders later.
pub struct PageContext {
    document: SharedDocument,
    location: String,
}

impl PageContext {
    pub fn new(document: SharedDocument, location: impl Into<String>) -> Self {
        Self {
            document,
            location: location.into(),
        }
    }

    pub fn spawn(self, inbox: Inbox, shutdown: ShutdownListener) -> JoinHandle<()> {
        tokio::spawn(async move { self.run_loop(inbox, shutdown).await })
    }

    async fn run_loop(self, mut inbox: Inbox, mut shutdown: ShutdownListener) {
        // Subscribe before the first scan so nothing rendered in between is missed.
        let mut watcher = {
            let mut doc = self.document.lock();
            let watcher = doc.watch();
            let root = doc.root();
            let attached = badge::scan_for_identities(&mut *doc, root);
            tracing::info!(
                target: "page",
                context = inbox.context(),
                location = %self.location,
                attached,
                "page context started"
            );
            watcher
        };

        loop {
            tokio::select! {
                _ = shutdown.notified() => break,
                Some(mut batch) = watcher.next_batch() => {
                    batch.extend(watcher.drain_pending());
                    self.on_inserted(&batch);
                }
                envelope = inbox.recv() => match envelope {
                    Some(envelope) => self.dispatch(envelope),
                    None => break,
                },
            }
        }
        tracing::info!(target: "page", "page context stopped");
    }

    fn on_inserted(&self, batch: &[NodeId]) {
        let mut doc = self.document.lock();
        let attached = badge::annotate_inserted(&mut *doc, batch);
        if attached > 0 {
            tracing::debug!(target: "badge", attached, "annotated inserted identities");
        }
    }

    fn dispatch(&self, envelope: Envelope) {
        let response = match &envelope.request {
            Request::GetProfileInfo => {
                let doc = self.document.lock();
                Response::Profile {
                    profile: PageExtractor::new(&*doc, &self.location).profile_info(),
                }
            }
            Request::GetRecentPosts => {
                let doc = self.document.lock();
                Response::Posts {
                    posts: PageExtractor::new(&*doc, &self.location).recent_posts(),
                }
            }
            Request::SetProfileScore { level } => {
                let mut doc = self.document.lock();
                let updated = badge::apply_score(&mut *doc, *level);
                tracing::info!(target: "badge", level = %level, updated, "applied profile score");
                Response::Ack { ok: true }
            }
            other => {
                tracing::debug!(target: "page", request = other.kind(), "ignoring request");
                Response::Unhandled
            }
        };
        envelope.respond(response);
    }
}

pub async fn request_profile_info(
    page: &Endpoint,
) -> Result<Option<ProfileSnapshot>, TransportError> {
    match page.request(Request::GetProfileInfo).await? {
        Response::Profile { profile } => Ok(profile),
        _ => Err(page.unexpected("get-profile-info")),
    }
}

pub async fn request_recent_posts(page: &Endpoint) -> Result<PostList, TransportError> {
    match page.request(Request::GetRecentPosts).await? {
        Response::Posts { posts } => Ok(posts),
        _ => Err(page.unexpected("get-recent-posts")),
    }
}

pub async fn send_profile_score(page: &Endpoint, level: ScoreLabel) -> Result<(), TransportError> {
    match page.request(Request::SetProfileScore { level }).await? {
        Response::Ack { .. } => Ok(()),
        _ => Err(page.unexpected("set-profile-score")),
    }
}
