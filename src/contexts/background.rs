use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    ai::ClassifierService,
    domain::{PostList, ProfileSnapshot},
    infrastructure::shutdown::ShutdownListener,
    messaging::{Endpoint, Envelope, Inbox, Request, Response, ScoreReply},
};

/// Long-lived context that owns the classifier and answers `score-profile`.
pub struct BackgroundContext {
    classifier: Arc<ClassifierService>,
}

impl BackgroundContext {
    pub fn new(classifier: Arc<ClassifierService>) -> Self {
        Self { classifier }
    }

    pub fn spawn(self, inbox: Inbox, shutdown: ShutdownListener) -> JoinHandle<()> {
        tokio::spawn(async move { self.run_loop(inbox, shutdown).await })
    }

    async fn run_loop(self, mut inbox: Inbox, mut shutdown: ShutdownListener) {
        tracing::info!(target: "background", "background context started");
        loop {
            tokio::select! {
                _ = shutdown.notified() => break,
                envelope = inbox.recv() => match envelope {
                    Some(envelope) => self.dispatch(envelope),
                    None => break,
                },
            }
        }
        tracing::info!(target: "background", "background context stopped");
    }

    fn dispatch(&self, envelope: Envelope) {
        let Envelope { request, reply } = envelope;
        match request {
            Request::ScoreProfile { profile, posts } => {
                let classifier = self.classifier.clone();
                tokio::spawn(async move {
                    let outcome = score(&classifier, profile.as_ref(), &posts).await;
                    reply.send(Response::Score(outcome));
                });
            }
            other => {
                tracing::debug!(target: "background", request = other.kind(), "ignoring request");
                reply.send(Response::Unhandled);
            }
        }
    }
}

async fn score(
    classifier: &ClassifierService,
    profile: Option<&ProfileSnapshot>,
    posts: &PostList,
) -> ScoreReply {
    match classifier.score_profile(profile, posts).await {
        Ok(result) => ScoreReply::scored(result.label),
        Err(err) => {
            tracing::error!(target: "background", error = %err, "failed to score profile");
            ScoreReply::failed(err.to_string())
        }
    }
}

/// Asks the background context for a score. Transport failures come back as
/// a failed reply so callers only deal with one shape.
pub async fn request_profile_score(
    background: &Endpoint,
    profile: Option<ProfileSnapshot>,
    posts: PostList,
) -> ScoreReply {
    match background
        .request(Request::ScoreProfile { profile, posts })
        .await
    {
        Ok(Response::Score(reply)) => reply,
        Ok(_) => ScoreReply::failed(background.unexpected("score-profile").to_string()),
        Err(err) => {
            tracing::warn!(target: "background", error = %err, "error requesting profile score");
            ScoreReply::failed(err.to_string())
        }
    }
}
