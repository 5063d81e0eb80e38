use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use super::protocol::{Request, Response};

const INBOX_CAPACITY: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("no listener in the {context} context")]
    Closed { context: &'static str },

    #[error("{context} context dropped the {request} request without replying")]
    NoReply {
        context: &'static str,
        request: &'static str,
    },

    #[error("{context} context does not handle {request}")]
    Unhandled {
        context: &'static str,
        request: &'static str,
    },

    #[error("{context} context sent an unexpected reply to {request}")]
    UnexpectedResponse {
        context: &'static str,
        request: &'static str,
    },
}

/// A request together with the slot for its single reply.
#[derive(Debug)]
pub struct Envelope {
    pub request: Request,
    pub reply: Replier,
}

impl Envelope {
    pub fn respond(self, response: Response) {
        self.reply.send(response);
    }
}

/// Consumed by its one and only reply.
#[derive(Debug)]
pub struct Replier(oneshot::Sender<Response>);

impl Replier {
    pub fn send(self, response: Response) {
        if self.0.send(response).is_err() {
            tracing::debug!(target: "transport", "requester went away before the reply");
        }
    }
}

/// Sending half, cheap to clone and hand to other contexts.
#[derive(Debug, Clone)]
pub struct Endpoint {
    context: &'static str,
    sender: mpsc::Sender<Envelope>,
}

/// Receiving half, owned by the context that serves requests.
#[derive(Debug)]
pub struct Inbox {
    context: &'static str,
    receiver: mpsc::Receiver<Envelope>,
}

pub fn channel(context: &'static str) -> (Endpoint, Inbox) {
    let (sender, receiver) = mpsc::channel(INBOX_CAPACITY);
    (
        Endpoint { context, sender },
        Inbox { context, receiver },
    )
}

impl Endpoint {
    /// Sends one request and waits for its reply.
    pub async fn request(&self, request: Request) -> Result<Response, TransportError> {
        let kind = request.kind();
        let (reply, response) = oneshot::channel();

        self.sender
            .send(Envelope {
                request,
                reply: Replier(reply),
            })
            .await
            .map_err(|_| TransportError::Closed {
                context: self.context,
            })?;

        match response.await {
            Ok(Response::Unhandled) => Err(TransportError::Unhandled {
                context: self.context,
                request: kind,
            }),
            Ok(response) => Ok(response),
            Err(_) => Err(TransportError::NoReply {
                context: self.context,
                request: kind,
            }),
        }
    }

    pub fn unexpected(&self, request: &'static str) -> TransportError {
        TransportError::UnexpectedResponse {
            context: self.context,
            request,
        }
    }
}

impl Inbox {
    pub fn context(&self) -> &'static str {
        self.context
    }

    pub async fn recv(&mut self) -> Option<Envelope> {
        self.receiver.recv().await
    }
}
