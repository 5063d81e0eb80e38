pub mod protocol;
pub mod transport;

pub use protocol::{Request, Response, ScoreReply};
pub use transport::{Endpoint, Envelope, Inbox, TransportError, channel};
