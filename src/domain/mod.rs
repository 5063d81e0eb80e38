pub mod profile;
pub mod score;

pub use profile::{MAX_RECENT_POSTS, PostList, PostSnapshot, ProfileSnapshot};
pub use score::{BadgeState, ScoreLabel, ScoreResult};
