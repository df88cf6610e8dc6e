mod comment;
pub use comment::{Comment, CommentId, NewComment, Reply, ReplyId};

mod content;
pub use content::{validate_content, ContentError, MIN_CONTENT_LEN};

mod date;
pub use date::{DisplayDate, Time};

mod error;
pub use error::Error;

mod patch;
pub use patch::CommentPatch;

mod user;
pub use user::{User, UserImage};

pub use uuid::Uuid;

/// Address the remote data store is served from when nothing else is configured
pub const DEFAULT_HOST: &str = "http://localhost:8000";
