mod client;
pub use client::Client;

mod config;
pub use config::Config;

mod error;
pub use error::{Error, IntentError, SubmitError};

mod intent;
pub use intent::{downvote, upvote, Intent, IntentKind, Stamp, Write};

mod notify;
pub use notify::{Level, LogNotifier, Notification, Notifier};

mod order;
pub use order::OrderExt;

mod query;
pub use query::{Query, QueryState, ResourceKey};

mod remote;
pub use remote::{HttpRemote, Remote};

mod session;
pub use session::Session;

mod sync;
pub use sync::SyncClient;

mod tree;
pub use tree::CommentTree;

pub mod api {
    pub use palaver_api::*;
}

pub mod prelude {
    pub use crate::{OrderExt, Remote};
}
