use crate::{api::User, IntentError};

/// Identity the intents are submitted as.
///
/// Ownership is a plain username match: content can be edited or deleted
/// only by the session whose username wrote it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    user: User,
}

impl Session {
    pub fn new(user: User) -> Session {
        Session { user }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn username(&self) -> &str {
        &self.user.username
    }

    pub fn owns(&self, author: &User) -> bool {
        author.username == self.user.username
    }

    pub(crate) fn check_owns(&self, author: &User) -> Result<(), IntentError> {
        match self.owns(author) {
            true => Ok(()),
            false => Err(IntentError::PermissionDenied {
                session: self.user.username.clone(),
                author: author.username.clone(),
            }),
        }
    }
}
