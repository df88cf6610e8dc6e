/// Minimal length, in characters, of any comment or reply text
pub const MIN_CONTENT_LEN: usize = 10;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ContentError {
    #[error("This field is required")]
    Empty,

    #[error("Content must be at least {min} characters")]
    TooShort { len: usize, min: usize },
}

impl ContentError {
    /// Message shown next to the form field, `what` being "Comment" or "Reply"
    pub fn message(&self, what: &str) -> String {
        match self {
            ContentError::Empty => self.to_string(),
            ContentError::TooShort { min, .. } => {
                format!("{what} must be at least {min} characters")
            }
        }
    }
}

pub fn validate_content(content: &str) -> Result<(), ContentError> {
    let len = content.chars().count();
    if len == 0 {
        return Err(ContentError::Empty);
    }
    if len < MIN_CONTENT_LEN {
        return Err(ContentError::TooShort {
            len,
            min: MIN_CONTENT_LEN,
        });
    }
    Ok(())
}
