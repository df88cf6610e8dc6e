use axum::http::header;
use palaver_api::{CommentId, Error as ApiError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl Error {
    pub fn not_found(id: CommentId) -> Error {
        Error::Api(ApiError::CommentNotFound(id))
    }

    pub fn invalid_body(msg: String) -> Error {
        Error::Api(ApiError::InvalidBody(msg))
    }
}

impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let err = match self {
            Error::Anyhow(err) => {
                tracing::error!(?err, "internal server error");
                #[cfg(not(test))]
                let err =
                    ApiError::Unknown(String::from("Internal server error, see logs for details"));
                #[cfg(test)]
                let err = ApiError::Unknown(format!("Internal server error: {err:?}"));
                err
            }
            Error::Api(err) => {
                tracing::info!("returning error to client: {err}");
                err
            }
        };
        (
            err.status_code(),
            [(header::CONTENT_TYPE, "application/json")],
            err.contents(),
        )
            .into_response()
    }
}
