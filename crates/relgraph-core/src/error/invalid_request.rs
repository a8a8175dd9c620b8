use super::Error;

/// Error when a request cannot be translated.
///
/// This occurs when:
/// - A required argument (such as a primary key column) is missing
/// - An argument has the wrong shape (a filter that is not an object)
/// - A table or operation does not exist
/// - A to-many filter is used on a table without a primary key
#[derive(Debug)]
pub(super) struct InvalidRequest {
    message: Box<str>,
}

impl std::error::Error for InvalidRequest {}

impl core::fmt::Display for InvalidRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid request: {}", self.message)
    }
}

impl Error {
    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::InvalidRequest(InvalidRequest {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is an invalid request error.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::InvalidRequest(_))
    }
}
