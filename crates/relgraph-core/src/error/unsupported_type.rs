use super::Error;

#[derive(Debug)]
pub(super) struct UnsupportedType {
    type_name: Box<str>,
}

impl std::error::Error for UnsupportedType {}

impl core::fmt::Display for UnsupportedType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unsupported column type: {}", self.type_name)
    }
}

impl Error {
    /// Creates an error for a column type without a mapping.
    pub fn unsupported_type(type_name: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::UnsupportedType(UnsupportedType {
            type_name: type_name.into().into(),
        }))
    }

    pub fn is_unsupported_type(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::UnsupportedType(_))
    }
}
