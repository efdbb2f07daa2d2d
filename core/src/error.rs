use crate::securitydescriptor::error::DescriptorError;
use std::fmt;

#[derive(Debug, PartialEq)]
pub enum CoreError {
    NoFile,
    BadToml,
    BadJson,
    BadBase64,
    LogFile,
    Serialize,
    Descriptor(DescriptorError),
}

impl std::error::Error for CoreError {}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::NoFile => write!(f, "Failed to read file"),
            CoreError::BadToml => write!(f, "Failed to parse TOML data"),
            CoreError::BadJson => write!(f, "Failed to parse JSON catalog data"),
            CoreError::BadBase64 => write!(f, "Failed to base64 decode security descriptor"),
            CoreError::LogFile => write!(f, "Could not create log file"),
            CoreError::Serialize => write!(f, "Failed to serialize output"),
            CoreError::Descriptor(err) => write!(f, "Security descriptor error: {err}"),
        }
    }
}

impl From<DescriptorError> for CoreError {
    fn from(err: DescriptorError) -> Self {
        CoreError::Descriptor(err)
    }
}
