use std::fmt;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum DescriptorError {
    /**Fewer bytes than a fixed width field or a declared size requires */
    Truncated,
    /**Header shorter than 20 bytes or an offset pointing outside the data */
    MalformedDescriptor,
    /**SID or GUID text does not follow the canonical grammar */
    Format,
    /**Operation needs a parsed mask/SID but the ACE is kept as opaque bytes */
    UnsupportedAce,
    /**No ACE at the requested DACL position */
    AceIndex,
    /**An edit would push an ACE or ACL past the 16 bit size field */
    AclTooLarge,
}

impl std::error::Error for DescriptorError {}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorError::Truncated => write!(f, "Security descriptor data is truncated"),
            DescriptorError::MalformedDescriptor => {
                write!(f, "Security descriptor header is malformed")
            }
            DescriptorError::Format => write!(f, "Invalid SID or GUID text"),
            DescriptorError::UnsupportedAce => {
                write!(f, "ACE type is not modeled and cannot be edited")
            }
            DescriptorError::AceIndex => write!(f, "ACE index out of range"),
            DescriptorError::AclTooLarge => {
                write!(f, "ACL or ACE exceeds the 65535 byte limit")
            }
        }
    }
}

/// Any nom failure while walking the binary data means we ran out of bytes
impl<E> From<nom::Err<E>> for DescriptorError {
    fn from(_err: nom::Err<E>) -> Self {
        DescriptorError::Truncated
    }
}
