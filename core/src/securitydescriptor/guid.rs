use super::error::DescriptorError;
use crate::utils::{
    bytes::{hex_to_bytes, reverse_bytes},
    nom_helper::nom_data,
};
use log::warn;
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// GUID kept in wire order: Data1 (u32 LE), Data2 (u16 LE), Data3 (u16 LE), Data4 (8 bytes as-is)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid {
    bytes: [u8; 16],
}

impl Guid {
    pub const SIZE: usize = 16;

    pub fn from_bytes_le(bytes: [u8; 16]) -> Guid {
        Guid { bytes }
    }

    /// Parse sixteen (16) bytes into a GUID
    pub(crate) fn parse_guid(data: &[u8]) -> nom::IResult<&[u8], Guid> {
        let (input, guid_data) = nom_data(data, Guid::SIZE as u64)?;
        let mut bytes = [0; 16];
        bytes.copy_from_slice(guid_data);
        Ok((input, Guid { bytes }))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    pub fn encode(&self) -> Vec<u8> {
        self.bytes.to_vec()
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Uuid::from_bytes_le(self.bytes).hyphenated())
    }
}

impl FromStr for Guid {
    type Err = DescriptorError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = text.trim().split('-').collect();
        let field_widths = [8, 4, 4, 4, 12];
        if fields.len() != field_widths.len() {
            warn!("[sdcore] GUID text {text} does not have five fields");
            return Err(DescriptorError::Format);
        }

        let mut bytes = Vec::with_capacity(Guid::SIZE);
        // First three fields are stored little endian, the last two are copied as-is
        let reversed_fields = 3;
        for (index, (field, width)) in fields.iter().zip(field_widths).enumerate() {
            let field_bytes = match hex_to_bytes(field) {
                Some(result) if field.len() == width => result,
                _ => {
                    warn!("[sdcore] GUID text {text} has a malformed field: {field}");
                    return Err(DescriptorError::Format);
                }
            };
            if index < reversed_fields {
                bytes.extend(reverse_bytes(&field_bytes));
            } else {
                bytes.extend(field_bytes);
            }
        }

        let mut guid = [0; 16];
        guid.copy_from_slice(&bytes);
        Ok(Guid { bytes: guid })
    }
}

/// Convert canonical GUID text into its sixteen (16) wire bytes
pub fn encode_guid(text: &str) -> Result<Vec<u8>, DescriptorError> {
    Ok(Guid::from_str(text)?.encode())
}

/// Convert sixteen (16) wire bytes into canonical GUID text
pub fn decode_guid(data: &[u8]) -> Result<String, DescriptorError> {
    let (_, guid) = Guid::parse_guid(data)?;
    Ok(guid.to_string())
}
