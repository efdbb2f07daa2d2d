use super::error::DescriptorError;
use crate::utils::nom_helper::{nom_data, nom_unsigned_four_bytes, nom_unsigned_one_byte, Endian};
use byteorder::{BigEndian, ReadBytesExt};
use log::warn;
use std::{fmt, str::FromStr};

/// Windows Security Identifier. The sub authority count byte on the wire is always derived from `sub_authorities`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sid {
    pub revision: u8,
    /**48 bit identifier authority, big endian on the wire */
    pub authority: u64,
    pub sub_authorities: Vec<u32>,
}

impl Sid {
    /// Revision byte, sub authority count byte and six bytes of authority
    pub const FIXED_SIZE: usize = 8;
    pub const MAX_SUB_AUTHORITIES: usize = 15;
    const MAX_AUTHORITY: u64 = 0xffff_ffff_ffff;

    /// Parse the data into a SID. Exactly `count * 4 + 8` bytes are consumed
    pub(crate) fn parse_sid(data: &[u8]) -> nom::IResult<&[u8], Sid> {
        let (input, revision) = nom_unsigned_one_byte(data, Endian::Le)?;
        let (input, count) = nom_unsigned_one_byte(input, Endian::Le)?;
        let authority_size = 6;
        let (mut input, mut authority_data) = nom_data(input, authority_size)?;
        let authority = authority_data.read_u48::<BigEndian>().unwrap_or_default();

        let mut sub_authorities = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (remaining, sub_authority) = nom_unsigned_four_bytes(input, Endian::Le)?;
            sub_authorities.push(sub_authority);
            input = remaining;
        }

        Ok((
            input,
            Sid {
                revision,
                authority,
                sub_authorities,
            },
        ))
    }

    /// Parse a binary SID
    pub fn from_bytes(data: &[u8]) -> Result<Sid, DescriptorError> {
        let (_, sid) = Sid::parse_sid(data)?;
        Ok(sid)
    }

    /// Number of bytes the SID occupies on the wire
    pub fn encoded_len(&self) -> usize {
        Sid::FIXED_SIZE + self.sub_authorities.len() * 4
    }

    /// Serialize the SID. The count byte is rewritten from the sub authority list
    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.encoded_len());
        data.push(self.revision);
        data.push(self.sub_authorities.len() as u8);
        // Authority is a 48 bit big endian value
        data.extend_from_slice(&self.authority.to_be_bytes()[2..]);
        for sub_authority in &self.sub_authorities {
            data.extend_from_slice(&sub_authority.to_le_bytes());
        }
        data
    }

    /// Final sub authority, the RID for domain principals
    pub fn rid(&self) -> Option<u32> {
        self.sub_authorities.last().copied()
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // MS-DTYP 2.4.2.1: authorities that do not fit in 32 bits are written as hex
        if self.authority > u32::MAX as u64 {
            write!(f, "S-{}-0x{:012X}", self.revision, self.authority)?;
        } else {
            write!(f, "S-{}-{}", self.revision, self.authority)?;
        }
        for sub_authority in &self.sub_authorities {
            write!(f, "-{sub_authority}")?;
        }
        Ok(())
    }
}

impl FromStr for Sid {
    type Err = DescriptorError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = text.trim().split('-').collect();
        // Prefix, revision, authority and at least one sub authority
        let min_fields = 4;
        if fields.len() < min_fields || !fields[0].eq_ignore_ascii_case("s") {
            warn!("[sdcore] SID text {text} does not start with S-<revision>-<authority>-<sub>");
            return Err(DescriptorError::Format);
        }
        if fields.len() - 3 > Sid::MAX_SUB_AUTHORITIES {
            warn!("[sdcore] SID text {text} has more than 15 sub authorities");
            return Err(DescriptorError::Format);
        }

        let revision = match fields[1].parse::<u8>() {
            Ok(result) => result,
            Err(err) => {
                warn!("[sdcore] Bad SID revision in {text}: {err:?}");
                return Err(DescriptorError::Format);
            }
        };

        let authority_text = fields[2];
        let authority_result = if let Some(hex) = authority_text
            .strip_prefix("0x")
            .or_else(|| authority_text.strip_prefix("0X"))
        {
            u64::from_str_radix(hex, 16)
        } else {
            authority_text.parse::<u64>()
        };
        let authority = match authority_result {
            Ok(result) if result <= Sid::MAX_AUTHORITY => result,
            _ => {
                warn!("[sdcore] Bad SID identifier authority in {text}");
                return Err(DescriptorError::Format);
            }
        };

        let mut sub_authorities = Vec::with_capacity(fields.len() - 3);
        for field in &fields[3..] {
            match field.parse::<u32>() {
                Ok(result) => sub_authorities.push(result),
                Err(err) => {
                    warn!("[sdcore] Bad SID sub authority {field} in {text}: {err:?}");
                    return Err(DescriptorError::Format);
                }
            }
        }

        Ok(Sid {
            revision,
            authority,
            sub_authorities,
        })
    }
}

/// Convert canonical SID text into its binary form
pub fn encode_sid(text: &str) -> Result<Vec<u8>, DescriptorError> {
    Ok(Sid::from_str(text)?.encode())
}

/// Convert a binary SID into its canonical text form
pub fn decode_sid(data: &[u8]) -> Result<String, DescriptorError> {
    Ok(Sid::from_bytes(data)?.to_string())
}

#[cfg(test)]
mod tests {
    use super::{decode_sid, encode_sid, Sid};
    use crate::securitydescriptor::error::DescriptorError;
    use std::str::FromStr;

    #[test]
    fn test_parse_sid() {
        let test = [1, 1, 0, 0, 0, 0, 0, 5, 7, 0, 0, 0];
        let (remaining, results) = Sid::parse_sid(&test).unwrap();
        assert_eq!(results.to_string(), "S-1-5-7");
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_parse_sid_leaves_remaining() {
        let test = [1, 1, 0, 0, 0, 0, 0, 5, 18, 0, 0, 0, 0xaa, 0xbb];
        let (remaining, results) = Sid::parse_sid(&test).unwrap();
        assert_eq!(results.to_string(), "S-1-5-18");
        assert_eq!(remaining, [0xaa, 0xbb]);
    }

    #[test]
    fn test_parse_sid_truncated() {
        // Claims two sub authorities but only has one
        let test = [1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0];
        assert_eq!(Sid::from_bytes(&test), Err(DescriptorError::Truncated));
    }

    #[test]
    fn test_encode_domain_sid() {
        let test = "S-1-5-21-3623811015-3361044348-30300820-1013";
        let results = encode_sid(test).unwrap();
        assert_eq!(results.len(), 28);
        assert_eq!(
            results,
            [
                1, 5, 0, 0, 0, 0, 0, 5, 21, 0, 0, 0, 199, 247, 254, 215, 124, 119, 85, 200, 148,
                90, 206, 1, 245, 3, 0, 0
            ]
        );
        assert_eq!(decode_sid(&results).unwrap(), test);
    }

    #[test]
    fn test_well_known_sids() {
        for test in ["S-1-1-0", "S-1-5-32-544", "S-1-5-18", "S-1-3-0", "S-1-16-12288"] {
            let data = encode_sid(test).unwrap();
            assert_eq!(decode_sid(&data).unwrap(), test);
        }
    }

    #[test]
    fn test_large_authority() {
        let test = "S-1-0x123456789ABC-7";
        let data = encode_sid(test).unwrap();
        assert_eq!(&data[2..8], [0x12, 0x34, 0x56, 0x78, 0x9a, 0xbc]);
        assert_eq!(decode_sid(&data).unwrap(), test);
    }

    #[test]
    fn test_bad_sid_text() {
        assert_eq!(Sid::from_str("S-1-5"), Err(DescriptorError::Format));
        assert_eq!(Sid::from_str("X-1-5-7"), Err(DescriptorError::Format));
        assert_eq!(Sid::from_str("S-1-5-abc"), Err(DescriptorError::Format));
        assert_eq!(Sid::from_str("S-1-5-4294967296"), Err(DescriptorError::Format));
        assert_eq!(Sid::from_str("S-1-281474976710656-1"), Err(DescriptorError::Format));
        assert_eq!(
            Sid::from_str("S-1-5-1-2-3-4-5-6-7-8-9-10-11-12-13-14-15-16"),
            Err(DescriptorError::Format)
        );
    }

    #[test]
    fn test_rid() {
        let sid = Sid::from_str("S-1-5-21-1-2-3-512").unwrap();
        assert_eq!(sid.rid(), Some(512));
        assert_eq!(sid.encoded_len(), 28);
    }
}
