use crate::utils::nom_helper::{
    nom_unsigned_four_bytes, nom_unsigned_one_byte, nom_unsigned_two_bytes, Endian,
};

pub const DESCRIPTOR_HEADER_SIZE: usize = 20;
pub const ACL_HEADER_SIZE: usize = 8;
pub const ACE_HEADER_SIZE: usize = 4;

/// Fixed header of a self-relative security descriptor. Offsets are from the start of the descriptor, zero means absent
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SecurityDescriptorHeader {
    pub revision: u8,
    pub sbz1: u8,
    pub control: u16,
    pub offset_owner: u32,
    pub offset_group: u32,
    pub offset_sacl: u32,
    pub offset_dacl: u32,
}

impl SecurityDescriptorHeader {
    pub(crate) fn parse_header(data: &[u8]) -> nom::IResult<&[u8], SecurityDescriptorHeader> {
        let (input, revision) = nom_unsigned_one_byte(data, Endian::Le)?;
        let (input, sbz1) = nom_unsigned_one_byte(input, Endian::Le)?;
        let (input, control) = nom_unsigned_two_bytes(input, Endian::Le)?;
        let (input, offset_owner) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, offset_group) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, offset_sacl) = nom_unsigned_four_bytes(input, Endian::Le)?;
        let (input, offset_dacl) = nom_unsigned_four_bytes(input, Endian::Le)?;

        let header = SecurityDescriptorHeader {
            revision,
            sbz1,
            control,
            offset_owner,
            offset_group,
            offset_sacl,
            offset_dacl,
        };
        Ok((input, header))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(DESCRIPTOR_HEADER_SIZE);
        data.push(self.revision);
        data.push(self.sbz1);
        data.extend_from_slice(&self.control.to_le_bytes());
        data.extend_from_slice(&self.offset_owner.to_le_bytes());
        data.extend_from_slice(&self.offset_group.to_le_bytes());
        data.extend_from_slice(&self.offset_sacl.to_le_bytes());
        data.extend_from_slice(&self.offset_dacl.to_le_bytes());
        data
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AclHeader {
    pub revision: u8,
    pub sbz1: u8,
    /**Size of the header plus every ACE */
    pub acl_size: u16,
    pub ace_count: u16,
    pub sbz2: u16,
}

impl AclHeader {
    pub(crate) fn parse_header(data: &[u8]) -> nom::IResult<&[u8], AclHeader> {
        let (input, revision) = nom_unsigned_one_byte(data, Endian::Le)?;
        let (input, sbz1) = nom_unsigned_one_byte(input, Endian::Le)?;
        let (input, acl_size) = nom_unsigned_two_bytes(input, Endian::Le)?;
        let (input, ace_count) = nom_unsigned_two_bytes(input, Endian::Le)?;
        let (input, sbz2) = nom_unsigned_two_bytes(input, Endian::Le)?;

        let header = AclHeader {
            revision,
            sbz1,
            acl_size,
            ace_count,
            sbz2,
        };
        Ok((input, header))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(ACL_HEADER_SIZE);
        data.push(self.revision);
        data.push(self.sbz1);
        data.extend_from_slice(&self.acl_size.to_le_bytes());
        data.extend_from_slice(&self.ace_count.to_le_bytes());
        data.extend_from_slice(&self.sbz2.to_le_bytes());
        data
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AceHeader {
    pub ace_type: u8,
    pub ace_flags: u8,
    /**Size of the whole ACE, header included */
    pub ace_size: u16,
}

impl AceHeader {
    pub(crate) fn parse_header(data: &[u8]) -> nom::IResult<&[u8], AceHeader> {
        let (input, ace_type) = nom_unsigned_one_byte(data, Endian::Le)?;
        let (input, ace_flags) = nom_unsigned_one_byte(input, Endian::Le)?;
        let (input, ace_size) = nom_unsigned_two_bytes(input, Endian::Le)?;

        let header = AceHeader {
            ace_type,
            ace_flags,
            ace_size,
        };
        Ok((input, header))
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(ACE_HEADER_SIZE);
        data.push(self.ace_type);
        data.push(self.ace_flags);
        data.extend_from_slice(&self.ace_size.to_le_bytes());
        data
    }
}

#[cfg(test)]
mod tests {
    use super::{AceHeader, AclHeader, SecurityDescriptorHeader};

    #[test]
    fn test_parse_descriptor_header() {
        let test = [
            1, 0, 20, 140, 208, 0, 0, 0, 224, 0, 0, 0, 20, 0, 0, 0, 48, 0, 0, 0, 4, 0,
        ];
        let (remaining, header) = SecurityDescriptorHeader::parse_header(&test).unwrap();
        assert_eq!(remaining, [4, 0]);
        assert_eq!(header.revision, 1);
        assert_eq!(header.control, 0x8c14);
        assert_eq!(header.offset_owner, 208);
        assert_eq!(header.offset_group, 224);
        assert_eq!(header.offset_sacl, 20);
        assert_eq!(header.offset_dacl, 48);
        assert_eq!(header.encode(), test[..20]);
    }

    #[test]
    fn test_parse_descriptor_header_truncated() {
        let test = [1, 0, 20, 140, 208, 0, 0, 0];
        assert!(SecurityDescriptorHeader::parse_header(&test).is_err());
    }

    #[test]
    fn test_parse_acl_header() {
        let test = [4, 0, 160, 0, 4, 0, 0, 0];
        let (_, header) = AclHeader::parse_header(&test).unwrap();
        assert_eq!(header.revision, 4);
        assert_eq!(header.acl_size, 160);
        assert_eq!(header.ace_count, 4);
        assert_eq!(header.encode(), test);
    }

    #[test]
    fn test_parse_ace_header() {
        let test = [5, 0x12, 40, 0];
        let (remaining, header) = AceHeader::parse_header(&test).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(header.ace_type, 5);
        assert_eq!(header.ace_flags, 0x12);
        assert_eq!(header.ace_size, 40);
        assert_eq!(header.encode(), test);

        assert!(AceHeader::parse_header(&test[..3]).is_err());
    }
}
