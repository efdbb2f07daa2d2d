use super::{
    error::DescriptorError,
    guid::Guid,
    header::{AceHeader, ACE_HEADER_SIZE},
    sid::Sid,
};
use crate::utils::nom_helper::{nom_data, nom_unsigned_four_bytes, Endian};
use common::windows::{AceFlags, AceKind};
use log::{error, warn};
use nom::Needed;
use std::str::FromStr;

pub const ACCESS_ALLOWED_ACE_TYPE: u8 = 0x0;
pub const ACCESS_DENIED_ACE_TYPE: u8 = 0x1;
pub const ACCESS_ALLOWED_OBJECT_ACE_TYPE: u8 = 0x5;
pub const ACCESS_DENIED_OBJECT_ACE_TYPE: u8 = 0x6;

pub const OBJECT_INHERIT_ACE: u8 = 0x1;
pub const CONTAINER_INHERIT_ACE: u8 = 0x2;
pub const NO_PROPAGATE_INHERIT_ACE: u8 = 0x4;
pub const INHERIT_ONLY_ACE: u8 = 0x8;
pub const INHERITED_ACE: u8 = 0x10;
pub const SUCCESSFUL_ACCESS_ACE_FLAG: u8 = 0x40;
pub const FAILED_ACCESS_ACE_FLAG: u8 = 0x80;

pub const ACE_OBJECT_TYPE_PRESENT: u32 = 0x1;
pub const ACE_INHERITED_OBJECT_TYPE_PRESENT: u32 = 0x2;

/// Every ACE type MS-DTYP defines. Only the four allow/deny types are parsed beyond the header
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum AceType {
    AccessAllowed,
    AccessDenied,
    SystemAudit,
    SystemAlarm,
    AccessAllowedCompound,
    AccessAllowedObject,
    AccessDeniedObject,
    SystemAuditObject,
    SystemAlarmObject,
    AccessAllowedCallback,
    AccessDeniedCallback,
    AccessAllowedCallbackObject,
    AccessDeniedCallbackObject,
    SystemAuditCallback,
    SystemAlarmCallback,
    SystemAuditCallbackObject,
    SystemAlarmCallbackObject,
    SystemMandatoryLabel,
    SystemResourceAttribute,
    SystemScopedPolicyId,
    Unknown(u8),
}

impl AceType {
    /// Determine the ACE type
    pub fn from_u8(ace_type: u8) -> AceType {
        match ace_type {
            0x0 => AceType::AccessAllowed,
            0x1 => AceType::AccessDenied,
            0x2 => AceType::SystemAudit,
            0x3 => AceType::SystemAlarm,
            0x4 => AceType::AccessAllowedCompound,
            0x5 => AceType::AccessAllowedObject,
            0x6 => AceType::AccessDeniedObject,
            0x7 => AceType::SystemAuditObject,
            0x8 => AceType::SystemAlarmObject,
            0x9 => AceType::AccessAllowedCallback,
            0xa => AceType::AccessDeniedCallback,
            0xb => AceType::AccessAllowedCallbackObject,
            0xc => AceType::AccessDeniedCallbackObject,
            0xd => AceType::SystemAuditCallback,
            0xe => AceType::SystemAlarmCallback,
            0xf => AceType::SystemAuditCallbackObject,
            0x10 => AceType::SystemAlarmCallbackObject,
            0x11 => AceType::SystemMandatoryLabel,
            0x12 => AceType::SystemResourceAttribute,
            0x13 => AceType::SystemScopedPolicyId,
            _ => {
                warn!("[sdcore] Unknown ACE Type: {ace_type}");
                AceType::Unknown(ace_type)
            }
        }
    }

    /// Allow, deny or neither
    pub fn kind(&self) -> AceKind {
        match self {
            AceType::AccessAllowed
            | AceType::AccessAllowedObject
            | AceType::AccessAllowedCallback
            | AceType::AccessAllowedCallbackObject
            | AceType::AccessAllowedCompound => AceKind::Allow,
            AceType::AccessDenied
            | AceType::AccessDeniedObject
            | AceType::AccessDeniedCallback
            | AceType::AccessDeniedCallbackObject => AceKind::Deny,
            _ => AceKind::Other,
        }
    }
}

/// Determine the ACE flags
pub fn get_ace_flags(ace_flags: u8) -> Vec<AceFlags> {
    let mut flags = Vec::new();
    if (OBJECT_INHERIT_ACE & ace_flags) == OBJECT_INHERIT_ACE {
        flags.push(AceFlags::ObjectInherit);
    }
    if (CONTAINER_INHERIT_ACE & ace_flags) == CONTAINER_INHERIT_ACE {
        flags.push(AceFlags::ContainerInherit);
    }
    if (NO_PROPAGATE_INHERIT_ACE & ace_flags) == NO_PROPAGATE_INHERIT_ACE {
        flags.push(AceFlags::NoPropagateInherit);
    }
    if (INHERIT_ONLY_ACE & ace_flags) == INHERIT_ONLY_ACE {
        flags.push(AceFlags::InheritOnly);
    }
    if (INHERITED_ACE & ace_flags) == INHERITED_ACE {
        flags.push(AceFlags::Inherited);
    }
    if (SUCCESSFUL_ACCESS_ACE_FLAG & ace_flags) == SUCCESSFUL_ACCESS_ACE_FLAG {
        flags.push(AceFlags::SuccessfulAccess);
    }
    if (FAILED_ACCESS_ACE_FLAG & ace_flags) == FAILED_ACCESS_ACE_FLAG {
        flags.push(AceFlags::FailedAccess);
    }

    flags
}

/// ACCESS_ALLOWED_ACE / ACCESS_DENIED_ACE
#[derive(Debug, Clone, PartialEq)]
pub struct BasicAce {
    pub header: AceHeader,
    pub mask: u32,
    pub sid: Sid,
    /**Bytes inside `ace_size` that follow the SID */
    pub trailing: Vec<u8>,
}

/// ACCESS_ALLOWED_OBJECT_ACE / ACCESS_DENIED_OBJECT_ACE
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAce {
    pub header: AceHeader,
    pub mask: u32,
    pub object_flags: u32,
    /**Only if ACE_OBJECT_TYPE_PRESENT object flag */
    pub object_type: Option<Guid>,
    /**Only if ACE_INHERITED_OBJECT_TYPE_PRESENT object flag */
    pub inherited_object_type: Option<Guid>,
    pub sid: Sid,
    pub trailing: Vec<u8>,
}

/// Any ACE type we do not model. The body is written back untouched
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueAce {
    pub header: AceHeader,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Ace {
    Basic(BasicAce),
    Object(ObjectAce),
    Opaque(OpaqueAce),
}

impl BasicAce {
    fn parse_body(header: AceHeader, body: &[u8]) -> nom::IResult<&[u8], BasicAce> {
        let (input, mask) = nom_unsigned_four_bytes(body, Endian::Le)?;
        let (input, sid) = Sid::parse_sid(input)?;

        let ace = BasicAce {
            header,
            mask,
            sid,
            trailing: input.to_vec(),
        };
        Ok((input, ace))
    }

    fn encoded_len(&self) -> usize {
        ACE_HEADER_SIZE + 4 + self.sid.encoded_len() + self.trailing.len()
    }
}

impl ObjectAce {
    fn parse_body(header: AceHeader, body: &[u8]) -> nom::IResult<&[u8], ObjectAce> {
        let (input, mask) = nom_unsigned_four_bytes(body, Endian::Le)?;
        let (mut input, object_flags) = nom_unsigned_four_bytes(input, Endian::Le)?;

        // Flag bits alone decide which GUIDs are present
        let mut object_type = None;
        if (object_flags & ACE_OBJECT_TYPE_PRESENT) == ACE_OBJECT_TYPE_PRESENT {
            let (remaining, guid) = Guid::parse_guid(input)?;
            object_type = Some(guid);
            input = remaining;
        }
        let mut inherited_object_type = None;
        if (object_flags & ACE_INHERITED_OBJECT_TYPE_PRESENT) == ACE_INHERITED_OBJECT_TYPE_PRESENT
        {
            let (remaining, guid) = Guid::parse_guid(input)?;
            inherited_object_type = Some(guid);
            input = remaining;
        }
        let (input, sid) = Sid::parse_sid(input)?;

        let ace = ObjectAce {
            header,
            mask,
            object_flags,
            object_type,
            inherited_object_type,
            sid,
            trailing: input.to_vec(),
        };
        Ok((input, ace))
    }

    /// Bytes between the start of the ACE and the SID: header, mask, object flags and any GUIDs
    pub fn sid_start(&self) -> usize {
        let fixed = ACE_HEADER_SIZE + 8;
        let guids = [self.object_type, self.inherited_object_type]
            .iter()
            .filter(|guid| guid.is_some())
            .count();
        fixed + guids * Guid::SIZE
    }

    fn encoded_len(&self) -> usize {
        self.sid_start() + self.sid.encoded_len() + self.trailing.len()
    }

    /// Object type and inherited object type as text. Empty when the matching flag bit is clear
    pub fn get_object_and_inherited_type(&self) -> (String, String) {
        let object_type = self
            .object_type
            .map(|guid| guid.to_string())
            .unwrap_or_default();
        let inherited_object_type = self
            .inherited_object_type
            .map(|guid| guid.to_string())
            .unwrap_or_default();
        (object_type, inherited_object_type)
    }

    /// Replace both GUIDs. Empty text clears a GUID. Nothing changes if either text is invalid
    pub fn set_object_types(
        &mut self,
        object_type: &str,
        inherited_object_type: &str,
    ) -> Result<(), DescriptorError> {
        let object_type = optional_guid(object_type)?;
        let inherited_object_type = optional_guid(inherited_object_type)?;

        let mut updated = self.clone();
        updated.object_flags &= !(ACE_OBJECT_TYPE_PRESENT | ACE_INHERITED_OBJECT_TYPE_PRESENT);
        updated.object_flags |= object_flags_for(&object_type, &inherited_object_type);
        updated.object_type = object_type;
        updated.inherited_object_type = inherited_object_type;
        updated.header.ace_size = checked_size(updated.encoded_len())?;
        *self = updated;
        Ok(())
    }
}

impl OpaqueAce {
    fn encoded_len(&self) -> usize {
        ACE_HEADER_SIZE + self.body.len()
    }
}

impl Ace {
    /// Parse one ACE from the start of the data. Exactly `ace_size` bytes are consumed
    pub(crate) fn parse_ace(data: &[u8]) -> nom::IResult<&[u8], Ace> {
        let (_, header) = AceHeader::parse_header(data)?;
        if (header.ace_size as usize) < ACE_HEADER_SIZE {
            error!(
                "[sdcore] ACE size {} is smaller than the ACE header",
                header.ace_size
            );
            return Err(nom::Err::Incomplete(Needed::Unknown));
        }

        let (remaining, ace_data) = nom_data(data, header.ace_size as u64)?;
        let body = &ace_data[ACE_HEADER_SIZE..];

        let ace_type = header.ace_type;
        let ace = match ace_type {
            ACCESS_ALLOWED_ACE_TYPE | ACCESS_DENIED_ACE_TYPE => {
                let (_, ace) = BasicAce::parse_body(header, body)?;
                Ace::Basic(ace)
            }
            ACCESS_ALLOWED_OBJECT_ACE_TYPE | ACCESS_DENIED_OBJECT_ACE_TYPE => {
                let (_, ace) = ObjectAce::parse_body(header, body)?;
                Ace::Object(ace)
            }
            _ => Ace::Opaque(OpaqueAce {
                header,
                body: body.to_vec(),
            }),
        };

        Ok((remaining, ace))
    }

    /// Parse the ACE starting at `offset`. Returns the ACE and how many bytes it used
    pub fn parse(data: &[u8], offset: usize) -> Result<(Ace, usize), DescriptorError> {
        if offset > data.len() {
            return Err(DescriptorError::Truncated);
        }
        let (_, ace) = Ace::parse_ace(&data[offset..])?;
        let consumed = ace.header().ace_size as usize;
        Ok((ace, consumed))
    }

    /// Build an ACCESS_ALLOWED_ACE or ACCESS_DENIED_ACE
    pub fn new_basic(
        ace_type: u8,
        ace_flags: u8,
        mask: u32,
        sid: &str,
    ) -> Result<Ace, DescriptorError> {
        if ace_type != ACCESS_ALLOWED_ACE_TYPE && ace_type != ACCESS_DENIED_ACE_TYPE {
            return Err(DescriptorError::UnsupportedAce);
        }
        let sid = Sid::from_str(sid)?;
        let mut ace = Ace::Basic(BasicAce {
            header: AceHeader {
                ace_type,
                ace_flags,
                ace_size: 0,
            },
            mask,
            sid,
            trailing: Vec::new(),
        });
        ace.refresh_size()?;
        Ok(ace)
    }

    /// Build an ACCESS_ALLOWED_OBJECT_ACE or ACCESS_DENIED_OBJECT_ACE. Empty GUID text leaves that GUID out
    pub fn new_object(
        ace_type: u8,
        ace_flags: u8,
        mask: u32,
        object_type: &str,
        inherited_object_type: &str,
        sid: &str,
    ) -> Result<Ace, DescriptorError> {
        if ace_type != ACCESS_ALLOWED_OBJECT_ACE_TYPE && ace_type != ACCESS_DENIED_OBJECT_ACE_TYPE
        {
            return Err(DescriptorError::UnsupportedAce);
        }
        let object_type = optional_guid(object_type)?;
        let inherited_object_type = optional_guid(inherited_object_type)?;
        let sid = Sid::from_str(sid)?;

        let mut ace = Ace::Object(ObjectAce {
            header: AceHeader {
                ace_type,
                ace_flags,
                ace_size: 0,
            },
            mask,
            object_flags: object_flags_for(&object_type, &inherited_object_type),
            object_type,
            inherited_object_type,
            sid,
            trailing: Vec::new(),
        });
        ace.refresh_size()?;
        Ok(ace)
    }

    pub fn header(&self) -> &AceHeader {
        match self {
            Ace::Basic(ace) => &ace.header,
            Ace::Object(ace) => &ace.header,
            Ace::Opaque(ace) => &ace.header,
        }
    }

    /// Replace the header verbatim. `ace_size` is not checked here, the owning ACL recomputes it
    pub fn set_header(&mut self, header: AceHeader) {
        match self {
            Ace::Basic(ace) => ace.header = header,
            Ace::Object(ace) => ace.header = header,
            Ace::Opaque(ace) => ace.header = header,
        }
    }

    pub fn ace_type(&self) -> AceType {
        AceType::from_u8(self.header().ace_type)
    }

    pub fn kind(&self) -> AceKind {
        match self {
            Ace::Opaque(_) => AceKind::Other,
            _ => self.ace_type().kind(),
        }
    }

    pub fn flags(&self) -> Vec<AceFlags> {
        get_ace_flags(self.header().ace_flags)
    }

    pub fn is_inherited(&self) -> bool {
        (self.header().ace_flags & INHERITED_ACE) == INHERITED_ACE
    }

    /// Access mask. Opaque ACEs have none
    pub fn mask(&self) -> Option<u32> {
        match self {
            Ace::Basic(ace) => Some(ace.mask),
            Ace::Object(ace) => Some(ace.mask),
            Ace::Opaque(_) => None,
        }
    }

    pub fn set_mask(&mut self, mask: u32) -> Result<(), DescriptorError> {
        match self {
            Ace::Basic(ace) => ace.mask = mask,
            Ace::Object(ace) => ace.mask = mask,
            Ace::Opaque(_) => return Err(DescriptorError::UnsupportedAce),
        }
        Ok(())
    }

    pub fn sid(&self) -> Option<&Sid> {
        match self {
            Ace::Basic(ace) => Some(&ace.sid),
            Ace::Object(ace) => Some(&ace.sid),
            Ace::Opaque(_) => None,
        }
    }

    /// SID text, empty for opaque ACEs
    pub fn sid_string(&self) -> String {
        self.sid().map(|sid| sid.to_string()).unwrap_or_default()
    }

    /// Replace the trustee SID. Invalid text leaves the ACE untouched
    pub fn set_sid(&mut self, sid: &str) -> Result<(), DescriptorError> {
        if let Ace::Opaque(_) = self {
            return Err(DescriptorError::UnsupportedAce);
        }
        let sid = Sid::from_str(sid)?;
        let mut updated = self.clone();
        match &mut updated {
            Ace::Basic(ace) => ace.sid = sid,
            Ace::Object(ace) => ace.sid = sid,
            Ace::Opaque(_) => {}
        }
        updated.refresh_size()?;
        *self = updated;
        Ok(())
    }

    /// Object type and inherited object type text. Both empty for non-object ACEs
    pub fn get_object_and_inherited_type(&self) -> (String, String) {
        match self {
            Ace::Object(ace) => ace.get_object_and_inherited_type(),
            _ => (String::new(), String::new()),
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            Ace::Basic(ace) => ace.encoded_len(),
            Ace::Object(ace) => ace.encoded_len(),
            Ace::Opaque(ace) => ace.encoded_len(),
        }
    }

    /// Rewrite `ace_size` from the current contents. Nothing changes if the ACE no longer fits in 16 bits
    pub fn refresh_size(&mut self) -> Result<(), DescriptorError> {
        let size = checked_size(self.encoded_len())?;
        match self {
            Ace::Basic(ace) => ace.header.ace_size = size,
            Ace::Object(ace) => ace.header.ace_size = size,
            Ace::Opaque(ace) => ace.header.ace_size = size,
        }
        Ok(())
    }

    /// Serialize the ACE using the header as stored
    pub fn encode(&self) -> Vec<u8> {
        let mut data = self.header().encode();
        match self {
            Ace::Basic(ace) => {
                data.extend_from_slice(&ace.mask.to_le_bytes());
                data.extend(ace.sid.encode());
                data.extend_from_slice(&ace.trailing);
            }
            Ace::Object(ace) => {
                data.extend_from_slice(&ace.mask.to_le_bytes());
                data.extend_from_slice(&ace.object_flags.to_le_bytes());
                if let Some(guid) = &ace.object_type {
                    data.extend_from_slice(guid.as_bytes());
                }
                if let Some(guid) = &ace.inherited_object_type {
                    data.extend_from_slice(guid.as_bytes());
                }
                data.extend(ace.sid.encode());
                data.extend_from_slice(&ace.trailing);
            }
            Ace::Opaque(ace) => data.extend_from_slice(&ace.body),
        }
        data
    }
}

/// ACE and ACL sizes are 16 bit fields on the wire
pub(crate) fn checked_size(size: usize) -> Result<u16, DescriptorError> {
    match u16::try_from(size) {
        Ok(size) => Ok(size),
        Err(_) => {
            error!("[sdcore] Entry of {size} bytes does not fit a 16 bit size field");
            Err(DescriptorError::AclTooLarge)
        }
    }
}

fn optional_guid(text: &str) -> Result<Option<Guid>, DescriptorError> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(Guid::from_str(text)?))
}

fn object_flags_for(object_type: &Option<Guid>, inherited_object_type: &Option<Guid>) -> u32 {
    let mut flags = 0;
    if object_type.is_some() {
        flags |= ACE_OBJECT_TYPE_PRESENT;
    }
    if inherited_object_type.is_some() {
        flags |= ACE_INHERITED_OBJECT_TYPE_PRESENT;
    }
    flags
}
