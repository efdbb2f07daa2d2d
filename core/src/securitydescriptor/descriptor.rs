use super::{
    ace::Ace,
    acl::{Acl, ACL_REVISION_DS},
    error::DescriptorError,
    header::{SecurityDescriptorHeader, DESCRIPTOR_HEADER_SIZE},
    sid::Sid,
};
use common::windows::ControlFlags;
use log::error;
use std::str::FromStr;

pub const SE_OWNER_DEFAULTED: u16 = 0x1;
pub const SE_GROUP_DEFAULTED: u16 = 0x2;
pub const SE_DACL_PRESENT: u16 = 0x4;
pub const SE_DACL_DEFAULTED: u16 = 0x8;
pub const SE_SACL_PRESENT: u16 = 0x10;
pub const SE_SACL_DEFAULTED: u16 = 0x20;
pub const SE_DACL_TRUSTED: u16 = 0x40;
pub const SE_SERVER_SECURITY: u16 = 0x80;
pub const SE_DACL_AUTO_INHERIT_REQ: u16 = 0x100;
pub const SE_SACL_AUTO_INHERIT_REQ: u16 = 0x200;
pub const SE_DACL_AUTO_INHERITED: u16 = 0x400;
pub const SE_SACL_AUTO_INHERITED: u16 = 0x800;
pub const SE_DACL_PROTECTED: u16 = 0x1000;
pub const SE_SACL_PROTECTED: u16 = 0x2000;
pub const SE_RM_CONTROL_VALID: u16 = 0x4000;
pub const SE_SELF_RELATIVE: u16 = 0x8000;

/// Self-relative security descriptor, as stored in `nTSecurityDescriptor`
///
/// Sections are always written in the order header, SACL, DACL, owner, group and every header
/// offset is derived from that order. All edits go through [`SecurityDescriptor::recompute_layout`]
/// so `header()` stays consistent with what [`SecurityDescriptor::encode`] produces.
#[derive(Debug, Clone, PartialEq)]
pub struct SecurityDescriptor {
    header: SecurityDescriptorHeader,
    sacl: Option<Acl>,
    dacl: Option<Acl>,
    owner: Option<Sid>,
    group: Option<Sid>,
}

impl SecurityDescriptor {
    /// Parse the Security Descriptor data. Typically contains ACLs and SIDs.
    /// Sections may appear in any order, [`SecurityDescriptor::encode`] writes them back in canonical order
    pub fn parse(data: &[u8]) -> Result<SecurityDescriptor, DescriptorError> {
        if data.len() < DESCRIPTOR_HEADER_SIZE {
            error!(
                "[sdcore] Security descriptor is {} bytes, need at least {DESCRIPTOR_HEADER_SIZE}",
                data.len()
            );
            return Err(DescriptorError::MalformedDescriptor);
        }
        let (_, header) = SecurityDescriptorHeader::parse_header(data)?;

        let empty = 0;
        let mut descriptor = SecurityDescriptor {
            header,
            sacl: None,
            dacl: None,
            owner: None,
            group: None,
        };

        if descriptor.header.offset_sacl != empty {
            let acl_start = section(data, descriptor.header.offset_sacl, "SACL")?;
            descriptor.sacl = Some(Acl::from_bytes(acl_start)?);
        }
        if descriptor.header.offset_dacl != empty {
            let acl_start = section(data, descriptor.header.offset_dacl, "DACL")?;
            descriptor.dacl = Some(Acl::from_bytes(acl_start)?);
        }
        if descriptor.header.offset_owner != empty {
            let sid_start = section(data, descriptor.header.offset_owner, "owner")?;
            descriptor.owner = Some(section_sid(sid_start)?);
        }
        if descriptor.header.offset_group != empty {
            let sid_start = section(data, descriptor.header.offset_group, "group")?;
            descriptor.group = Some(section_sid(sid_start)?);
        }

        Ok(descriptor)
    }

    /// Serialize the descriptor: header, SACL, DACL, owner, group with no padding in between.
    /// Input that used a different section order or left gaps between sections encodes to
    /// different bytes with the same contents. Only canonical input round trips byte for byte
    pub fn encode(&self) -> Vec<u8> {
        let mut data = self.layout().encode();
        if let Some(acl) = &self.sacl {
            data.extend(acl.encode());
        }
        if let Some(acl) = &self.dacl {
            data.extend(acl.encode());
        }
        if let Some(sid) = &self.owner {
            data.extend(sid.encode());
        }
        if let Some(sid) = &self.group {
            data.extend(sid.encode());
        }
        data
    }

    pub fn header(&self) -> &SecurityDescriptorHeader {
        &self.header
    }

    pub fn control(&self) -> u16 {
        self.header.control
    }

    pub fn control_flags(&self) -> Vec<ControlFlags> {
        get_control_flags(self.header.control)
    }

    pub fn sacl(&self) -> Option<&Acl> {
        self.sacl.as_ref()
    }

    pub fn dacl(&self) -> Option<&Acl> {
        self.dacl.as_ref()
    }

    /// DACL entries, empty if there is no DACL
    pub fn dacl_aces(&self) -> &[Ace] {
        match &self.dacl {
            Some(acl) => acl.aces(),
            None => &[],
        }
    }

    pub fn owner(&self) -> Option<&Sid> {
        self.owner.as_ref()
    }

    pub fn group(&self) -> Option<&Sid> {
        self.group.as_ref()
    }

    pub fn owner_sid(&self) -> String {
        self.owner.as_ref().map(|sid| sid.to_string()).unwrap_or_default()
    }

    pub fn group_sid(&self) -> String {
        self.group.as_ref().map(|sid| sid.to_string()).unwrap_or_default()
    }

    /// Replace the DACL entries in the given order. A DACL is created if the descriptor had none.
    /// Nothing changes if the entries would not fit in one ACL
    pub fn set_dacl_aces(&mut self, aces: Vec<Ace>) -> Result<(), DescriptorError> {
        let created = self.dacl.is_none();
        let mut acl = match &self.dacl {
            Some(acl) => acl.clone(),
            None => Acl::new(ACL_REVISION_DS),
        };
        if let Err(err) = acl.set_aces(aces) {
            error!("[sdcore] DACL left unchanged: {err}");
            return Err(err);
        }

        self.dacl = Some(acl);
        if created {
            self.header.control |= SE_DACL_PRESENT;
        }
        self.recompute_layout();
        Ok(())
    }

    /// Remove the DACL entry at `index`, keeping the order of the others
    pub fn remove_dacl_ace(&mut self, index: usize) -> Result<Ace, DescriptorError> {
        let mut aces = self.dacl_aces().to_vec();
        if index >= aces.len() {
            error!(
                "[sdcore] Cannot remove ACE {index}, DACL has {} entries",
                aces.len()
            );
            return Err(DescriptorError::AceIndex);
        }
        let removed = aces.remove(index);
        self.set_dacl_aces(aces)?;
        Ok(removed)
    }

    /// Insert a DACL entry at `index`. `index` may equal the entry count to append
    pub fn insert_dacl_ace(&mut self, index: usize, ace: Ace) -> Result<(), DescriptorError> {
        let mut aces = self.dacl_aces().to_vec();
        if index > aces.len() {
            error!(
                "[sdcore] Cannot insert ACE at {index}, DACL has {} entries",
                aces.len()
            );
            return Err(DescriptorError::AceIndex);
        }
        aces.insert(index, ace);
        self.set_dacl_aces(aces)?;
        Ok(())
    }

    /// Swap the DACL entry at `index` for an edited copy
    pub fn replace_dacl_ace(&mut self, index: usize, ace: Ace) -> Result<Ace, DescriptorError> {
        let mut aces = self.dacl_aces().to_vec();
        if index >= aces.len() {
            error!(
                "[sdcore] Cannot replace ACE {index}, DACL has {} entries",
                aces.len()
            );
            return Err(DescriptorError::AceIndex);
        }
        let previous = std::mem::replace(&mut aces[index], ace);
        self.set_dacl_aces(aces)?;
        Ok(previous)
    }

    /// Change owner and group together. Both SIDs are validated before anything changes
    pub fn set_owner_and_group(&mut self, owner: &str, group: &str) -> Result<(), DescriptorError> {
        let owner = Sid::from_str(owner)?;
        let group = Sid::from_str(group)?;
        self.owner = Some(owner);
        self.group = Some(group);
        self.recompute_layout();
        Ok(())
    }

    pub fn set_owner(&mut self, owner: &str) -> Result<(), DescriptorError> {
        self.owner = Some(Sid::from_str(owner)?);
        self.recompute_layout();
        Ok(())
    }

    pub fn set_group(&mut self, group: &str) -> Result<(), DescriptorError> {
        self.group = Some(Sid::from_str(group)?);
        self.recompute_layout();
        Ok(())
    }

    /// Overwrite the control word. Offsets do not move
    pub fn set_control(&mut self, control: u16) {
        self.header.control = control;
    }

    /// Rederive every header offset from the current sections
    pub fn recompute_layout(&mut self) {
        self.header = self.layout();
    }

    fn layout(&self) -> SecurityDescriptorHeader {
        let mut header = self.header.clone();
        let mut offset = DESCRIPTOR_HEADER_SIZE;
        header.offset_sacl = next_offset(&mut offset, self.sacl.as_ref().map(Acl::encoded_len));
        header.offset_dacl = next_offset(&mut offset, self.dacl.as_ref().map(Acl::encoded_len));
        header.offset_owner = next_offset(&mut offset, self.owner.as_ref().map(Sid::encoded_len));
        header.offset_group = next_offset(&mut offset, self.group.as_ref().map(Sid::encoded_len));
        header
    }
}

/// Slice the descriptor from a header offset onward
fn section<'a>(data: &'a [u8], offset: u32, name: &str) -> Result<&'a [u8], DescriptorError> {
    let start = offset as usize;
    if start < DESCRIPTOR_HEADER_SIZE || start >= data.len() {
        error!(
            "[sdcore] {name} offset {offset} is outside the {} byte security descriptor",
            data.len()
        );
        return Err(DescriptorError::MalformedDescriptor);
    }
    Ok(&data[start..])
}

/// Owner and group SIDs are exactly `count * 4 + 8` bytes, count being the SID's own second byte
fn section_sid(data: &[u8]) -> Result<Sid, DescriptorError> {
    let count_offset = 1;
    let count = match data.get(count_offset) {
        Some(result) => *result as usize,
        None => return Err(DescriptorError::Truncated),
    };
    let width = count * 4 + Sid::FIXED_SIZE;
    if data.len() < width {
        error!(
            "[sdcore] SID needs {width} bytes but only {} remain",
            data.len()
        );
        return Err(DescriptorError::Truncated);
    }
    Sid::from_bytes(&data[..width])
}

fn next_offset(offset: &mut usize, section_len: Option<usize>) -> u32 {
    match section_len {
        Some(len) => {
            let start = *offset;
            *offset += len;
            start as u32
        }
        None => 0,
    }
}

/// Get the Control Flags associated with the security descriptor
pub fn get_control_flags(control: u16) -> Vec<ControlFlags> {
    let known = [
        (SE_OWNER_DEFAULTED, ControlFlags::OwnerDefaulted),
        (SE_GROUP_DEFAULTED, ControlFlags::GroupDefaulted),
        (SE_DACL_PRESENT, ControlFlags::DaclPresent),
        (SE_DACL_DEFAULTED, ControlFlags::DaclDefaulted),
        (SE_SACL_PRESENT, ControlFlags::SaclPresent),
        (SE_SACL_DEFAULTED, ControlFlags::SaclDefaulted),
        (SE_DACL_TRUSTED, ControlFlags::DaclTrusted),
        (SE_SERVER_SECURITY, ControlFlags::ServerSecurity),
        (SE_DACL_AUTO_INHERIT_REQ, ControlFlags::DaclAutoInheritReq),
        (SE_SACL_AUTO_INHERIT_REQ, ControlFlags::SaclAutoInheritReq),
        (SE_DACL_AUTO_INHERITED, ControlFlags::DaclAutoInherited),
        (SE_SACL_AUTO_INHERITED, ControlFlags::SaclAutoInherited),
        (SE_DACL_PROTECTED, ControlFlags::DaclProtected),
        (SE_SACL_PROTECTED, ControlFlags::SaclProtected),
        (SE_RM_CONTROL_VALID, ControlFlags::ResourceManagerControlValid),
        (SE_SELF_RELATIVE, ControlFlags::SelfRelative),
    ];

    known
        .into_iter()
        .filter(|(bit, _)| (control & bit) == *bit)
        .map(|(_, flag)| flag)
        .collect()
}
