use serde::Serialize;

/// Whether an ACE grants or denies its rights
#[derive(Debug, PartialEq, Serialize, Clone, Copy)]
pub enum AceKind {
    Allow,
    Deny,
    /**Audit, alarm, label and any other ACE type kept as opaque bytes */
    Other,
}

#[derive(Debug, PartialEq, Serialize, Clone)]
pub enum AceFlags {
    ObjectInherit,
    ContainerInherit,
    NoPropagateInherit,
    InheritOnly,
    Inherited,
    SuccessfulAccess,
    FailedAccess,
}

#[derive(Debug, PartialEq, Serialize, Clone)]
pub enum ControlFlags {
    OwnerDefaulted,
    GroupDefaulted,
    DaclPresent,
    DaclDefaulted,
    SaclPresent,
    SaclDefaulted,
    DaclTrusted,
    ServerSecurity,
    DaclAutoInheritReq,
    SaclAutoInheritReq,
    DaclAutoInherited,
    SaclAutoInherited,
    DaclProtected,
    SaclProtected,
    ResourceManagerControlValid,
    SelfRelative,
}

/// One DACL entry translated into something a table can render
#[derive(Debug, PartialEq, Serialize, Clone)]
pub struct AceRow {
    /**Position of the ACE in the DACL. Edits address ACEs by this index */
    pub index: usize,
    pub kind: AceKind,
    pub principal: String,
    pub sid: String,
    pub rights: Vec<String>,
    /**0 (benign) to 3 (full control) */
    pub severity: u8,
    pub inherited: bool,
    pub scope: String,
    pub no_propagate: bool,
    pub flags: Vec<AceFlags>,
    pub mask: u32,
    /**Only if Object ACE and ACE_OBJECT_TYPE_PRESENT object flag */
    pub object_type_guid: String,
    /**Only if Object ACE and ACE_INHERITED_OBJECT_TYPE_PRESENT object flag */
    pub inherited_object_type_guid: String,
}

#[derive(Debug, PartialEq, Serialize, Clone)]
pub struct DescriptorSummary {
    pub owner: String,
    pub owner_sid: String,
    pub group: String,
    pub group_sid: String,
    pub control_flags: Vec<ControlFlags>,
    pub sacl_entries: usize,
    pub rows: Vec<AceRow>,
    pub max_severity: u8,
}
