use super::catalog::RightsCatalog;
use serde::Serialize;

pub const RIGHT_DS_CREATE_CHILD: u32 = 0x1;
pub const RIGHT_DS_DELETE_CHILD: u32 = 0x2;
pub const RIGHT_DS_LIST_CONTENTS: u32 = 0x4;
pub const RIGHT_DS_SELF: u32 = 0x8;
pub const RIGHT_DS_READ_PROPERTY: u32 = 0x10;
pub const RIGHT_DS_WRITE_PROPERTY: u32 = 0x20;
pub const RIGHT_DS_DELETE_TREE: u32 = 0x40;
pub const RIGHT_DS_LIST_OBJECT: u32 = 0x80;
pub const RIGHT_DS_CONTROL_ACCESS: u32 = 0x100;
pub const RIGHT_DELETE: u32 = 0x10000;
pub const RIGHT_READ_CONTROL: u32 = 0x20000;
pub const RIGHT_WRITE_DACL: u32 = 0x40000;
pub const RIGHT_WRITE_OWNER: u32 = 0x80000;

pub const GENERIC_ALL: u32 = 0x10000000;
pub const GENERIC_EXECUTE: u32 = 0x20000000;
pub const GENERIC_WRITE: u32 = 0x40000000;
pub const GENERIC_READ: u32 = 0x80000000;

/// Every directory service right plus the standard rights
pub const FULL_CONTROL_MASK: u32 = 0xf01ff;
/// READ_CONTROL, LIST_CONTENTS, READ_PROPERTY and LIST_OBJECT
pub const GENERIC_READ_MASK: u32 = 0x20094;
/// READ_CONTROL, SELF and WRITE_PROPERTY
pub const GENERIC_WRITE_MASK: u32 = 0x20028;
/// READ_CONTROL and LIST_CONTENTS
pub const GENERIC_EXECUTE_MASK: u32 = 0x20004;

/// Human readable rights for one access mask
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaskDescription {
    pub phrases: Vec<String>,
    /**0 read only, 1 can change data, 2 validated writes or extended rights, 3 full control */
    pub severity: u8,
}

/// Replace the four generic bits with the directory rights they grant
pub fn map_generic_bits(mask: u32) -> u32 {
    let generic = [
        (GENERIC_ALL, FULL_CONTROL_MASK),
        (GENERIC_EXECUTE, GENERIC_EXECUTE_MASK),
        (GENERIC_WRITE, GENERIC_WRITE_MASK),
        (GENERIC_READ, GENERIC_READ_MASK),
    ];

    let mut mapped = mask;
    for (bit, rights) in generic {
        if has_rights(mask, bit) {
            mapped = (mapped & !bit) | rights;
        }
    }
    mapped
}

/// Translate an access mask into ordered phrases and a severity tier.
/// `object_type` narrows property, child, validated write and extended rights. Empty means all of them
pub fn describe_mask(mask: u32, object_type: &str, catalog: &RightsCatalog) -> MaskDescription {
    let mapped = map_generic_bits(mask);
    if has_rights(mapped, FULL_CONTROL_MASK) {
        return MaskDescription {
            phrases: vec![String::from("Full control")],
            severity: 3,
        };
    }

    let guid = object_type.trim().to_lowercase();
    let mut phrases = Vec::new();
    let mut severity = 0;

    let generic_read = has_rights(mapped, GENERIC_READ_MASK);
    let generic_write = has_rights(mapped, GENERIC_WRITE_MASK);

    // Bits covered by a generic phrase are not described again
    let mut remaining = mapped;
    if generic_read {
        phrases.push(String::from("Generic read"));
        remaining &= !GENERIC_READ_MASK;
    }
    if generic_write {
        phrases.push(String::from("Generic write"));
        remaining &= !GENERIC_WRITE_MASK;
    }

    let can_modify = [
        RIGHT_DS_CREATE_CHILD,
        RIGHT_DS_DELETE_CHILD,
        RIGHT_DS_WRITE_PROPERTY,
    ];
    if generic_write || can_modify.iter().any(|bit| has_rights(mapped, *bit)) {
        severity = 1;
    }

    let property = resolve(&guid, catalog.property_name(&guid));
    let class = resolve(&guid, catalog.class_name(&guid));

    if has_rights(remaining, RIGHT_DS_READ_PROPERTY) {
        phrases.push(match &property {
            Some(name) => format!("Read {name}"),
            None => String::from("Read all properties"),
        });
    }
    if has_rights(remaining, RIGHT_DS_WRITE_PROPERTY) {
        phrases.push(match &property {
            Some(name) => format!("Write {name}"),
            None => String::from("Write all properties"),
        });
    }
    if has_rights(remaining, RIGHT_DS_CREATE_CHILD) {
        phrases.push(match &class {
            Some(name) => format!("Create {name} objects"),
            None => String::from("Create all child objects"),
        });
    }
    if has_rights(remaining, RIGHT_DS_DELETE_CHILD) {
        phrases.push(match &class {
            Some(name) => format!("Delete {name} objects"),
            None => String::from("Delete all child objects"),
        });
    }
    if has_rights(remaining, RIGHT_DS_LIST_CONTENTS) {
        phrases.push(String::from("List contents"));
    }
    if has_rights(remaining, RIGHT_DS_SELF) {
        severity = 2;
        phrases.push(
            match resolve(&guid, catalog.validated_write_name(&guid)) {
                Some(name) => format!("Validated write: {name}"),
                None => String::from("All validated writes"),
            },
        );
    }
    if has_rights(remaining, RIGHT_DS_DELETE_TREE) {
        phrases.push(String::from("Delete subtree"));
    }
    if has_rights(remaining, RIGHT_DS_LIST_OBJECT) {
        phrases.push(String::from("List object"));
    }
    if has_rights(remaining, RIGHT_DS_CONTROL_ACCESS) {
        severity = 2;
        phrases.push(
            match resolve(&guid, catalog.extended_right_name(&guid)) {
                Some(name) => format!("Extended right: {name}"),
                None => String::from("All extended rights"),
            },
        );
    }

    let standard = [
        (RIGHT_DELETE, "Delete"),
        (RIGHT_READ_CONTROL, "Read permissions"),
        (RIGHT_WRITE_DACL, "Modify permissions"),
        (RIGHT_WRITE_OWNER, "Modify owner"),
    ];
    for (bit, phrase) in standard {
        if has_rights(remaining, bit) {
            phrases.push(String::from(phrase));
        }
    }

    MaskDescription { phrases, severity }
}

fn has_rights(mask: u32, rights: u32) -> bool {
    (mask & rights) == rights
}

/// No GUID means the right applies to everything. Unknown GUIDs are shown as-is
fn resolve(guid: &str, name: Option<&str>) -> Option<String> {
    if guid.is_empty() {
        return None;
    }
    Some(name.unwrap_or(guid).to_string())
}
