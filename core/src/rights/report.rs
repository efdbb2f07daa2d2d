use super::{
    catalog::RightsCatalog,
    mask::describe_mask,
    principals::{display_name, PrincipalResolver},
    scope::describe_flags,
};
use crate::securitydescriptor::{
    ace::{Ace, NO_PROPAGATE_INHERIT_ACE},
    descriptor::SecurityDescriptor,
};
use common::windows::{AceRow, DescriptorSummary};

/// Translate one ACE into a table row
pub fn describe_ace(
    index: usize,
    ace: &Ace,
    catalog: &RightsCatalog,
    resolver: &dyn PrincipalResolver,
) -> AceRow {
    let ace_flags = ace.header().ace_flags;
    let (object_type_guid, inherited_object_type_guid) = ace.get_object_and_inherited_type();
    let sid = ace.sid_string();

    // Opaque entries have no mask or trustee to describe
    let (rights, severity, principal) = match ace.mask() {
        Some(mask) => {
            let description = describe_mask(mask, &object_type_guid, catalog);
            (
                description.phrases,
                description.severity,
                display_name(resolver, &sid),
            )
        }
        None => (Vec::new(), 0, String::new()),
    };

    AceRow {
        index,
        kind: ace.kind(),
        principal,
        sid,
        rights,
        severity,
        inherited: ace.is_inherited(),
        scope: describe_flags(ace_flags, &inherited_object_type_guid, catalog),
        no_propagate: (ace_flags & NO_PROPAGATE_INHERIT_ACE) == NO_PROPAGATE_INHERIT_ACE,
        flags: ace.flags(),
        mask: ace.mask().unwrap_or_default(),
        object_type_guid,
        inherited_object_type_guid,
    }
}

/// One row per DACL entry, in DACL order
pub fn describe_dacl(
    descriptor: &SecurityDescriptor,
    catalog: &RightsCatalog,
    resolver: &dyn PrincipalResolver,
) -> Vec<AceRow> {
    descriptor
        .dacl_aces()
        .iter()
        .enumerate()
        .map(|(index, ace)| describe_ace(index, ace, catalog, resolver))
        .collect()
}

/// Owner, group, control flags and every DACL row
pub fn summarize(
    descriptor: &SecurityDescriptor,
    catalog: &RightsCatalog,
    resolver: &dyn PrincipalResolver,
) -> DescriptorSummary {
    let rows = describe_dacl(descriptor, catalog, resolver);
    let max_severity = rows.iter().map(|row| row.severity).max().unwrap_or_default();
    let owner_sid = descriptor.owner_sid();
    let group_sid = descriptor.group_sid();

    DescriptorSummary {
        owner: principal_or_empty(resolver, &owner_sid),
        owner_sid,
        group: principal_or_empty(resolver, &group_sid),
        group_sid,
        control_flags: descriptor.control_flags(),
        sacl_entries: descriptor.sacl().map(|acl| acl.len()).unwrap_or_default(),
        rows,
        max_severity,
    }
}

fn principal_or_empty(resolver: &dyn PrincipalResolver, sid: &str) -> String {
    if sid.is_empty() {
        return String::new();
    }
    display_name(resolver, sid)
}
