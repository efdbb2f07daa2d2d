use crate::{
    error::CoreError,
    rights::report::summarize,
    securitydescriptor::descriptor::SecurityDescriptor,
    utils::{
        encoding::{base64_decode_standard, base64_encode_standard},
        sd_toml::SdToml,
    },
};
use common::windows::{AceKind, DescriptorSummary};
use log::{error, info};

/// Load a TOML config, or the defaults if no path is given
pub fn load_config(path: Option<&str>) -> Result<SdToml, CoreError> {
    match path {
        Some(config) => SdToml::parse_toml_file(config),
        None => Ok(SdToml::default()),
    }
}

/// Parse raw `nTSecurityDescriptor` bytes and describe every DACL entry
pub fn describe_bytes(data: &[u8], config: &SdToml) -> Result<DescriptorSummary, CoreError> {
    let descriptor = SecurityDescriptor::parse(data)?;
    let catalog = config.rights_catalog()?;
    let resolver = config.principal_resolver();
    Ok(summarize(&descriptor, &catalog, &resolver))
}

/// Describe a base64 security descriptor using the configured output format
pub fn describe_base64(data: &str, config: &SdToml) -> Result<String, CoreError> {
    let bytes = base64_decode_standard(data)?;
    let summary = describe_bytes(&bytes, config)?;
    info!(
        "[sdcore] Described {} DACL entries, highest severity {}",
        summary.rows.len(),
        summary.max_severity
    );

    if config.output.format == "text" {
        return Ok(render_text(&summary));
    }
    match serde_json::to_string_pretty(&summary) {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[sdcore] Failed to serialize descriptor summary: {err:?}");
            Err(CoreError::Serialize)
        }
    }
}

/// Delete one DACL entry and return the re-encoded descriptor
pub fn remove_ace_base64(data: &str, index: usize) -> Result<String, CoreError> {
    let mut descriptor = decode_descriptor(data)?;
    let removed = descriptor.remove_dacl_ace(index)?;
    info!(
        "[sdcore] Removed ACE {index} for {}",
        removed.sid_string()
    );
    Ok(base64_encode_standard(&descriptor.encode()))
}

/// Change the owner, and the group if one is given, then re-encode
pub fn set_owner_base64(data: &str, owner: &str, group: Option<&str>) -> Result<String, CoreError> {
    let mut descriptor = decode_descriptor(data)?;
    match group {
        Some(group_sid) => descriptor.set_owner_and_group(owner, group_sid)?,
        None => descriptor.set_owner(owner)?,
    }
    Ok(base64_encode_standard(&descriptor.encode()))
}

/// Overwrite the control flags and re-encode
pub fn set_control_base64(data: &str, control: u16) -> Result<String, CoreError> {
    let mut descriptor = decode_descriptor(data)?;
    descriptor.set_control(control);
    Ok(base64_encode_standard(&descriptor.encode()))
}

fn decode_descriptor(data: &str) -> Result<SecurityDescriptor, CoreError> {
    let bytes = base64_decode_standard(data)?;
    Ok(SecurityDescriptor::parse(&bytes)?)
}

/// Plain table for terminals
pub fn render_text(summary: &DescriptorSummary) -> String {
    let mut text = format!(
        "Owner: {} ({})\nGroup: {} ({})\nControl: {:?}\nSACL entries: {}\n\n",
        summary.owner,
        summary.owner_sid,
        summary.group,
        summary.group_sid,
        summary.control_flags,
        summary.sacl_entries
    );

    for row in &summary.rows {
        let kind = match row.kind {
            AceKind::Allow => "Allow",
            AceKind::Deny => "Deny",
            AceKind::Other => "Other",
        };
        let inherited = if row.inherited { " (inherited)" } else { "" };
        text.push_str(&format!(
            "[{}] {kind} {} severity {}{inherited}\n    {}\n    {}\n",
            row.index,
            row.principal,
            row.severity,
            row.rights.join(", "),
            row.scope
        ));
    }
    text
}
