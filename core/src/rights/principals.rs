use crate::securitydescriptor::sid::Sid;
use std::{collections::HashMap, str::FromStr};

/// Turns SID text into a display name
pub trait PrincipalResolver {
    fn resolve(&self, sid: &str) -> Option<String>;
}

/// Resolve `sid`, falling back to the SID text
pub fn display_name(resolver: &dyn PrincipalResolver, sid: &str) -> String {
    resolver.resolve(sid).unwrap_or_else(|| sid.to_string())
}

impl PrincipalResolver for HashMap<String, String> {
    fn resolve(&self, sid: &str) -> Option<String> {
        self.get(sid).cloned()
    }
}

/// Try the first resolver, then the second
impl<A: PrincipalResolver, B: PrincipalResolver> PrincipalResolver for (A, B) {
    fn resolve(&self, sid: &str) -> Option<String> {
        self.0.resolve(sid).or_else(|| self.1.resolve(sid))
    }
}

/// Built in and domain relative principals every Windows domain has
#[derive(Debug, Clone, Copy, Default)]
pub struct WellKnownSids;

const WELL_KNOWN: [(&str, &str); 27] = [
    ("S-1-0-0", "Nobody"),
    ("S-1-1-0", "Everyone"),
    ("S-1-3-0", "Creator Owner"),
    ("S-1-3-1", "Creator Group"),
    ("S-1-3-4", "Owner Rights"),
    ("S-1-5-7", "NT AUTHORITY\\ANONYMOUS LOGON"),
    ("S-1-5-9", "NT AUTHORITY\\ENTERPRISE DOMAIN CONTROLLERS"),
    ("S-1-5-10", "NT AUTHORITY\\SELF"),
    ("S-1-5-11", "NT AUTHORITY\\Authenticated Users"),
    ("S-1-5-18", "NT AUTHORITY\\SYSTEM"),
    ("S-1-5-19", "NT AUTHORITY\\LOCAL SERVICE"),
    ("S-1-5-20", "NT AUTHORITY\\NETWORK SERVICE"),
    ("S-1-5-32-544", "BUILTIN\\Administrators"),
    ("S-1-5-32-545", "BUILTIN\\Users"),
    ("S-1-5-32-546", "BUILTIN\\Guests"),
    ("S-1-5-32-548", "BUILTIN\\Account Operators"),
    ("S-1-5-32-549", "BUILTIN\\Server Operators"),
    ("S-1-5-32-550", "BUILTIN\\Print Operators"),
    ("S-1-5-32-551", "BUILTIN\\Backup Operators"),
    ("S-1-5-32-552", "BUILTIN\\Replicator"),
    ("S-1-5-32-554", "BUILTIN\\Pre-Windows 2000 Compatible Access"),
    ("S-1-5-32-555", "BUILTIN\\Remote Desktop Users"),
    ("S-1-5-32-557", "BUILTIN\\Incoming Forest Trust Builders"),
    ("S-1-5-32-560", "BUILTIN\\Windows Authorization Access Group"),
    ("S-1-5-32-561", "BUILTIN\\Terminal Server License Servers"),
    ("S-1-5-32-562", "BUILTIN\\Distributed COM Users"),
    ("S-1-5-32-580", "BUILTIN\\Remote Management Users"),
];

/// RIDs that mean the same thing in every domain
const DOMAIN_RIDS: [(u32, &str); 16] = [
    (500, "Administrator"),
    (501, "Guest"),
    (502, "krbtgt"),
    (512, "Domain Admins"),
    (513, "Domain Users"),
    (514, "Domain Guests"),
    (515, "Domain Computers"),
    (516, "Domain Controllers"),
    (517, "Cert Publishers"),
    (518, "Schema Admins"),
    (519, "Enterprise Admins"),
    (520, "Group Policy Creator Owners"),
    (521, "Read-only Domain Controllers"),
    (526, "Key Admins"),
    (527, "Enterprise Key Admins"),
    (553, "RAS and IAS Servers"),
];

impl PrincipalResolver for WellKnownSids {
    fn resolve(&self, sid: &str) -> Option<String> {
        let sid = sid.trim();
        if let Some((_, name)) = WELL_KNOWN
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(sid))
        {
            return Some(name.to_string());
        }

        let parsed = Sid::from_str(sid).ok()?;
        // S-1-5-21-<three domain sub authorities>-<rid>
        let nt_authority = 5;
        let non_unique = 21;
        let domain_sub_authorities = 5;
        if parsed.authority != nt_authority
            || parsed.sub_authorities.len() != domain_sub_authorities
            || parsed.sub_authorities.first() != Some(&non_unique)
        {
            return None;
        }
        let rid = parsed.rid()?;
        DOMAIN_RIDS
            .iter()
            .find(|(known, _)| *known == rid)
            .map(|(_, name)| name.to_string())
    }
}
