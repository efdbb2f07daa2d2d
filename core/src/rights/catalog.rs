use crate::error::CoreError;
use log::error;
use serde::Deserialize;
use std::collections::HashMap;

/// GUID to name tables used to qualify object ACE rights. Keys are lowercase GUID text
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RightsCatalog {
    /**Schema classes (`schemaIDGUID` of classSchema objects) */
    pub classes: HashMap<String, String>,
    /**Schema attributes (`schemaIDGUID` of attributeSchema objects) */
    pub attributes: HashMap<String, String>,
    pub property_sets: HashMap<String, String>,
    pub extended_rights: HashMap<String, String>,
    pub validated_writes: HashMap<String, String>,
}

const DEFAULT_CLASSES: [(&str, &str); 8] = [
    ("bf967aba-0de6-11d0-a285-00aa003049e2", "user"),
    ("bf967a9c-0de6-11d0-a285-00aa003049e2", "group"),
    ("bf967a86-0de6-11d0-a285-00aa003049e2", "computer"),
    ("bf967aa5-0de6-11d0-a285-00aa003049e2", "organizationalUnit"),
    ("5cb41ed0-0e4c-11d0-a286-00aa003049e2", "contact"),
    ("4828cc14-1437-45bc-9b07-ad6f015e5f28", "inetOrgPerson"),
    ("ce206244-5827-4a86-ba1c-1c0c386c1b64", "msDS-ManagedServiceAccount"),
    ("7b8b558a-93a5-4af7-adca-c017e67f1057", "msDS-GroupManagedServiceAccount"),
];

const DEFAULT_ATTRIBUTES: [(&str, &str); 9] = [
    ("bf9679c0-0de6-11d0-a285-00aa003049e2", "member"),
    ("f3a64788-5306-11d1-a9c5-0000f80367c1", "servicePrincipalName"),
    ("5b47d60f-6090-40b2-9f37-2a4de88f3063", "msDS-KeyCredentialLink"),
    (
        "3f78c3e5-f79a-46bd-a0b8-9d18116ddc79",
        "msDS-AllowedToActOnBehalfOfOtherIdentity",
    ),
    ("f30e3bc2-9ff0-11d1-b603-0000f80367c1", "gPLink"),
    ("bf967a68-0de6-11d0-a285-00aa003049e2", "userAccountControl"),
    ("bf9679a8-0de6-11d0-a285-00aa003049e2", "scriptPath"),
    ("bf967a0a-0de6-11d0-a285-00aa003049e2", "pwdLastSet"),
    ("72e39547-7b18-11d1-adef-00c04fd8d5cd", "dNSHostName"),
];

const DEFAULT_PROPERTY_SETS: [(&str, &str); 8] = [
    ("4c164200-20c0-11d0-a768-00aa006e0529", "Account Restrictions"),
    ("5f202010-79a5-11d0-9020-00c04fc2d4cf", "Logon Information"),
    ("bc0ac240-79a9-11d0-9020-00c04fc2d4cf", "Group Membership"),
    ("59ba2f42-79a2-11d0-9020-00c04fc2d3cf", "General Information"),
    ("77b5b886-944a-11d1-aebd-0000f80367c1", "Personal Information"),
    ("e48d0154-bcf8-11d1-8702-00c04fb96050", "Public Information"),
    ("e45795b3-9455-11d1-aebd-0000f80367c1", "Web Information"),
    ("e45795b2-9455-11d1-aebd-0000f80367c1", "Phone and Mail Options"),
];

const DEFAULT_EXTENDED_RIGHTS: [(&str, &str); 11] = [
    (
        "00299570-246d-11d0-a768-00aa006e0529",
        "User-Force-Change-Password",
    ),
    ("ab721a53-1e2f-11d0-9819-00aa0040529b", "User-Change-Password"),
    ("ab721a54-1e2f-11d0-9819-00aa0040529b", "Send-As"),
    ("ab721a56-1e2f-11d0-9819-00aa0040529b", "Receive-As"),
    (
        "1131f6aa-9c07-11d1-f79f-00c04fc2dcd2",
        "DS-Replication-Get-Changes",
    ),
    (
        "1131f6ad-9c07-11d1-f79f-00c04fc2dcd2",
        "DS-Replication-Get-Changes-All",
    ),
    (
        "89e95b76-444d-4c62-991a-0facbeda640c",
        "DS-Replication-Get-Changes-In-Filtered-Set",
    ),
    ("0e10c968-78fb-11d2-90d4-00c04f79dc55", "Certificate-Enrollment"),
    (
        "a05b8cc2-17bc-4802-a710-e7c15ab866a2",
        "Certificate-AutoEnrollment",
    ),
    ("ee98ee94-de5f-4f4e-8e89-0adf6c2acc8c", "Manage-CA"),
    ("68b1d179-0d15-4d4f-ab71-46152e79a7bc", "Allowed-To-Authenticate"),
];

const DEFAULT_VALIDATED_WRITES: [(&str, &str); 4] = [
    ("bf9679c0-0de6-11d0-a285-00aa003049e2", "Self-Membership"),
    ("f3a64788-5306-11d1-a9c5-0000f80367c1", "Validated-SPN"),
    ("72e39547-7b18-11d1-adef-00c04fd8d5cd", "Validated-DNS-Host-Name"),
    (
        "80863791-dbe9-4eb8-837e-7f0ab55d9ac7",
        "Validated-MS-DS-Additional-DNS-Host-Name",
    ),
];

impl RightsCatalog {
    /// Catalog seeded with common Active Directory classes, attributes, property sets and rights
    pub fn with_defaults() -> RightsCatalog {
        RightsCatalog {
            classes: to_table(&DEFAULT_CLASSES),
            attributes: to_table(&DEFAULT_ATTRIBUTES),
            property_sets: to_table(&DEFAULT_PROPERTY_SETS),
            extended_rights: to_table(&DEFAULT_EXTENDED_RIGHTS),
            validated_writes: to_table(&DEFAULT_VALIDATED_WRITES),
        }
    }

    /// Parse a JSON catalog exported from schema discovery
    pub fn from_json(data: &[u8]) -> Result<RightsCatalog, CoreError> {
        let catalog_result = serde_json::from_slice(data);
        let mut catalog: RightsCatalog = match catalog_result {
            Ok(result) => result,
            Err(err) => {
                error!("[sdcore] Failed to parse JSON rights catalog: {err:?}");
                return Err(CoreError::BadJson);
            }
        };
        catalog.normalize();
        Ok(catalog)
    }

    /// Lowercase every GUID key so lookups are case insensitive
    pub fn normalize(&mut self) {
        for table in [
            &mut self.classes,
            &mut self.attributes,
            &mut self.property_sets,
            &mut self.extended_rights,
            &mut self.validated_writes,
        ] {
            *table = table
                .drain()
                .map(|(guid, name)| (guid.trim().to_lowercase(), name))
                .collect();
        }
    }

    /// Add entries from another catalog. Entries from `other` win on conflicts
    pub fn merge(&mut self, mut other: RightsCatalog) {
        other.normalize();
        self.classes.extend(other.classes);
        self.attributes.extend(other.attributes);
        self.property_sets.extend(other.property_sets);
        self.extended_rights.extend(other.extended_rights);
        self.validated_writes.extend(other.validated_writes);
    }

    pub fn class_name(&self, guid: &str) -> Option<&str> {
        lookup(&self.classes, guid)
    }

    /// Attributes are checked before property sets
    pub fn property_name(&self, guid: &str) -> Option<&str> {
        lookup(&self.attributes, guid).or_else(|| lookup(&self.property_sets, guid))
    }

    pub fn extended_right_name(&self, guid: &str) -> Option<&str> {
        lookup(&self.extended_rights, guid)
    }

    pub fn validated_write_name(&self, guid: &str) -> Option<&str> {
        lookup(&self.validated_writes, guid)
    }
}

fn to_table(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(guid, name)| (guid.to_string(), name.to_string()))
        .collect()
}

fn lookup<'a>(table: &'a HashMap<String, String>, guid: &str) -> Option<&'a str> {
    table
        .get(&guid.trim().to_lowercase())
        .map(String::as_str)
}
