use crate::{
    error::CoreError,
    rights::{catalog::RightsCatalog, principals::WellKnownSids},
    securitydescriptor::sid::Sid,
};
use log::error;
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs::read,
    str::{from_utf8, FromStr},
};

/// sdtool configuration file
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SdToml {
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub catalog: CatalogToml,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Output {
    /**warn, error, info or debug */
    pub logging: Option<String>,
    /**Log to this file instead of stderr */
    pub log_file: Option<String>,
    /**json or text */
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            logging: None,
            log_file: None,
            format: default_format(),
        }
    }
}

/// GUID and SID name tables. Anything listed here overrides the built in names
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CatalogToml {
    /**Start from the built in Active Directory names */
    pub use_defaults: bool,
    /**JSON catalog exported by schema discovery */
    pub json_file: Option<String>,
    #[serde(flatten)]
    pub tables: RightsCatalog,
    /**SID to display name */
    pub principals: HashMap<String, String>,
}

impl Default for CatalogToml {
    fn default() -> Self {
        CatalogToml {
            use_defaults: true,
            json_file: None,
            tables: RightsCatalog::default(),
            principals: HashMap::new(),
        }
    }
}

fn default_format() -> String {
    String::from("json")
}

impl SdToml {
    /// Parse sdtool TOML configuration data
    pub fn parse_toml_data(toml_data: &[u8]) -> Result<SdToml, CoreError> {
        let toml_results = toml::from_str(from_utf8(toml_data).unwrap_or_default());
        let mut config: SdToml = match toml_results {
            Ok(results) => results,
            Err(err) => {
                error!("[sdcore] Failed to parse TOML data. Error: {err:?}");
                return Err(CoreError::BadToml);
            }
        };

        // Format is always lowercase
        config.output.format = config.output.format.to_lowercase();
        config.catalog.tables.normalize();
        Ok(config)
    }

    /// Read and parse a TOML configuration file
    pub fn parse_toml_file(path: &str) -> Result<SdToml, CoreError> {
        let buffer = read_path(path)?;
        SdToml::parse_toml_data(&buffer)
    }

    /// Build the catalog: built in names, then the JSON export, then the TOML tables
    pub fn rights_catalog(&self) -> Result<RightsCatalog, CoreError> {
        let mut catalog = if self.catalog.use_defaults {
            RightsCatalog::with_defaults()
        } else {
            RightsCatalog::default()
        };

        if let Some(path) = &self.catalog.json_file {
            let buffer = read_path(path)?;
            catalog.merge(RightsCatalog::from_json(&buffer)?);
        }
        catalog.merge(self.catalog.tables.clone());
        Ok(catalog)
    }

    /// Configured principal names first, then well known SIDs.
    /// Keys are rewritten to the text a parsed SID displays as, so any accepted spelling matches
    pub fn principal_resolver(&self) -> (HashMap<String, String>, WellKnownSids) {
        let names = self
            .catalog
            .principals
            .iter()
            .map(|(sid, name)| (canonical_sid(sid), name.clone()))
            .collect();
        (names, WellKnownSids)
    }
}

fn canonical_sid(text: &str) -> String {
    match Sid::from_str(text.trim()) {
        Ok(sid) => sid.to_string(),
        Err(_) => text.trim().to_string(),
    }
}

fn read_path(path: &str) -> Result<Vec<u8>, CoreError> {
    match read(path) {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[sdcore] Failed to read file {path}. Error: {err:?}");
            Err(CoreError::NoFile)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SdToml;
    use crate::{error::CoreError, rights::principals::PrincipalResolver};
    use std::path::PathBuf;

    #[test]
    fn test_parse_toml_file() {
        let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        test_location.push("tests/test_data/sdtool.toml");

        let result = SdToml::parse_toml_file(&test_location.display().to_string()).unwrap();
        assert_eq!(result.output.logging, Some(String::from("debug")));
        assert_eq!(result.output.format, "text");
        assert!(result.catalog.use_defaults);

        let catalog = result.rights_catalog().unwrap();
        assert_eq!(
            catalog.class_name("bf967aba-0de6-11d0-a285-00aa003049e2"),
            Some("user")
        );
        assert_eq!(
            catalog.extended_right_name("ab721a53-1e2f-11d0-9819-00aa0040529b"),
            Some("Change Password")
        );
        assert_eq!(
            catalog.property_name("bf967950-0de6-11d0-a285-00aa003049e2"),
            Some("description")
        );

        let resolver = result.principal_resolver();
        assert_eq!(
            resolver.resolve("S-1-5-21-3623811015-3361044348-30300820-1013"),
            Some(String::from("CONTOSO\\helpdesk"))
        );
        assert_eq!(
            resolver.resolve("S-1-5-32-544"),
            Some(String::from("BUILTIN\\Administrators"))
        );
    }

    #[test]
    fn test_principal_spellings() {
        let test = br#"
[catalog.principals]
"s-1-5-21-3623811015-3361044348-30300820-1013" = "CONTOSO\\helpdesk"
"s-1-0X1000000000-5" = "Vendor principal"
" S-1-0x123456789abc-7 " = "Other vendor"
"#;
        let result = SdToml::parse_toml_data(test).unwrap();
        let resolver = result.principal_resolver();
        assert_eq!(
            resolver.resolve("S-1-5-21-3623811015-3361044348-30300820-1013"),
            Some(String::from("CONTOSO\\helpdesk"))
        );
        assert_eq!(
            resolver.resolve("S-1-0x001000000000-5"),
            Some(String::from("Vendor principal"))
        );
        assert_eq!(
            resolver.resolve("S-1-0x123456789ABC-7"),
            Some(String::from("Other vendor"))
        );
    }

    #[test]
    fn test_parse_toml_defaults() {
        let result = SdToml::parse_toml_data(b"").unwrap();
        assert_eq!(result.output.format, "json");
        assert_eq!(result.output.logging, None);
        assert!(result.catalog.use_defaults);
        assert!(result.catalog.principals.is_empty());
    }

    #[test]
    fn test_without_defaults() {
        let test = b"[catalog]\nuse_defaults = false\n";
        let result = SdToml::parse_toml_data(test).unwrap();
        let catalog = result.rights_catalog().unwrap();
        assert!(catalog.classes.is_empty());
    }

    #[test]
    fn test_bad_toml() {
        let test = b"[output\nformat = ";
        assert_eq!(SdToml::parse_toml_data(test).unwrap_err(), CoreError::BadToml);
    }

    #[test]
    fn test_missing_file() {
        assert_eq!(
            SdToml::parse_toml_file("/this/path/does/not/exist.toml").unwrap_err(),
            CoreError::NoFile
        );
    }

    #[test]
    fn test_missing_json_catalog() {
        let test = b"[catalog]\njson_file = \"/this/path/does/not/exist.json\"\n";
        let result = SdToml::parse_toml_data(test).unwrap();
        assert_eq!(result.rights_catalog().unwrap_err(), CoreError::NoFile);
    }
}
