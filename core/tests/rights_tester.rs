use sdcore::{
    core::{describe_bytes, load_config},
    rights::{
        catalog::RightsCatalog,
        mask::describe_mask,
        principals::WellKnownSids,
        report::describe_dacl,
    },
    securitydescriptor::descriptor::SecurityDescriptor,
    utils::sd_toml::SdToml,
};
use std::{fs::read, path::PathBuf};

fn test_path(name: &str) -> String {
    let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    test_location.push("tests/test_data");
    test_location.push(name);
    test_location.display().to_string()
}

#[test]
fn test_describe_fixture_with_config() {
    let config = load_config(Some(&test_path("sdtool.toml"))).unwrap();
    let data = read(test_path("ad_user.raw")).unwrap();

    let summary = describe_bytes(&data, &config).unwrap();
    assert_eq!(summary.owner, "BUILTIN\\Administrators");
    assert_eq!(summary.group, "Domain Users");
    assert_eq!(summary.rows[2].principal, "CONTOSO\\helpdesk");
    assert_eq!(summary.rows[2].scope, "All descendant user objects");
    assert_eq!(summary.max_severity, 3);
}

#[test]
fn test_describe_without_catalog() {
    let data = read(test_path("ad_user.raw")).unwrap();
    let descriptor = SecurityDescriptor::parse(&data).unwrap();
    let rows = describe_dacl(&descriptor, &RightsCatalog::default(), &WellKnownSids);

    assert_eq!(
        rows[1].rights,
        ["Extended right: 00299570-246d-11d0-a768-00aa006e0529"]
    );
    assert_eq!(
        rows[2].scope,
        "All descendant bf967aba-0de6-11d0-a285-00aa003049e2 objects"
    );
}

#[test]
fn test_generic_write_scenario() {
    let catalog = RightsCatalog::with_defaults();
    let write = describe_mask(0x00020028, "", &catalog);
    assert_eq!(write.phrases, ["Generic write"]);
    assert_eq!(write.severity, 1);

    let write_dacl = describe_mask(0x00020028 | 0x00040000, "", &catalog);
    assert_eq!(write_dacl.phrases, ["Generic write", "Modify permissions"]);
    assert_eq!(write_dacl.severity, 1);
}

#[test]
fn test_default_config() {
    let config = SdToml::default();
    let catalog = config.rights_catalog().unwrap();
    let full = describe_mask(0xffffffff, "bf967aba-0de6-11d0-a285-00aa003049e2", &catalog);
    assert_eq!(full.phrases, ["Full control"]);
    assert_eq!(full.severity, 3);
}
