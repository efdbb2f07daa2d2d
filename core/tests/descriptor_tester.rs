use sdcore::securitydescriptor::{
    ace::Ace, descriptor::SecurityDescriptor, error::DescriptorError, sid::Sid,
};
use std::{fs::read, path::PathBuf, str::FromStr};

fn fixture() -> Vec<u8> {
    let mut test_location = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    test_location.push("tests/test_data/ad_user.raw");
    read(test_location).unwrap()
}

#[test]
fn test_descriptor_round_trip() {
    let data = fixture();
    let descriptor = SecurityDescriptor::parse(&data).unwrap();
    assert_eq!(descriptor.encode(), data);
}

#[test]
fn test_descriptor_edit_cycle() {
    let data = fixture();
    let mut descriptor = SecurityDescriptor::parse(&data).unwrap();

    let everyone_delete = descriptor.remove_dacl_ace(3).unwrap();
    assert_eq!(everyone_delete.sid_string(), "S-1-1-0");

    let ace = Ace::new_basic(1, 0x2, 0x10000, "S-1-5-11").unwrap();
    descriptor.insert_dacl_ace(0, ace).unwrap();
    descriptor
        .set_owner("S-1-5-21-3623811015-3361044348-30300820-512")
        .unwrap();

    let encoded = descriptor.encode();
    let reparsed = SecurityDescriptor::parse(&encoded).unwrap();
    assert_eq!(reparsed, descriptor);
    assert_eq!(reparsed.dacl_aces().len(), 4);
    assert_eq!(reparsed.dacl_aces()[0].sid_string(), "S-1-5-11");
    assert_eq!(
        reparsed.owner_sid(),
        "S-1-5-21-3623811015-3361044348-30300820-512"
    );

    let header = reparsed.header();
    let dacl = reparsed.dacl().unwrap();
    assert_eq!(header.offset_sacl, 20);
    assert_eq!(header.offset_dacl, 48);
    assert_eq!(header.offset_owner, 48 + dacl.header.acl_size as u32);
    assert_eq!(header.offset_group, header.offset_owner + 28);
    assert_eq!(encoded.len(), header.offset_group as usize + 28);
}

#[test]
fn test_descriptor_truncated_everywhere() {
    let data = fixture();
    // Every cut inside a section must fail cleanly
    for len in 0..data.len() {
        let result = SecurityDescriptor::parse(&data[..len]);
        assert!(
            matches!(
                result,
                Err(DescriptorError::Truncated) | Err(DescriptorError::MalformedDescriptor)
            ),
            "length {len} parsed"
        );
    }
}

#[test]
fn test_sid_round_trip() {
    let text = "S-1-5-21-3623811015-3361044348-30300820-1013";
    let sid = Sid::from_str(text).unwrap();
    let bytes = sid.encode();
    assert_eq!(bytes.len(), 28);
    assert_eq!(Sid::from_bytes(&bytes).unwrap().to_string(), text);
}
