use super::{
    ace::{checked_size, Ace},
    error::DescriptorError,
    header::{AclHeader, ACL_HEADER_SIZE},
};
use crate::utils::nom_helper::nom_data;
use log::warn;

/// ACL revision for lists holding only basic ACEs
pub const ACL_REVISION: u8 = 2;
/// ACL revision required once object ACEs are present. Directory objects use this
pub const ACL_REVISION_DS: u8 = 4;

/// Access Control List. `ace_count` and `acl_size` are derived from the entries whenever the list is written
#[derive(Debug, Clone, PartialEq)]
pub struct Acl {
    pub header: AclHeader,
    aces: Vec<Ace>,
    /**Bytes counted by `acl_size` that no ACE used */
    slack: Vec<u8>,
}

impl Acl {
    pub fn new(revision: u8) -> Acl {
        Acl {
            header: AclHeader {
                revision,
                acl_size: ACL_HEADER_SIZE as u16,
                ..Default::default()
            },
            aces: Vec::new(),
            slack: Vec::new(),
        }
    }

    /// Parse the raw Windows Access Control List (ACL) data. `ace_count` decides how many ACEs are read
    pub(crate) fn parse_acl(data: &[u8]) -> nom::IResult<&[u8], Acl> {
        let (mut input, header) = AclHeader::parse_header(data)?;

        let mut aces = Vec::with_capacity(header.ace_count as usize);
        let mut consumed = ACL_HEADER_SIZE;
        for _ in 0..header.ace_count {
            let (remaining, ace) = Ace::parse_ace(input)?;
            consumed += ace.header().ace_size as usize;
            aces.push(ace);
            input = remaining;
        }

        let declared = header.acl_size as usize;
        let mut slack = Vec::new();
        if declared > consumed {
            let extra = (declared - consumed).min(input.len());
            let (remaining, unused) = nom_data(input, extra as u64)?;
            slack = unused.to_vec();
            input = remaining;
        } else if declared < consumed {
            warn!("[sdcore] ACL declares {declared} bytes but its ACEs use {consumed}");
        }

        Ok((input, Acl { header, aces, slack }))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Acl, DescriptorError> {
        let (_, acl) = Acl::parse_acl(data)?;
        Ok(acl)
    }

    pub fn aces(&self) -> &[Ace] {
        &self.aces
    }

    pub fn len(&self) -> usize {
        self.aces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aces.is_empty()
    }

    /// Replace every entry. ACE sizes, `ace_count` and `acl_size` are all recomputed.
    /// The list is left untouched if the result would not fit in `acl_size`
    pub fn set_aces(&mut self, mut aces: Vec<Ace>) -> Result<(), DescriptorError> {
        for ace in &mut aces {
            ace.refresh_size()?;
        }
        let entries: usize = aces.iter().map(|ace| ace.encoded_len()).sum();
        let acl_size = checked_size(ACL_HEADER_SIZE + entries)?;

        self.header.ace_count = aces.len() as u16;
        self.header.acl_size = acl_size;
        self.aces = aces;
        self.slack.clear();
        Ok(())
    }

    pub fn encoded_len(&self) -> usize {
        let entries: usize = self.aces.iter().map(|ace| ace.encoded_len()).sum();
        ACL_HEADER_SIZE + entries + self.slack.len()
    }

    /// Serialize the header followed by every ACE in list order
    pub fn encode(&self) -> Vec<u8> {
        let mut header = self.header.clone();
        header.ace_count = self.aces.len() as u16;
        header.acl_size = self.encoded_len() as u16;

        let mut data = header.encode();
        for ace in &self.aces {
            data.extend(ace.encode());
        }
        data.extend_from_slice(&self.slack);
        data
    }
}

#[cfg(test)]
mod tests {
    use super::{Acl, ACL_REVISION_DS};
    use crate::securitydescriptor::{ace::Ace, error::DescriptorError};
    use common::windows::AceKind;

    const TEST_ACL: [u8; 108] = [
        2, 0, 108, 0, 4, 0, 0, 0, 1, 0, 20, 0, 63, 0, 15, 0, 1, 1, 0, 0, 0, 0, 0, 5, 7, 0, 0, 0, 1,
        0, 20, 0, 63, 0, 15, 0, 1, 1, 0, 0, 0, 0, 0, 5, 2, 0, 0, 0, 0, 0, 36, 0, 63, 0, 15, 0, 1,
        5, 0, 0, 0, 0, 0, 5, 21, 0, 0, 0, 245, 64, 37, 10, 23, 232, 153, 20, 156, 149, 218, 53,
        233, 3, 0, 0, 0, 0, 24, 0, 63, 0, 15, 0, 1, 2, 0, 0, 0, 0, 0, 5, 32, 0, 0, 0, 32, 2, 0, 0,
    ];

    #[test]
    fn test_parse_acl() {
        let results = Acl::from_bytes(&TEST_ACL).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results.header.revision, 2);

        let aces = results.aces();
        assert_eq!(aces[0].kind(), AceKind::Deny);
        assert_eq!(aces[0].flags().len(), 0);
        assert_eq!(aces[0].mask(), Some(0xf003f));
        assert_eq!(aces[0].sid_string(), "S-1-5-7");

        assert_eq!(aces[1].kind(), AceKind::Deny);
        assert_eq!(aces[1].sid_string(), "S-1-5-2");

        assert_eq!(aces[2].kind(), AceKind::Allow);
        assert_eq!(
            aces[2].sid_string(),
            "S-1-5-21-170213621-345630743-903517596-1001"
        );
        assert_eq!(aces[3].sid_string(), "S-1-5-32-544");
    }

    #[test]
    fn test_acl_round_trip() {
        let results = Acl::from_bytes(&TEST_ACL).unwrap();
        assert_eq!(results.encode(), TEST_ACL);
        assert_eq!(results.encoded_len(), TEST_ACL.len());
    }

    #[test]
    fn test_acl_truncated() {
        assert_eq!(
            Acl::from_bytes(&TEST_ACL[..60]),
            Err(DescriptorError::Truncated)
        );
        assert_eq!(Acl::from_bytes(&TEST_ACL[..5]), Err(DescriptorError::Truncated));
    }

    #[test]
    fn test_acl_ignores_declared_size_for_count() {
        // acl_size claims only the header, ace_count still drives parsing
        let mut test = TEST_ACL;
        test[2] = 8;
        let results = Acl::from_bytes(&test).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results.encode(), TEST_ACL);
    }

    #[test]
    fn test_acl_slack_preserved() {
        let mut test = TEST_ACL.to_vec();
        test[2] = 112;
        test.extend_from_slice(&[0, 0, 0, 0]);
        let results = Acl::from_bytes(&test).unwrap();
        assert_eq!(results.encoded_len(), 112);
        assert_eq!(results.encode(), test);
    }

    #[test]
    fn test_set_aces() {
        let mut results = Acl::from_bytes(&TEST_ACL).unwrap();
        let mut aces = results.aces().to_vec();
        let removed = aces.remove(1);
        results.set_aces(aces).unwrap();

        assert_eq!(results.header.ace_count, 3);
        assert_eq!(
            results.header.acl_size as usize,
            TEST_ACL.len() - removed.encoded_len()
        );
        let encoded = results.encode();
        assert_eq!(encoded.len(), results.header.acl_size as usize);
        assert_eq!(results.aces()[0].sid_string(), "S-1-5-7");
        assert_eq!(
            results.aces()[1].sid_string(),
            "S-1-5-21-170213621-345630743-903517596-1001"
        );
    }

    #[test]
    fn test_new_acl() {
        let mut acl = Acl::new(ACL_REVISION_DS);
        assert!(acl.is_empty());
        assert_eq!(acl.encode(), [4, 0, 8, 0, 0, 0, 0, 0]);

        let ace = Ace::new_basic(0, 0, 0x20094, "S-1-5-11").unwrap();
        acl.set_aces(vec![ace]).unwrap();
        assert_eq!(acl.header.acl_size, 28);
        assert_eq!(acl.encode().len(), 28);
    }

    #[test]
    fn test_set_aces_too_large() {
        let mut results = Acl::from_bytes(&TEST_ACL).unwrap();
        // 3300 entries of 20 bytes is 66008 bytes with the header
        let ace = Ace::new_basic(0, 0, 0x10, "S-1-5-18").unwrap();
        let aces = vec![ace; 3300];
        assert_eq!(results.set_aces(aces), Err(DescriptorError::AclTooLarge));

        assert_eq!(results.len(), 4);
        assert_eq!(results.header.acl_size, 108);
        assert_eq!(results.encode(), TEST_ACL);
    }

    #[test]
    fn test_set_aces_at_limit() {
        let mut acl = Acl::new(ACL_REVISION_DS);
        // 3276 entries of 20 bytes plus the header is 65528 bytes
        let ace = Ace::new_basic(0, 0, 0x10, "S-1-5-18").unwrap();
        acl.set_aces(vec![ace; 3276]).unwrap();
        assert_eq!(acl.header.acl_size, 65528);
        assert_eq!(acl.header.ace_count, 3276);
        assert_eq!(acl.encode().len(), 65528);
    }
}
