/// Reverse the order of the provided bytes. GUID text lists its first three fields most significant byte first, the wire stores them little endian
pub fn reverse_bytes(data: &[u8]) -> Vec<u8> {
    data.iter().rev().copied().collect()
}

/// Decode a run of hex characters into bytes. Returns `None` on odd length or non-hex input
pub(crate) fn hex_to_bytes(data: &str) -> Option<Vec<u8>> {
    if data.len() % 2 != 0 || !data.chars().all(|value| value.is_ascii_hexdigit()) {
        return None;
    }

    let mut bytes = Vec::with_capacity(data.len() / 2);
    let hex_width = 2;
    for index in (0..data.len()).step_by(hex_width) {
        let value = u8::from_str_radix(&data[index..index + hex_width], 16).ok()?;
        bytes.push(value);
    }
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::{hex_to_bytes, reverse_bytes};

    #[test]
    fn test_reverse_bytes() {
        let test = [0xbf, 0x96, 0x79, 0xc0];
        assert_eq!(reverse_bytes(&test), vec![0xc0, 0x79, 0x96, 0xbf]);
        assert!(reverse_bytes(&[]).is_empty());
    }

    #[test]
    fn test_hex_to_bytes() {
        assert_eq!(hex_to_bytes("00aA30").unwrap(), vec![0, 0xaa, 0x30]);
        assert_eq!(hex_to_bytes("abc"), None);
        assert_eq!(hex_to_bytes("zz"), None);
    }
}
