use crate::error::CoreError;
use base64::{engine::general_purpose, Engine};
use log::error;

/// Base64 encode data using the STANDARD engine (alphabet along with "+" and "/")
pub(crate) fn base64_encode_standard(data: &[u8]) -> String {
    general_purpose::STANDARD.encode(data)
}

/// Base64 decode data using the STANDARD engine. Directory tools commonly wrap long values, so whitespace is dropped first
pub(crate) fn base64_decode_standard(data: &str) -> Result<Vec<u8>, CoreError> {
    let compact: String = data.chars().filter(|value| !value.is_whitespace()).collect();
    let decode_result = general_purpose::STANDARD.decode(compact);
    match decode_result {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[sdcore] Could not base64 decode security descriptor: {err:?}");
            Err(CoreError::BadBase64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{base64_decode_standard, base64_encode_standard};

    #[test]
    fn test_base64_encode_standard() {
        let test = [1, 0, 4, 128, 20, 0, 0, 0];
        let result = base64_encode_standard(&test);
        assert_eq!(result, "AQAEgBQAAAA=")
    }

    #[test]
    fn test_base64_decode_standard() {
        let test = "AQAE\ngBQA AAA=";
        let result = base64_decode_standard(test).unwrap();
        assert_eq!(result, [1, 0, 4, 128, 20, 0, 0, 0])
    }

    #[test]
    fn test_base64_decode_bad() {
        let test = "not base64!";
        assert!(base64_decode_standard(test).is_err());
    }
}
