//! Postal code (CEP) validation.
//!
//! A CEP is accepted iff it is exactly eight ASCII decimal digits. No signs,
//! separators or surrounding whitespace are tolerated. Validation is pure and
//! happens before any remote call is made.

use std::fmt;

use serde::Deserialize;

/// Number of digits in a CEP.
pub const CEP_LEN: usize = 8;

/// A validated postal code.
///
/// The only way to obtain one is [`PostalCode::parse`], so holding a
/// `PostalCode` proves the value passed the format check.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

/// The input did not have the CEP format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid zipcode")]
pub struct InvalidPostalCode;

impl PostalCode {
    /// Validate `input` and wrap it.
    pub fn parse(input: &str) -> Result<Self, InvalidPostalCode> {
        if is_valid_cep(input) {
            Ok(Self(input.to_owned()))
        } else {
            Err(InvalidPostalCode)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PostalCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Returns true iff `input` is exactly eight ASCII digits.
pub fn is_valid_cep(input: &str) -> bool {
    input.len() == CEP_LEN && input.bytes().all(|b| b.is_ascii_digit())
}

/// JSON body accepted by the gateway: `{"cep": "01001000"}`.
///
/// A missing field decodes to an empty string so that it is reported as an
/// invalid CEP rather than as a malformed body.
#[derive(Debug, Clone, Deserialize)]
pub struct CepRequest {
    #[serde(default)]
    pub cep: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_eight_digits() {
        assert!(is_valid_cep("01001000"));
        assert!(is_valid_cep("99999999"));
        assert_eq!(PostalCode::parse("01001000").unwrap().as_str(), "01001000");
    }

    #[test]
    fn test_rejects_wrong_length() {
        for input in ["", "123", "0100100", "010010001"] {
            assert!(!is_valid_cep(input), "{input:?} should be rejected");
        }
    }

    #[test]
    fn test_rejects_non_digits_and_separators() {
        for input in [
            "01001-00",
            "01001-000",
            "0100100a",
            "+1001000",
            "-1001000",
            " 01001000",
            "01001000 ",
            "0100 000",
            "٠١٠٠١٠٠٠", // Arabic-Indic digits are not ASCII digits
            "0100100\n",
        ] {
            assert!(!is_valid_cep(input), "{input:?} should be rejected");
        }
    }

    #[test]
    fn test_parse_error_message() {
        assert_eq!(PostalCode::parse("123").unwrap_err().to_string(), "invalid zipcode");
    }

    #[test]
    fn test_request_body_decodes() {
        let body: CepRequest = serde_json::from_str(r#"{"cep":"01001000"}"#).unwrap();
        assert_eq!(body.cep, "01001000");

        let missing: CepRequest = serde_json::from_str(r#"{"zip":"01001000"}"#).unwrap();
        assert_eq!(missing.cep, "");

        assert!(serde_json::from_str::<CepRequest>(r#"{"cep":1001000}"#).is_err());
        assert!(serde_json::from_str::<CepRequest>("not json").is_err());
    }
}
