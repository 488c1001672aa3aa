//! # Raw Command Payloads
//!
//! Raw commands reach the printer as a textual list of byte tokens, e.g.
//! `"0x1D, 0x56, 0x01"`. Each token is one byte written as one or two hex
//! digits with an optional `0x` prefix; tokens are separated by commas,
//! whitespace, or both.
//!
//! ## Documented Sequences
//!
//! | Effect | Bytes |
//! |--------|-------|
//! | Bold on / off | 1B 45 01 / 1B 45 00 |
//! | Underline on / off | 1B 2D 01 / 1B 2D 00 |
//! | Align left / center / right | 1B 61 00 / 01 / 02 |
//! | Full cut / partial cut | 1D 56 00 / 1D 56 01 |
//! | Feed n lines | 1B 64 n |

use crate::error::PrinterError;

/// Parse a hex-token payload into bytes.
///
/// ```
/// use sunmi_printer::protocol::raw::parse_hex_tokens;
///
/// assert_eq!(parse_hex_tokens("0x1D, 0x56, 0x01")?, vec![0x1D, 0x56, 0x01]);
/// assert_eq!(parse_hex_tokens("1b 45 1")?, vec![0x1B, 0x45, 0x01]);
/// # Ok::<(), sunmi_printer::PrinterError>(())
/// ```
///
/// ## Errors
///
/// `MalformedPayload` for an empty payload, an empty token (`"1B,,45"`), a
/// token longer than two digits, or a non-hex character.
pub fn parse_hex_tokens(payload: &str) -> Result<Vec<u8>, PrinterError> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Err(PrinterError::MalformedPayload("payload is empty".to_string()));
    }

    let mut bytes = Vec::new();
    for (index, group) in trimmed.split(',').enumerate() {
        let group = group.trim();
        if group.is_empty() {
            return Err(PrinterError::MalformedPayload(format!(
                "empty token after separator {}",
                index
            )));
        }
        for token in group.split_whitespace() {
            bytes.push(parse_token(token)?);
        }
    }
    Ok(bytes)
}

fn parse_token(token: &str) -> Result<u8, PrinterError> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);

    if digits.is_empty() || digits.len() > 2 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(PrinterError::MalformedPayload(format!(
            "token '{}' is not a one-byte hex value",
            token
        )));
    }

    u8::from_str_radix(digits, 16)
        .map_err(|_| PrinterError::MalformedPayload(format!("token '{}' is not a hex number", token)))
}

/// Render bytes in the canonical `0x1B, 0x45, 0x01` form.
pub fn encode_hex_tokens(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("0x{:02X}", b))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::commands::{self, CutMode};
    use crate::protocol::text::{self, Alignment};

    #[test]
    fn test_parse_documented_sequences() {
        assert_eq!(parse_hex_tokens("0x1B, 0x45, 0x01").unwrap(), text::bold_on());
        assert_eq!(parse_hex_tokens("0x1B, 0x2D, 0x00").unwrap(), text::underline_off());
        assert_eq!(parse_hex_tokens("0x1B, 0x61, 0x02").unwrap(), text::align(Alignment::Right));
        assert_eq!(parse_hex_tokens("0x1D, 0x56, 0x01").unwrap(), commands::cut(CutMode::Partial));
        assert_eq!(parse_hex_tokens("0x1B, 0x64, 0x05").unwrap(), commands::feed_lines(5));
    }

    #[test]
    fn test_parse_separators() {
        assert_eq!(parse_hex_tokens("1B 40").unwrap(), vec![0x1B, 0x40]);
        assert_eq!(parse_hex_tokens(" 1b,40 ,0A\n").unwrap(), vec![0x1B, 0x40, 0x0A]);
        assert_eq!(parse_hex_tokens("0Xff").unwrap(), vec![0xFF]);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "   ", "0x1G", "0x123", "1B,,40", "0x", "zz", "1B, 40,", "+1", "0x+F", "-1", "0x1B, +1, 0x+F"] {
            assert!(
                matches!(parse_hex_tokens(bad), Err(PrinterError::MalformedPayload(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_encode_is_parseable() {
        let bytes: Vec<u8> = (0..=255u8).collect();
        let text = encode_hex_tokens(&bytes);
        assert!(text.starts_with("0x00, 0x01"));
        assert_eq!(parse_hex_tokens(&text).unwrap(), bytes);
    }
}
