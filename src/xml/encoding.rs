//! Byte-level decoding of XML parts.

use crate::error::{Error, Result};

/// Rewrite a UTF-16 encoding declaration once the content has been decoded
/// into a Rust string, so the reader does not try to decode it again.
fn fix_xml_encoding_declaration(content: &str) -> String {
    if content.starts_with("<?xml") {
        if let Some(end_decl) = content.find("?>") {
            let decl = &content[..end_decl + 2];
            let rest = &content[end_decl + 2..];

            let fixed_decl = decl
                .replace("encoding=\"UTF-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='UTF-16'", "encoding='UTF-8'")
                .replace("encoding=\"utf-16\"", "encoding=\"UTF-8\"")
                .replace("encoding='utf-16'", "encoding='UTF-8'");

            return format!("{}{}", fixed_decl, rest);
        }
    }
    content.to_string()
}

/// Decode part bytes, handling UTF-8 (with or without BOM) and UTF-16 LE/BE.
///
/// Word writes UTF-8, but hand-edited or converted documents sometimes carry
/// UTF-16 parts.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    if let Some(rest) = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]) {
        return String::from_utf8(rest.to_vec())
            .map_err(|e| Error::MalformedMarkup(e.to_string()));
    }

    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        let content = decode_utf16(rest, u16::from_le_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let content = decode_utf16(rest, u16::from_be_bytes)?;
        return Ok(fix_xml_encoding_declaration(&content));
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_string()),
        // BOM-less UTF-16: ASCII markup leaves every other byte zero.
        Err(_) if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 => {
            let content = decode_utf16(bytes, u16::from_le_bytes)?;
            Ok(fix_xml_encoding_declaration(&content))
        }
        Err(_) if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 => {
            let content = decode_utf16(bytes, u16::from_be_bytes)?;
            Ok(fix_xml_encoding_declaration(&content))
        }
        Err(e) => Err(Error::MalformedMarkup(format!("invalid UTF-8: {}", e))),
    }
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));

    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::MalformedMarkup(e.to_string()))
}
