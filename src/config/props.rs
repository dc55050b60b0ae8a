//! Flat `key=value` property-file reading and writing.
//!
//! The format is deliberately minimal: one pair per line, `#`/`!`
//! comment lines, no backslash escape processing. Input may carry a
//! UTF-8 or UTF-16 byte-order mark, which is detected and consumed
//! before parsing.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use super::ConfigError;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];
const UTF16_BE_BOM: [u8; 2] = [0xFE, 0xFF];
const UTF16_LE_BOM: [u8; 2] = [0xFF, 0xFE];

/// Reads a property map from raw bytes, honoring a leading BOM.
pub fn parse(bytes: &[u8]) -> HashMap<String, String> {
    parse_text(&decode(bytes))
}

/// Reads a property map from a stream.
pub fn read(mut reader: impl Read) -> std::io::Result<HashMap<String, String>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(parse(&bytes))
}

/// Reads a property map from a file on disk.
pub fn read_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let file = File::open(path).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;
    read(file).map_err(|source| ConfigError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Rewrites the whole property map to `path`, one `key=value` per line.
///
/// Keys are written in sorted order so repeated rewrites of the same
/// map produce identical files. No comment header is emitted.
pub fn write_file(path: &Path, map: &HashMap<String, String>) -> Result<(), ConfigError> {
    let write_err = |source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort();

    let mut file = File::create(path).map_err(write_err)?;
    for key in keys {
        writeln!(file, "{}={}", key, map[key]).map_err(write_err)?;
    }
    file.flush().map_err(write_err)
}

/// Decodes property-file bytes to text, consuming any leading BOM.
///
/// A UTF-16 BOM switches decoding to the indicated endianness; invalid
/// sequences are replaced rather than treated as fatal.
fn decode(bytes: &[u8]) -> String {
    if bytes.starts_with(&UTF8_BOM) {
        return String::from_utf8_lossy(&bytes[UTF8_BOM.len()..]).into_owned();
    }
    if bytes.starts_with(&UTF16_BE_BOM) {
        return decode_utf16(&bytes[2..], u16::from_be_bytes);
    }
    if bytes.starts_with(&UTF16_LE_BOM) {
        return decode_utf16(&bytes[2..], u16::from_le_bytes);
    }
    String::from_utf8_lossy(bytes).into_owned()
}

fn decode_utf16(bytes: &[u8], combine: fn([u8; 2]) -> u16) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| combine([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

fn parse_text(text: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }
        match trimmed.split_once('=') {
            Some((key, value)) => {
                map.insert(key.trim().to_string(), value.trim_start().to_string());
            }
            None => {
                map.insert(trimmed.to_string(), String::new());
            }
        }
    }
    map
}
