//! Text encodings for on-disk JSON

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::{StorageError, StorageResult};

/// Codec used to turn serialized JSON text into file bytes and back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextEncoding {
    /// UTF-8, the platform default
    #[default]
    Utf8,
    /// UTF-16, little endian, no BOM
    Utf16Le,
    /// UTF-16, big endian, no BOM
    Utf16Be,
    /// ISO-8859-1
    Latin1,
    /// 7-bit ASCII
    Ascii,
}

impl TextEncoding {
    /// Canonical encoding label
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf16Le => "utf-16le",
            TextEncoding::Utf16Be => "utf-16be",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Ascii => "ascii",
        }
    }

    /// Encode text into bytes.
    ///
    /// Fails when a character has no representation in this encoding.
    pub fn encode(&self, text: &str) -> StorageResult<Vec<u8>> {
        match self {
            TextEncoding::Utf8 => Ok(text.as_bytes().to_vec()),
            TextEncoding::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            TextEncoding::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            TextEncoding::Latin1 => self.encode_narrow(text, 0xFF),
            TextEncoding::Ascii => self.encode_narrow(text, 0x7F),
        }
    }

    /// Decode bytes into text.
    ///
    /// Invalid input is an error, never replaced.
    pub fn decode(&self, bytes: &[u8]) -> StorageResult<String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| StorageError::encoding(self, e.to_string())),
            TextEncoding::Utf16Le => self.decode_utf16(bytes, u16::from_le_bytes),
            TextEncoding::Utf16Be => self.decode_utf16(bytes, u16::from_be_bytes),
            TextEncoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            TextEncoding::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(offset) => Err(StorageError::encoding(
                    self,
                    format!("byte 0x{:02x} at offset {} is not ASCII", bytes[offset], offset),
                )),
                None => Ok(bytes.iter().map(|&b| b as char).collect()),
            },
        }
    }

    fn encode_narrow(&self, text: &str, max: u32) -> StorageResult<Vec<u8>> {
        text.chars()
            .map(|c| {
                if (c as u32) <= max {
                    Ok(c as u8)
                } else {
                    Err(StorageError::encoding(
                        self,
                        format!("character {:?} cannot be encoded", c),
                    ))
                }
            })
            .collect()
    }

    fn decode_utf16(&self, bytes: &[u8], unit: fn([u8; 2]) -> u16) -> StorageResult<String> {
        if bytes.len() % 2 != 0 {
            return Err(StorageError::encoding(
                self,
                format!("odd number of bytes ({})", bytes.len()),
            ));
        }
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| unit([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).map_err(|e| StorageError::encoding(self, e.to_string()))
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextEncoding {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect();

        match label.as_str() {
            "utf8" => Ok(TextEncoding::Utf8),
            "utf16le" => Ok(TextEncoding::Utf16Le),
            "utf16be" => Ok(TextEncoding::Utf16Be),
            "latin1" | "iso88591" | "l1" => Ok(TextEncoding::Latin1),
            "ascii" | "usascii" => Ok(TextEncoding::Ascii),
            _ => Err(StorageError::config(format!("Unsupported encoding: {:?}", s))),
        }
    }
}

impl TryFrom<String> for TextEncoding {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TextEncoding> for String {
    fn from(encoding: TextEncoding) -> Self {
        encoding.as_str().to_string()
    }
}
