//! File access modes for [`JsonStorage`](super::JsonStorage)
//!
//! Modes use the familiar `fopen`-style spelling (`"r+"`, `"w"`, `"a+"`, ...).
//! Binary/text flags (`b`, `t`) are accepted and ignored since the storage
//! always encodes text itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::str::FromStr;

use super::errors::StorageError;

/// How the backing file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AccessMode {
    /// `r`: read only
    Read,
    /// `r+`: read and write, existing content preserved
    #[default]
    ReadWrite,
    /// `w`: write only, truncated on open
    Write,
    /// `w+`: read and write, truncated on open
    WriteRead,
    /// `a`: write only, every write goes to the end
    Append,
    /// `a+`: read and append
    AppendRead,
    /// `x`: write only, the file must not exist yet
    Exclusive,
    /// `x+`: read and write, the file must not exist yet
    ExclusiveRead,
}

impl AccessMode {
    /// Canonical mode string
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::Read => "r",
            AccessMode::ReadWrite => "r+",
            AccessMode::Write => "w",
            AccessMode::WriteRead => "w+",
            AccessMode::Append => "a",
            AccessMode::AppendRead => "a+",
            AccessMode::Exclusive => "x",
            AccessMode::ExclusiveRead => "x+",
        }
    }

    /// Modes that truncate, append or require a fresh file.
    ///
    /// Reads through such a handle do not reliably see previously stored
    /// documents.
    pub fn is_dangerous(&self) -> bool {
        !matches!(self, AccessMode::Read | AccessMode::ReadWrite)
    }

    /// Whether the handle can be read from
    pub fn is_readable(&self) -> bool {
        !matches!(
            self,
            AccessMode::Write | AccessMode::Append | AccessMode::Exclusive
        )
    }

    /// Whether the handle can be written to
    pub fn is_writable(&self) -> bool {
        !matches!(self, AccessMode::Read)
    }

    /// Whether opening requires the file to be absent
    pub fn is_exclusive(&self) -> bool {
        matches!(self, AccessMode::Exclusive | AccessMode::ExclusiveRead)
    }

    /// Translate into [`OpenOptions`]
    pub fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            AccessMode::Read => options.read(true),
            AccessMode::ReadWrite => options.read(true).write(true),
            AccessMode::Write => options.write(true).truncate(true).create(true),
            AccessMode::WriteRead => options.read(true).write(true).truncate(true).create(true),
            AccessMode::Append => options.append(true).create(true),
            AccessMode::AppendRead => options.read(true).append(true).create(true),
            AccessMode::Exclusive => options.write(true).create_new(true),
            AccessMode::ExclusiveRead => options.read(true).write(true).create_new(true),
        };
        options
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessMode {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || StorageError::config(format!("Invalid access mode: {:?}", s));

        let mut base = None;
        let mut plus = false;
        for c in s.chars() {
            match c {
                'r' | 'w' | 'a' | 'x' if base.is_none() => base = Some(c),
                '+' if !plus => plus = true,
                'b' | 't' => {}
                _ => return Err(invalid()),
            }
        }

        match (base.ok_or_else(invalid)?, plus) {
            ('r', false) => Ok(AccessMode::Read),
            ('r', true) => Ok(AccessMode::ReadWrite),
            ('w', false) => Ok(AccessMode::Write),
            ('w', true) => Ok(AccessMode::WriteRead),
            ('a', false) => Ok(AccessMode::Append),
            ('a', true) => Ok(AccessMode::AppendRead),
            ('x', false) => Ok(AccessMode::Exclusive),
            ('x', true) => Ok(AccessMode::ExclusiveRead),
            _ => Err(invalid()),
        }
    }
}

impl TryFrom<String> for AccessMode {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AccessMode> for String {
    fn from(mode: AccessMode) -> Self {
        mode.as_str().to_string()
    }
}
