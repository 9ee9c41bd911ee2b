// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use std::collections;
use std::fs;
use std::path;

use crate::TraceError;

/// Maps clock ids found in event payloads to display names.
///
/// Built once from a `clk_summary`-style text table and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClockNameTable {
    names: collections::BTreeMap<u32, String>,
}

impl ClockNameTable {
    /// Returns an empty table. Every lookup misses.
    pub fn new() -> Self {
        return Self::default();
    }

    /// Reads and parses the table at `path`.
    pub fn load(path: impl AsRef<path::Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| TraceError::ResolverLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&text);
        log::debug!("loaded {} clock names from {}", table.len(), path.display());
        return Ok(table);
    }

    /// Like [`Self::load`], but a missing or unreadable table is logged and
    /// replaced by an empty one, so decoding falls back to numeric ids.
    pub fn load_or_empty(path: impl AsRef<path::Path>) -> Self {
        return match Self::load(path) {
            Ok(table) => table,
            Err(e) => {
                log::warn!("{}; clock ids will be shown as numbers", e);
                Self::new()
            }
        };
    }

    /// Parses a line-oriented table.
    ///
    /// A record line starts with a clock id (decimal, or hex with a `0x`
    /// prefix) followed by whitespace and the clock name; further columns are
    /// ignored. Blank lines, `#` comments, column headings and separator rules
    /// are skipped. A later record for the same id replaces an earlier one.
    pub fn parse(text: &str) -> Self {
        let mut table = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut columns = line.split_whitespace();
            let id = match columns.next().and_then(parse_id) {
                Some(id) => id,
                None => continue,
            };

            if let Some(name) = columns.next() {
                table.insert(id, name);
            }
        }

        return table;
    }

    /// Adds or replaces the name for `id`.
    pub fn insert(&mut self, id: u32, name: &str) {
        self.names.insert(id, name.to_string());
    }

    /// Returns the name for `id`, if known.
    pub fn resolve(&self, id: u32) -> Option<&str> {
        return self.names.get(&id).map(|name| name.as_str());
    }

    /// Number of known names.
    pub fn len(&self) -> usize {
        return self.names.len();
    }

    /// Returns true if no names are known.
    pub fn is_empty(&self) -> bool {
        return self.names.is_empty();
    }
}

fn parse_id(token: &str) -> Option<u32> {
    return if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        u32::from_str_radix(hex, 16).ok()
    } else {
        token.parse::<u32>().ok()
    };
}
