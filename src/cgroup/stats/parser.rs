//! Generic parsing traits for cgroup and procfs pseudo-files.
//!
//! # Traits
//!
//! - [`KeyValueStat`]: multi-line `key value` files where each known key is stored once, such
//!   as `/proc/meminfo`. Unknown keys are dropped before their value is ever parsed.
//! - [`SelectedStat`]: allow-listed `memory.stat` lines, reported in file order.
//! - [`SingleLineStat`]: files holding one value on one line, such as `memory.current`,
//!   `memory.max` or `cpu.cfs_quota_us`.
//!
//! The free functions [`parse_single_value`] and [`read_single_line`] are the shared building
//! blocks for [`SingleLineStat`] implementors.
//!
//! # Example: implementing `KeyValueStat`
//!
//! ```rust
//! use std::collections::HashMap;
//! use std::sync::LazyLock;
//! use cgroup_monitor::cgroup::stats::KeyValueStat;
//!
//! #[derive(Default)]
//! struct MyStat {
//!     foo: u64,
//! }
//!
//! impl MyStat {
//!     fn set_foo(&mut self, foo: u64) {
//!         self.foo = foo;
//!     }
//! }
//!
//! static HANDLERS: LazyLock<HashMap<&'static str, fn(&mut MyStat, u64)>> = LazyLock::new(|| {
//!     let mut map: HashMap<&'static str, fn(&mut MyStat, u64)> = HashMap::new();
//!     map.insert("foo", MyStat::set_foo);
//!     map
//! });
//!
//! impl KeyValueStat for MyStat {
//!     fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)> {
//!         &HANDLERS
//!     }
//! }
//!
//! let stat = MyStat::from_reader(&mut "foo 7\nbar x\n".as_bytes()).unwrap();
//! assert_eq!(stat.foo, 7);
//! ```

use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::num::ParseIntError;
use std::str::FromStr;

use super::StatParseError;

/// A trait for `key value` style files whose interesting keys are known up front.
///
/// Each line is split on whitespace; the first token is the key and the second the value.
/// Any tokens after the value (such as the `kB` unit in `/proc/meminfo`) are ignored.
/// Lines whose key has no handler are skipped without looking at their value, so a
/// malformed line for an unrelated key never fails the parse.
pub trait KeyValueStat: Default
where
    Self: 'static,
{
    /// Returns the map of known keys to the handler that stores the parsed value.
    ///
    /// The iteration order of this map is irrelevant: handlers run in file order.
    fn field_handlers() -> &'static HashMap<&'static str, fn(&mut Self, u64)>;

    /// Parses a buffered reader into `Self`.
    ///
    /// Reading stops early once every known key has been seen.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if reading fails, or a wrapped [`StatParseError`] if a known key
    /// carries a non-numeric value or appears twice.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let mut stat = Self::default();
        let handlers = Self::field_handlers();
        let mut seen_keys = HashSet::with_capacity(handlers.len());

        let mut line = String::new();
        let mut lineno = 0;
        while buf.read_line(&mut line)? != 0 {
            lineno += 1;
            let mut parts = line.split_whitespace();
            if let (Some(key), Some(val)) = (parts.next(), parts.next()) {
                Self::parse_and_set(key, val, &mut stat, lineno, handlers, &mut seen_keys)?;
            }
            if seen_keys.len() == handlers.len() {
                break;
            }

            line.clear();
        }

        Ok(stat)
    }

    /// Parses a single key-value pair and applies it through the matching handler.
    ///
    /// # Errors
    ///
    /// [`StatParseError::InvalidKeyValue`] if the value is not a `u64`,
    /// [`StatParseError::DuplicateField`] if the key was already seen.
    fn parse_and_set(
        key: &str,
        val: &str,
        stat: &mut Self,
        lineno: usize,
        handlers: &HashMap<&'static str, fn(&mut Self, u64)>,
        seen_keys: &mut HashSet<&'static str>,
    ) -> std::io::Result<()> {
        let Some((k, handler)) = handlers.get_key_value(key) else {
            return Ok(());
        };

        let parsed = val
            .parse::<u64>()
            .map_err(|source| StatParseError::InvalidKeyValue {
                key: key.to_string(),
                value: val.to_string(),
                line: lineno,
                source,
            })?;
        if !seen_keys.insert(k) {
            return Err(StatParseError::DuplicateField {
                field: key.to_string(),
                line: lineno,
            }
            .into());
        }
        handler(stat, parsed);
        Ok(())
    }
}

/// A trait for `key value` files of which only an allow-list of keys is reported.
///
/// Lines are kept in file order. A line counts only if it starts with an allow-listed key
/// and has exactly two fields; anything else is skipped without looking at the value.
/// A repeated key yields one entry per line.
pub trait SelectedStat: Sized {
    /// The keys worth reporting.
    fn selected_keys() -> &'static [&'static str];

    fn from_entries(entries: Vec<(&'static str, u64)>) -> Self;

    /// Parses a buffered reader into `Self`.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if reading fails, or a wrapped
    /// [`StatParseError::InvalidKeyValue`] if a selected line carries a non-numeric value.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self> {
        let keys = Self::selected_keys();
        let mut entries = Vec::new();

        let mut line = String::new();
        let mut lineno = 0;
        while buf.read_line(&mut line)? != 0 {
            lineno += 1;
            if let Some((key, val)) = selected_pair(&line, keys) {
                let parsed = val
                    .parse::<u64>()
                    .map_err(|source| StatParseError::InvalidKeyValue {
                        key: key.to_string(),
                        value: val.to_string(),
                        line: lineno,
                        source,
                    })?;
                entries.push((key, parsed));
            }

            line.clear();
        }

        Ok(Self::from_entries(entries))
    }
}

/// Returns the key and raw value of `line` if it is an unindented two-field line for one of
/// `keys`.
fn selected_pair<'a>(line: &'a str, keys: &[&'static str]) -> Option<(&'static str, &'a str)> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let mut fields = line.split_whitespace();
    let (Some(key), Some(val), None) = (fields.next(), fields.next(), fields.next()) else {
        return None;
    };
    keys.iter().find(|k| **k == key).map(|k| (*k, val))
}

/// A trait for parsing single-line, single-value files such as `memory.current`.
pub trait SingleLineStat: Sized {
    /// Parses the statistic from the provided buffered reader.
    ///
    /// # Errors
    ///
    /// Returns an `io::Error` if reading fails or the content does not match the file's schema.
    fn from_reader<R: BufRead>(buf: &mut R) -> std::io::Result<Self>;
}

/// Reads the first line of `buf` and returns it with surrounding whitespace removed.
pub fn read_single_line<R: BufRead>(buf: &mut R) -> std::io::Result<String> {
    let mut line = String::new();
    buf.read_line(&mut line)?;
    Ok(line.trim().to_owned())
}

/// Parses an already-trimmed token as an integer, reporting it as found on `line`.
///
/// # Errors
///
/// Returns [`StatParseError::InvalidValue`] wrapped in an `io::Error` if `value` is not an
/// integer of type `T`.
pub fn parse_single_value<T>(value: &str, line: usize) -> std::io::Result<T>
where
    T: FromStr<Err = ParseIntError>,
{
    value.parse::<T>().map_err(|source| {
        StatParseError::InvalidValue {
            value: value.to_string(),
            line,
            source,
        }
        .into()
    })
}
