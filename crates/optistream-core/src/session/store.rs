use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::ser::SerializeMap;

use super::error::SessionError;
use crate::asset::AssetType;
use crate::frame::FrameSnapshot;
use crate::record::{FlatRecord, Value};
use crate::schema::SchemaRegistry;

/// Session-scoped rows per asset type, in arrival order.
///
/// The key set is fixed at construction; rows only grow until `reset`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccumulatorStore {
    tables: BTreeMap<AssetType, Vec<FlatRecord>>,
}

impl AccumulatorStore {
    pub fn new(tags: impl IntoIterator<Item = AssetType>) -> Self {
        Self {
            tables: tags.into_iter().map(|tag| (tag, Vec::new())).collect(),
        }
    }

    pub fn for_registry(registry: &SchemaRegistry) -> Self {
        Self::new(registry.tags())
    }

    /// Drop every row, keep every key.
    pub fn reset(&mut self) {
        for rows in self.tables.values_mut() {
            rows.clear();
        }
    }

    /// Append a snapshot's rows after the existing ones. Tags the store does
    /// not track are ignored.
    pub fn append(&mut self, snapshot: &FrameSnapshot) {
        for (tag, records) in snapshot.iter() {
            if let Some(rows) = self.tables.get_mut(&tag) {
                rows.extend_from_slice(records);
            }
        }
    }

    /// Replace every tracked table with the snapshot's content.
    pub fn replace(&mut self, snapshot: &FrameSnapshot) {
        for (tag, rows) in self.tables.iter_mut() {
            rows.clear();
            rows.extend_from_slice(snapshot.get(*tag));
        }
    }

    pub fn get(&self, tag: AssetType) -> &[FlatRecord] {
        self.tables.get(&tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, tag: AssetType) -> bool {
        self.tables.contains_key(&tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = AssetType> + '_ {
        self.tables.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetType, &[FlatRecord])> {
        self.tables
            .iter()
            .map(|(tag, rows)| (*tag, rows.as_slice()))
    }

    pub fn total_rows(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// Row count per accumulator key.
    pub fn row_counts(&self) -> BTreeMap<&'static str, usize> {
        self.tables
            .iter()
            .map(|(tag, rows)| (tag.key(), rows.len()))
            .collect()
    }

    /// Resolve accumulator names; `None` means every table.
    ///
    /// # Errors
    /// `SessionError::InvalidAssetType` for the first name that is not a
    /// key of this store.
    pub fn resolve_targets(&self, into: Option<&[&str]>) -> Result<Vec<AssetType>, SessionError> {
        let Some(names) = into else {
            return Ok(self.tags().collect());
        };
        names
            .iter()
            .map(|name| {
                name.parse::<AssetType>()
                    .ok()
                    .filter(|tag| self.contains(*tag))
                    .ok_or_else(|| SessionError::InvalidAssetType {
                        name: (*name).to_string(),
                    })
            })
            .collect()
    }

    /// Overwrite the named columns on every existing row of the targeted
    /// tables. Nothing is touched unless every target resolves.
    ///
    /// # Errors
    /// `SessionError::InvalidAssetType` when a target is not a key of this
    /// store.
    pub fn update<I, K>(&mut self, values: I, into: Option<&[&str]>) -> Result<(), SessionError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let targets = self.resolve_targets(into)?;
        let values: Vec<(String, Value)> = values
            .into_iter()
            .map(|(name, value)| (name.into(), value))
            .collect();

        for tag in targets {
            let Some(rows) = self.tables.get_mut(&tag) else {
                continue;
            };
            for row in rows.iter_mut() {
                for (name, value) in &values {
                    row.insert(name.clone(), value.clone());
                }
            }
        }
        Ok(())
    }

    /// Column names of `tag`'s table: union of row fields in first-seen
    /// order.
    pub fn columns(&self, tag: AssetType) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for row in self.get(tag) {
            for name in row.names() {
                if !columns.contains(&name) {
                    columns.push(name);
                }
            }
        }
        columns
    }

    /// Write one `<key>.csv` per table into `dir`, creating it if needed.
    /// Returns the written paths in key order.
    pub fn write_csv(&self, dir: &Path) -> Result<Vec<PathBuf>, SessionError> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.tables.len());
        for tag in self.tags() {
            let path = dir.join(format!("{}.csv", tag.key()));
            fs::write(&path, self.to_csv(tag))?;
            written.push(path);
        }
        Ok(written)
    }

    /// CSV text of `tag`'s table; empty string when it has no rows.
    pub fn to_csv(&self, tag: AssetType) -> String {
        let columns = self.columns(tag);
        if columns.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        push_csv_line(&mut out, columns.iter().map(|name| csv_field(name)));
        for row in self.get(tag) {
            push_csv_line(
                &mut out,
                columns.iter().map(|name| {
                    row.get(name)
                        .map(|value| csv_field(&value.to_string()))
                        .unwrap_or_default()
                }),
            );
        }
        out
    }
}

impl Serialize for AccumulatorStore {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for (tag, rows) in &self.tables {
            map.serialize_entry(tag.key(), rows)?;
        }
        map.end()
    }
}

fn push_csv_line(out: &mut String, fields: impl Iterator<Item = String>) {
    let line = fields.collect::<Vec<_>>().join(",");
    out.push_str(&line);
    out.push('\n');
}

fn csv_field(raw: &str) -> String {
    if raw.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
