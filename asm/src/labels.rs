use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::Serialize;

/// Symbol table: label name -> word address.
#[derive(Debug, Default)]
pub struct Labels {
    labels: IndexMap<String, u32>,
}

#[derive(Debug, Serialize)]
struct MapEntry {
    address: u32,
}

impl Labels {
    pub fn new() -> Self {
        Labels {
            labels: IndexMap::new(),
        }
    }

    /// Returns the previous address when the label was already defined.
    pub fn insert(&mut self, name: String, address: u32) -> Option<u32> {
        self.labels.insert(name, address)
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.labels.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Render the table as a sorted YAML map for downstream tooling.
    pub fn to_yaml(&self) -> String {
        let mut map: BTreeMap<String, MapEntry> = BTreeMap::new();
        for (name, address) in self.labels.iter() {
            map.insert(name.clone(), MapEntry { address: *address });
        }
        serde_yaml::to_string(&map).unwrap_or_else(|e| format!("# Error generating YAML: {}", e))
    }
}
