use std::collections::BTreeMap;
use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use crate::utils;

const MAX_CLASS_INDEX: usize = 65_535;

/// Ordered class names for a model, indexed by class id.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTable {
    names: Vec<String>,
}

impl LabelTable {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn from_names(names: &[&str]) -> Self {
        Self::new(names.iter().map(|x| x.to_string()).collect())
    }

    /// Resolves a class index, returning an empty string when it is out of range.
    pub fn name(&self, index: usize) -> &str {
        self.names.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Builds a table from `(class index, name)` pairs. Indexes missing from the pairs
    /// resolve to an empty name, so sparse keys keep their class ids.
    pub fn from_indexed(pairs: Vec<(usize, String)>) -> Result<Self> {
        let Some(max_index) = pairs.iter().map(|(index, _)| *index).max() else {
            return Ok(Self::default());
        };
        if max_index > MAX_CLASS_INDEX {
            bail!("class index {max_index} is larger than {MAX_CLASS_INDEX}");
        }
        let mut names = vec![String::new(); max_index + 1];
        for (index, name) in pairs {
            names[index] = name;
        }
        Ok(Self::new(names))
    }

    /// Reads a label file with one class name per line. Blank lines are skipped.
    pub fn from_file(path: &str) -> Result<Self> {
        let lines = utils::file_to_vec(path.to_string())
            .with_context(|| format!("failed to read labels from {path}"))?;
        Ok(Self::new(
            lines
                .into_iter()
                .map(|line| line.trim().to_string())
                .filter(|line| !line.is_empty())
                .collect(),
        ))
    }

    /// Parses the class-name blob embedded in exported model metadata.
    ///
    /// Accepted forms, tried in order:
    ///
    /// * JSON array: `["person", "bicycle"]`
    /// * JSON object keyed by index: `{"0": "person", "1": "bicycle"}`
    /// * Python dict literal: `{0: 'person', 1: 'bicycle'}`
    /// * Comma-separated list: `person, bicycle`
    pub fn from_metadata(blob: &str) -> Result<Self> {
        let blob = blob.trim();
        if blob.is_empty() {
            return Ok(Self::default());
        }

        if let Ok(names) = serde_json::from_str::<Vec<String>>(blob) {
            return Ok(Self::new(names));
        }

        if let Ok(map) = serde_json::from_str::<BTreeMap<String, String>>(blob) {
            let mut indexed = Vec::with_capacity(map.len());
            for (key, name) in map {
                let index = key
                    .trim()
                    .parse::<usize>()
                    .with_context(|| format!("class key {key:?} is not an index"))?;
                indexed.push((index, name));
            }
            return Self::from_indexed(indexed);
        }

        if blob.starts_with('{') {
            // String format: `{0: 'person', 1: 'bicycle', ..., 27: "yellow_lady's_slipper"}`
            let re = Regex::new(r#"(\d+)\s*:\s*(?:'([^']*)'|"([^"]*)")"#)?;
            let mut indexed = Vec::new();
            for caps in re.captures_iter(blob) {
                let index = caps[1]
                    .parse::<usize>()
                    .with_context(|| format!("class key {:?} is not an index", &caps[1]))?;
                let name = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str()).unwrap_or("");
                indexed.push((index, name.to_string()));
            }
            if indexed.is_empty() {
                log::warn!("No class names found in metadata dict: {blob}");
            }
            return Self::from_indexed(indexed);
        }

        Ok(Self::new(
            blob.split(',')
                .map(|x| x.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
                .filter(|x| !x.is_empty())
                .collect(),
        ))
    }
}

impl From<Vec<String>> for LabelTable {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}
