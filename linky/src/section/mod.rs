use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A named section of a linky document.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// The section name (trimmed header text), case- and whitespace-sensitive.
    pub name: String,
    /// Raw body text. Paragraphs are separated by a blank line.
    pub body: String,
    /// Byte span in source, from the header line to the last body line.
    pub span: Range<usize>,
}

/// The parsed document: sections keyed by name, in order of first appearance.
///
/// Re-declaring a name replaces the existing entry's body in place, so every
/// name maps to at most one body.
#[derive(Debug, Clone, Default)]
pub struct Sections {
    entries: Vec<Section>,
    index: HashMap<String, usize>,
}

impl Sections {
    pub fn new() -> Self {
        Sections::default()
    }

    /// Insert a section, overwriting any earlier section with the same name.
    /// Returns the overwritten section, if any.
    pub fn insert(&mut self, section: Section) -> Option<Section> {
        match self.index.get(&section.name) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos], section)),
            None => {
                self.index.insert(section.name.clone(), self.entries.len());
                self.entries.push(section);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Section> {
        self.index.get(name).map(|&pos| &self.entries[pos])
    }

    pub fn body(&self, name: &str) -> Option<&str> {
        self.get(name).map(|s| s.body.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.name.as_str())
    }
}

impl PartialEq for Sections {
    /// Two documents are equal when they map the same names to the same
    /// bodies. Spans and order are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|s| other.body(&s.name) == Some(s.body.as_str()))
    }
}

impl<'a> IntoIterator for &'a Sections {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Serialises back to markup: `name: body` pairs separated by blank lines.
impl fmt::Display for Sections {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, section) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            if section.body.is_empty() {
                writeln!(f, "{}:", section.name)?;
            } else {
                writeln!(f, "{}: {}", section.name, section.body)?;
            }
        }
        Ok(())
    }
}

impl Serialize for Sections {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for section in &self.entries {
            map.serialize_entry(&section.name, &section.body)?;
        }
        map.end()
    }
}
