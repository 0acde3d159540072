//! Sectioned key/value file parsing.
//!
//! Both the user settings file (`~/.pytheonrc`) and project files
//! (`deploy.ini`, `buildout.cfg`, `.hg/hgrc`) use the same format:
//!
//! ```text
//! [section]
//! key = value
//! other: value
//! multi = first line
//!     continuation line
//! ```
//!
//! Section and key order is preserved so that a load/write cycle leaves
//! hand-edited files recognizable.

use std::fmt;
use std::path::Path;

use crate::error::{PytheonError, Result};

/// A syntax error at a given (1-based) line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

/// One `[name]` block and its entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: Vec::new(),
        }
    }

    /// Section name without brackets.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn set(&mut self, key: &str, value: &str) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((key.to_string(), value.to_string())),
        }
    }

    fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }
}

/// An ordered collection of sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<Section>,
}

impl IniDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse document text.
    ///
    /// # Example
    ///
    /// ```
    /// use pytheon::config::IniDocument;
    ///
    /// let doc = IniDocument::parse("[pytheon]\nusername = me@example.com\n").unwrap();
    /// assert_eq!(doc.get("pytheon", "username"), Some("me@example.com"));
    /// ```
    pub fn parse(content: &str) -> std::result::Result<Self, SyntaxError> {
        let mut doc = Self::new();
        let mut current: Option<usize> = None;
        let mut last_key: Option<String> = None;

        for (idx, raw) in content.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            // Indented lines continue the previous value.
            if raw.starts_with([' ', '\t']) {
                if let (Some(section), Some(key)) = (current, last_key.as_deref()) {
                    let section = &mut doc.sections[section];
                    let mut value = section.get(key).unwrap_or_default().to_string();
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(trimmed);
                    section.set(key, &value);
                    continue;
                }
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let name = rest.strip_suffix(']').ok_or_else(|| SyntaxError {
                    line: line_no,
                    message: format!("unterminated section header '{}'", trimmed),
                })?;
                let name = name.trim();
                if name.is_empty() {
                    return Err(SyntaxError {
                        line: line_no,
                        message: "empty section name".to_string(),
                    });
                }
                current = Some(doc.section_index_or_insert(name));
                last_key = None;
                continue;
            }

            let section = current.ok_or_else(|| SyntaxError {
                line: line_no,
                message: format!("'{}' appears before any [section] header", trimmed),
            })?;

            let (key, value) = split_entry(trimmed).ok_or_else(|| SyntaxError {
                line: line_no,
                message: format!("expected 'key = value', found '{}'", trimmed),
            })?;

            doc.sections[section].set(key, value);
            last_key = Some(key.to_string());
        }

        Ok(doc)
    }

    /// Load and parse a file.
    ///
    /// Fails with [`PytheonError::ConfigNotFound`] when the file is missing so
    /// that callers can decide whether that matters.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PytheonError::ConfigNotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        Self::parse(&content).map_err(|e| PytheonError::ConfigParseError {
            path: path.to_path_buf(),
            line: e.line,
            message: e.message,
        })
    }

    /// Load a file, returning an empty document if it doesn't exist.
    pub fn load_optional(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(PytheonError::ConfigNotFound { .. }) => Ok(Self::new()),
            other => other,
        }
    }

    /// Serialize and overwrite `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_string())?;
        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// Set a value, creating the section when needed.
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        let idx = self.section_index_or_insert(section);
        self.sections[idx].set(key, value);
    }

    pub fn remove(&mut self, section: &str, key: &str) -> Option<String> {
        self.sections
            .iter_mut()
            .find(|s| s.name == section)
            .and_then(|s| s.remove(key))
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Merge `section` into the section of the same name where it stands,
    /// or insert it at the front when the document has none.
    ///
    /// Keys of `section` come first, followed by the keys only the existing
    /// section has.
    pub fn merge_section(&mut self, section: Section) {
        match self.sections.iter().position(|s| s.name == section.name) {
            Some(pos) => {
                let existing = std::mem::take(&mut self.sections[pos].entries);
                let mut merged = section;
                for (k, v) in existing {
                    if merged.get(&k).is_none() {
                        merged.entries.push((k, v));
                    }
                }
                self.sections[pos] = merged;
            }
            None => self.sections.insert(0, section),
        }
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        match self.sections.iter().position(|s| s.name == name) {
            Some(idx) => idx,
            None => {
                self.sections.push(Section::new(name));
                self.sections.len() - 1
            }
        }
    }
}

impl fmt::Display for IniDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for section in &self.sections {
            if !first {
                writeln!(f)?;
            }
            first = false;
            writeln!(f, "[{}]", section.name)?;
            for (key, value) in &section.entries {
                let mut lines = value.split('\n');
                writeln!(f, "{} = {}", key, lines.next().unwrap_or_default())?;
                for line in lines {
                    writeln!(f, "    {}", line)?;
                }
            }
        }
        Ok(())
    }
}

impl From<Section> for IniDocument {
    fn from(section: Section) -> Self {
        Self {
            sections: vec![section],
        }
    }
}

/// Build a section from ordered entries, skipping `None` values.
pub fn section_from<'a>(
    name: &str,
    entries: impl IntoIterator<Item = (&'a str, Option<&'a str>)>,
) -> Section {
    let mut section = Section::new(name);
    for (key, value) in entries {
        if let Some(value) = value {
            section.set(key, value);
        }
    }
    section
}

/// Split `key = value` or `key: value`, whichever separator comes first.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let pos = line.find(['=', ':'])?;
    let key = line[..pos].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, line[pos + 1..].trim()))
}
