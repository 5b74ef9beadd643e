//! BibTeX bibliography keyed by citation key.
//!
//! Entries keep their field order and raw (brace-delimited) values so that a
//! file read and written unchanged only differs in whitespace normalization.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};
use crate::files::{read_text, write_atomic};

/// One `@type{key, field = {value}, ...}` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibEntry {
    pub entry_type: String,
    pub key: String,
    pub fields: Vec<(String, String)>,
}

impl BibEntry {
    pub fn new(entry_type: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            entry_type: entry_type.into(),
            key: key.into(),
            fields: Vec::new(),
        }
    }

    /// Field lookup; BibTeX field names are case-insensitive.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Replace an existing field in place or append a new one.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .fields
            .iter_mut()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn render(&self) -> String {
        let mut out = format!("@{}{{{}", self.entry_type, self.key);
        for (name, value) in &self.fields {
            let _ = write!(out, ",\n    {name} = {{{value}}}");
        }
        out.push_str("\n}\n");
        out
    }
}

/// An ordered collection of entries with lookup by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BibFile {
    entries: Vec<BibEntry>,
    index: BTreeMap<String, usize>,
}

impl BibFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_text(path)?;
        let bib = Self::parse(&text, path)?;
        tracing::debug!(path = %path.display(), entries = bib.len(), "read bibliography");
        Ok(bib)
    }

    /// Parse BibTeX text; `path` only labels syntax errors.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut parser = Parser::new(text, path);
        let mut bib = Self::default();
        while let Some(entry) = parser.next_entry()? {
            bib.push(entry);
        }
        Ok(bib)
    }

    /// Add an entry; a later entry with the same key replaces the earlier one.
    pub fn push(&mut self, entry: BibEntry) {
        match self.index.get(&entry.key) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.key.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&BibEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut BibEntry> {
        self.index.get(key).map(|&i| &mut self.entries[i])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &BibEntry> {
        self.entries.iter()
    }

    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(BibEntry::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, self.render().as_bytes())
    }
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    path: &'a Path,
}

impl<'a> Parser<'a> {
    fn new(text: &str, path: &'a Path) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            path,
        }
    }

    fn error(&self, message: impl Into<String>) -> IngestError {
        IngestError::Bibtex {
            path: PathBuf::from(self.path),
            line: self.line,
            message: message.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn expect(&mut self, wanted: char) -> Result<()> {
        self.skip_whitespace();
        match self.bump() {
            Some(c) if c == wanted => Ok(()),
            Some(c) => Err(self.error(format!("expected '{wanted}', found '{c}'"))),
            None => Err(self.error(format!("expected '{wanted}', found end of file"))),
        }
    }

    fn take_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek().filter(|c| keep(*c)) {
            out.push(c);
            self.bump();
        }
        out
    }

    fn next_entry(&mut self) -> Result<Option<BibEntry>> {
        loop {
            while self.peek().is_some_and(|c| c != '@') {
                self.bump();
            }
            if self.bump().is_none() {
                return Ok(None);
            }
            let entry_type = self.take_while(|c| c.is_alphanumeric() || c == '_');
            if matches!(
                entry_type.to_ascii_lowercase().as_str(),
                "comment" | "preamble" | "string"
            ) {
                self.expect('{')?;
                self.braced()?;
                continue;
            }
            self.expect('{')?;
            self.skip_whitespace();
            let key = self.take_while(|c| c != ',' && c != '}' && !c.is_whitespace());
            if key.is_empty() {
                return Err(self.error("entry without citation key"));
            }
            let mut entry = BibEntry::new(entry_type, key);
            loop {
                self.skip_whitespace();
                match self.bump() {
                    Some('}') => return Ok(Some(entry)),
                    Some(',') => {}
                    Some(c) => return Err(self.error(format!("unexpected '{c}' after field"))),
                    None => return Err(self.error("unterminated entry")),
                }
                self.skip_whitespace();
                if self.peek() == Some('}') {
                    continue;
                }
                let name = self.take_while(|c| c.is_alphanumeric() || "_-:.".contains(c));
                if name.is_empty() {
                    return Err(self.error("expected field name"));
                }
                self.expect('=')?;
                self.skip_whitespace();
                let value = self.value()?;
                entry.fields.push((name, value));
            }
        }
    }

    fn value(&mut self) -> Result<String> {
        match self.peek() {
            Some('{') => {
                self.bump();
                self.braced()
            }
            Some('"') => {
                self.bump();
                self.quoted()
            }
            Some(_) => Ok(self.take_while(|c| c != ',' && c != '}' && !c.is_whitespace())),
            None => Err(self.error("expected field value")),
        }
    }

    /// Content up to the brace matching an already consumed `{`.
    fn braced(&mut self) -> Result<String> {
        let mut depth = 0usize;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('{') => {
                    depth += 1;
                    out.push('{');
                }
                Some('}') if depth == 0 => return Ok(out),
                Some('}') => {
                    depth -= 1;
                    out.push('}');
                }
                Some(c) => out.push(c),
                None => return Err(self.error("unbalanced braces")),
            }
        }
    }

    fn quoted(&mut self) -> Result<String> {
        let mut depth = 0usize;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') if depth == 0 => return Ok(out),
                Some('{') => {
                    depth += 1;
                    out.push('{');
                }
                Some('}') => {
                    depth = depth.saturating_sub(1);
                    out.push('}');
                }
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated quoted value")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
@comment{jabref-meta: whatever}

@book{meier2001,
    author = {Meier, Hans},
    title = "The {Kapauku} of {New Guinea}",
    year = 2001
}

@article{smith1990,
  title={Nested {braces {inside}}},
}
"#;

    #[test]
    fn test_parse_entries_and_fields() {
        let bib = BibFile::parse(SAMPLE, Path::new("sources.bib")).unwrap();
        assert_eq!(bib.keys().collect::<Vec<_>>(), vec!["meier2001", "smith1990"]);
        let meier = bib.get("meier2001").unwrap();
        assert_eq!(meier.entry_type, "book");
        assert_eq!(meier.get("AUTHOR"), Some("Meier, Hans"));
        assert_eq!(meier.get("title"), Some("The {Kapauku} of {New Guinea}"));
        assert_eq!(meier.get("year"), Some("2001"));
        assert_eq!(
            bib.get("smith1990").unwrap().get("title"),
            Some("Nested {braces {inside}}")
        );
    }

    #[test]
    fn test_render_reparses_identically() {
        let bib = BibFile::parse(SAMPLE, Path::new("sources.bib")).unwrap();
        let again = BibFile::parse(&bib.render(), Path::new("sources.bib")).unwrap();
        assert_eq!(bib, again);
    }

    #[test]
    fn test_set_replaces_field() {
        let mut entry = BibEntry::new("book", "k");
        entry.set("lgcode", "A [abcd1234]");
        entry.set("LGCODE", "B [efgh5678]");
        assert_eq!(entry.fields.len(), 1);
        assert_eq!(entry.get("lgcode"), Some("B [efgh5678]"));
        assert_eq!(entry.render(), "@book{k,\n    lgcode = {B [efgh5678]}\n}\n");
    }

    #[test]
    fn test_unbalanced_entry_reports_line() {
        let err = BibFile::parse("@book{k,\n title = {open\n", Path::new("x.bib")).unwrap_err();
        assert!(matches!(err, IngestError::Bibtex { line: 3, .. }));
    }
}
