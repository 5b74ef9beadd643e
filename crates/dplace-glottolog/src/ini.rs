//! The INI dialect of Glottolog's `md.ini` files.
//!
//! Sections in brackets, `key = value` options, values continued on
//! indented lines, `#` and `;` comment lines.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ini {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Ini {
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut ini = Self::default();
        let mut section: Option<String> = None;
        let mut key: Option<String> = None;

        for (number, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }
            let continued = line.starts_with(char::is_whitespace);
            if continued && let (Some(section), Some(key)) = (&section, &key) {
                let value = ini
                    .sections
                    .entry(section.clone())
                    .or_default()
                    .entry(key.clone())
                    .or_default();
                if !value.is_empty() {
                    value.push('\n');
                }
                value.push_str(trimmed);
                continue;
            }
            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                ini.sections.entry(name.to_string()).or_default();
                section = Some(name.to_string());
                key = None;
                continue;
            }
            let Some(current) = &section else {
                return Err(format!("line {}: option outside of a section", number + 1));
            };
            let Some((name, value)) = trimmed.split_once('=') else {
                return Err(format!("line {}: expected 'key = value'", number + 1));
            };
            let name = name.trim().to_string();
            ini.sections
                .entry(current.clone())
                .or_default()
                .insert(name.clone(), value.trim().to_string());
            key = Some(name);
        }
        Ok(ini)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)?
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// A multi-line option as a list of non-empty lines.
    pub fn get_list(&self, section: &str, key: &str) -> Vec<String> {
        self.get(section, key)
            .map(|value| {
                value
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MD: &str = "\
[core]
name = Ju'hoan
hid = ktz
level = language
iso639-3 = ktz
macroareas =
\tAfrica

# comment
[sources]
glottolog =
\t**hh:s:Snyman:Juhoan**
\t**hh:g:Dickens:Juhoan**
";

    #[test]
    fn options_and_continuations() {
        let ini = Ini::parse(MD).unwrap();
        assert_eq!(ini.get("core", "name"), Some("Ju'hoan"));
        assert_eq!(ini.get("core", "level"), Some("language"));
        assert_eq!(ini.get_list("core", "macroareas"), vec!["Africa"]);
        assert_eq!(ini.get_list("sources", "glottolog").len(), 2);
        assert_eq!(ini.get("core", "missing"), None);
    }

    #[test]
    fn option_outside_section_is_rejected() {
        assert!(Ini::parse("name = x\n").is_err());
    }
}
