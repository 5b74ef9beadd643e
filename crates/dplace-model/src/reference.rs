use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A citation of a bibliography entry, optionally narrowed to pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reference {
    pub key: String,
    pub pages: String,
}

impl Reference {
    pub fn new(key: impl Into<String>, pages: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            pages: pages.into(),
        }
    }

    /// Parse `key:pages`, `key[pages]` or a bare `key`.
    pub fn from_string(value: &str) -> Self {
        let (key, pages) = if let Some((key, pages)) = value.split_once(':') {
            (key, pages)
        } else if let Some((key, pages)) = value.split_once('[') {
            (key, pages.strip_suffix(']').unwrap_or(pages))
        } else {
            (value, "")
        };
        Self::new(key.trim(), pages.trim())
    }

    /// The `key[pages]` form used by the tabular output.
    pub fn format_cldf(&self) -> String {
        if self.pages.is_empty() {
            self.key.clone()
        } else {
            format!("{}[{}]", self.key, self.pages)
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pages.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}:{}", self.key, self.pages)
        }
    }
}

impl FromStr for Reference {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_string(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bracketed_pages() {
        assert_eq!(
            Reference::from_string("meier2001[10-15]"),
            Reference::new("meier2001", "10-15")
        );
    }

    #[test]
    fn colon_takes_precedence_over_brackets() {
        let reference = Reference::from_string("smith1990: 3[a]");
        assert_eq!(reference.key, "smith1990");
        assert_eq!(reference.pages, "3[a]");
    }

    #[test]
    fn display_uses_colon_form() {
        assert_eq!(Reference::new("meier2001", "10-15").to_string(), "meier2001:10-15");
        assert_eq!(Reference::new("meier2001", "").to_string(), "meier2001");
        assert_eq!(Reference::new("meier2001", "7").format_cldf(), "meier2001[7]");
    }
}
