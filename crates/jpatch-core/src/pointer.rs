//! RFC 6901 JSON Pointers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PointerError;

/// A parsed JSON Pointer: the ordered list of unescaped reference tokens.
///
/// Tokens are kept as strings because a pointer alone cannot tell an object
/// key from an array index; that is decided when the pointer is resolved
/// against a document.
///
/// ```
/// # use jpatch_core::Pointer;
/// let pointer = Pointer::root().with_key("a/b").with_index(3);
/// assert_eq!(pointer.to_string(), "/a~1b/3");
/// assert_eq!("/a~1b/3".parse::<Pointer>()?, pointer);
/// # Ok::<(), jpatch_core::PointerError>(())
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pointer(Vec<String>);

impl Pointer {
    /// The empty pointer, addressing the whole document.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses pointer text, unescaping `~1` and `~0`.
    ///
    /// ```
    /// # use jpatch_core::Pointer;
    /// assert!(Pointer::parse("")?.is_root());
    /// assert_eq!(Pointer::parse("/")?.tokens(), [""]);
    /// assert_eq!(Pointer::parse("/~01")?.tokens(), ["~1"]);
    /// assert!(Pointer::parse("a").is_err());
    /// # Ok::<(), jpatch_core::PointerError>(())
    /// ```
    pub fn parse(input: &str) -> Result<Self, PointerError> {
        if input.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = input.strip_prefix('/') else {
            return Err(PointerError::NotAbsolute { pointer: input.to_owned() });
        };
        rest.split('/')
            .map(|token| {
                unescape_token(token)
                    .ok_or_else(|| PointerError::InvalidEscape { pointer: input.to_owned() })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Appends a token, returning the extended pointer.
    #[must_use]
    pub fn with_key<S>(mut self, key: S) -> Self
    where
        S: Into<String>,
    {
        self.0.push(key.into());
        self
    }

    /// Appends an array index, returning the extended pointer.
    #[must_use]
    pub fn with_index(mut self, index: usize) -> Self {
        self.0.push(index.to_string());
        self
    }

    /// Pushes a token in place.
    pub fn push<S>(&mut self, token: S)
    where
        S: Into<String>,
    {
        self.0.push(token.into());
    }

    /// Pops the last token.
    pub fn pop(&mut self) -> Option<String> {
        self.0.pop()
    }

    /// Returns the unescaped tokens.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.0
    }

    /// Returns the last token, or `None` for the root pointer.
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Returns the pointer to the containing value, or `None` for the root.
    ///
    /// ```
    /// # use jpatch_core::Pointer;
    /// let pointer = Pointer::parse("/a/0")?;
    /// assert_eq!(pointer.parent(), Some(Pointer::parse("/a")?));
    /// assert_eq!(Pointer::root().parent(), None);
    /// # Ok::<(), jpatch_core::PointerError>(())
    /// ```
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// Returns `true` for the empty pointer.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Indicates whether the pointer has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` when `prefix` addresses this location or one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

/// Escapes a single reference token (`~` → `~0`, `/` → `~1`).
#[must_use]
pub fn escape_token(token: &str) -> String {
    if !token.contains(['~', '/']) {
        return token.to_owned();
    }
    token.replace('~', "~0").replace('/', "~1")
}

/// Unescapes a single reference token, or `None` when it holds a bad `~` sequence.
#[must_use]
pub fn unescape_token(token: &str) -> Option<String> {
    if !token.contains('~') {
        return Some(token.to_owned());
    }
    let mut out = String::with_capacity(token.len());
    let mut chars = token.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => out.push('~'),
            Some('1') => out.push('/'),
            _ => return None,
        }
    }
    Some(out)
}

impl From<Vec<String>> for Pointer {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl FromStr for Pointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            f.write_str("/")?;
            f.write_str(&escape_token(token))?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Pointer {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Pointer {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pointer {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_and_unescapes_special_characters() {
        assert_eq!(escape_token("a/b~c"), "a~1b~0c");
        assert_eq!(unescape_token("a~1b~0c").as_deref(), Some("a/b~c"));
        assert_eq!(unescape_token("~2"), None);
        assert_eq!(unescape_token("~"), None);
    }

    #[test]
    fn root_renders_as_empty_string() {
        assert_eq!(Pointer::root().to_string(), "");
        assert_eq!(Pointer::root().with_key("").to_string(), "/");
    }

    #[test]
    fn parse_rejects_relative_pointers() {
        assert_eq!(
            Pointer::parse("foo"),
            Err(PointerError::NotAbsolute { pointer: "foo".to_owned() })
        );
        assert!(matches!(Pointer::parse("/a~"), Err(PointerError::InvalidEscape { .. })));
    }

    #[test]
    fn prefix_checks() {
        let parent = Pointer::parse("/a").unwrap();
        let child = Pointer::parse("/a/b").unwrap();
        assert!(child.starts_with(&parent));
        assert!(!parent.starts_with(&child));
        assert!(child.starts_with(&Pointer::root()));
    }

    #[test]
    fn serde_uses_pointer_text() {
        let pointer = Pointer::root().with_key("m~n").with_index(0);
        let json = serde_json::to_string(&pointer).unwrap();
        assert_eq!(json, "\"/m~0n/0\"");
        let decoded: Pointer = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, pointer);
    }
}
