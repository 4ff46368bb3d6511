use std::fmt;

/// A `/`-rooted, `/`-separated backend key.
///
/// Construction cleans the path: empty segments are dropped, so `"a//b/"`
/// and `"/a/b"` are the same key. The root key is `"/"`.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key(String);

impl Key {
    pub fn new(raw: impl AsRef<str>) -> Self {
        let mut cleaned = String::with_capacity(raw.as_ref().len() + 1);
        for segment in raw.as_ref().split('/').filter(|s| !s.is_empty()) {
            cleaned.push('/');
            cleaned.push_str(segment);
        }
        if cleaned.is_empty() {
            cleaned.push('/');
        }
        Key(cleaned)
    }

    /// The root key `/`.
    pub fn root() -> Self {
        Key("/".to_string())
    }

    /// Append a path segment (which may itself contain `/`).
    pub fn child(&self, segment: &str) -> Key {
        Key::new(format!("{}/{}", self.0, segment))
    }

    /// True when `self` lies strictly below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &Key) -> bool {
        if ancestor.is_root() {
            return !self.is_root();
        }
        self.0.len() > ancestor.0.len()
            && self.0.starts_with(&ancestor.0)
            && self.0.as_bytes()[ancestor.0.len()] == b'/'
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Last path segment, empty for the root.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0.into_bytes()
    }

    /// Parse a key stored as a value (index entries hold primary keys).
    pub fn from_bytes(bytes: &[u8]) -> Option<Key> {
        std::str::from_utf8(bytes).ok().map(Key::new)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0)
    }
}

impl From<&str> for Key {
    fn from(raw: &str) -> Self {
        Key::new(raw)
    }
}
