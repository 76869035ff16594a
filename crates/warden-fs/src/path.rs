//! Normalized path handling and prefix matching

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// A path normalized to use forward slashes internally.
///
/// On Windows backslashes become forward slashes. Elsewhere a backslash is
/// an ordinary filename character and is kept. Repeated separators
/// collapse, `.` segments and trailing separators are dropped. `..` segments are kept as
/// written: resolving them would require following symlinks.
///
/// Ordering is the lexicographic order of the normalized string, which is
/// the order reports are presented in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str),
        }
    }

    /// Like [`NormalizedPath::new`], but `None` when the path is not valid
    /// Unicode and could only be represented lossily.
    pub fn from_native(path: &Path) -> Option<Self> {
        path.to_str().map(|s| Self { inner: clean(s) })
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    pub fn join(&self, segment: &str) -> Self {
        let segment = clean(segment);
        if segment.is_empty() || segment == "." {
            return self.clone();
        }
        if self.inner.is_empty() {
            return Self { inner: segment };
        }
        Self {
            inner: clean(&format!("{}/{}", self.inner, segment)),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        match self.inner.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            Some(0) if self.inner.len() > 1 => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }

    /// Whether this path is rooted.
    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/')
    }

    /// Check if this is the filesystem root.
    pub fn is_root(&self) -> bool {
        self.inner == "/"
    }

    /// Component-aware prefix match.
    ///
    /// `/data` matches `/data` and `/data/a.txt` but not `/database`.
    /// The root `/` matches every absolute path.
    pub fn starts_with(&self, prefix: &NormalizedPath) -> bool {
        if prefix.is_root() {
            return self.is_absolute();
        }
        if prefix.inner.is_empty() {
            return false;
        }
        match self.inner.strip_prefix(prefix.inner.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// True if any of `prefixes` matches this path.
    pub fn matches_any<'a, I>(&self, prefixes: I) -> bool
    where
        I: IntoIterator<Item = &'a NormalizedPath>,
    {
        prefixes.into_iter().any(|p| self.starts_with(p))
    }

    /// Number of path segments below `root`, or `None` if this path is not
    /// under `root`. The root itself has depth 0.
    pub fn depth_below(&self, root: &NormalizedPath) -> Option<usize> {
        if !self.starts_with(root) {
            return None;
        }
        let rest = if root.is_root() {
            &self.inner[1..]
        } else {
            &self.inner[root.inner.len()..]
        };
        Some(rest.split('/').filter(|s| !s.is_empty()).count())
    }
}

/// Collapse separators and `.` segments.
///
/// A leading `//` (but not `///`) is kept so network paths stay recognizable.
fn clean(raw: &str) -> String {
    let slashed: Cow<'_, str> = if cfg!(windows) {
        Cow::Owned(raw.replace('\\', "/"))
    } else {
        Cow::Borrowed(raw)
    };
    if slashed.is_empty() {
        return String::new();
    }

    let lead = if slashed.starts_with("//") && !slashed.starts_with("///") {
        "//"
    } else if slashed.starts_with('/') {
        "/"
    } else {
        ""
    };

    let body = slashed
        .split('/')
        .filter(|seg| !seg.is_empty() && *seg != ".")
        .collect::<Vec<_>>()
        .join("/");

    match (lead, body.is_empty()) {
        ("", true) => ".".to_string(),
        (lead, true) => lead[..1].to_string(),
        (lead, false) => format!("{}{}", lead, body),
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

impl From<&NormalizedPath> for PathBuf {
    fn from(p: &NormalizedPath) -> Self {
        p.to_native()
    }
}

impl From<NormalizedPath> for String {
    fn from(p: NormalizedPath) -> Self {
        p.inner
    }
}
