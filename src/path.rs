//! # Path Model
//!
//! [`FsPath`] is the location type every handle speaks. It is a slash
//! separated string with no backend attached; [`QualifiedPath`] is the same
//! location pinned to a backend (`scheme://authority/abs/path`) and is what
//! equality between locations is decided on.

use std::fmt;
use std::path::Path;

/// A location within a filesystem namespace.
///
/// Comparison is on the normalized string form: `FsPath::new("/a//b/")`
/// equals `FsPath::new("/a/b")`. `..` is kept as written until
/// [`normalized`](Self::normalized) folds it lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FsPath(String);

impl FsPath {
    /// Build a path, collapsing repeated separators, `.` segments and any trailing `/`.
    pub fn new(path: impl AsRef<str>) -> Self {
        let raw = path.as_ref();
        if raw.is_empty() {
            return Self(String::new());
        }
        let absolute = raw.starts_with('/');
        let segments: Vec<&str> = raw
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        Self::from_segments(absolute, &segments)
    }

    /// Convert a local path, replacing platform separators with `/`.
    pub fn from_local(path: &Path) -> Self {
        let raw = path.to_string_lossy();
        if std::path::MAIN_SEPARATOR == '/' {
            Self::new(raw)
        } else {
            Self::new(raw.replace(std::path::MAIN_SEPARATOR, "/"))
        }
    }

    fn from_segments(absolute: bool, segments: &[&str]) -> Self {
        let joined = segments.join("/");
        if absolute {
            Self(format!("/{joined}"))
        } else if joined.is_empty() {
            Self(".".to_string())
        } else {
            Self(joined)
        }
    }

    /// String form.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for the empty path.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the path starts at the namespace root.
    #[inline]
    pub fn is_absolute(&self) -> bool {
        self.0.starts_with('/')
    }

    /// Returns `true` for `/`.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Final component, or `None` for the root, `.` and the empty path.
    pub fn name(&self) -> Option<&str> {
        match self.0.rsplit('/').next() {
            Some("") | Some(".") | None => None,
            Some(name) => Some(name),
        }
    }

    /// Everything but the final component.
    pub fn parent(&self) -> Option<FsPath> {
        self.name()?;
        match self.0.rfind('/') {
            Some(0) => Some(Self("/".to_string())),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self(".".to_string())),
        }
    }

    /// Child path. An absolute `child` replaces `self`; an empty `self` yields `child`.
    pub fn join(&self, child: impl AsRef<str>) -> FsPath {
        let child = child.as_ref();
        if self.is_empty() || child.starts_with('/') || self.0 == "." {
            return Self::new(child);
        }
        if child.is_empty() {
            return self.clone();
        }
        Self::new(format!("{}/{}", self.0, child))
    }

    /// Lexically fold `..` segments. A leading `..` on a relative path is kept;
    /// on an absolute path it stops at the root.
    pub fn normalized(&self) -> FsPath {
        if self.is_empty() {
            return self.clone();
        }
        let mut stack: Vec<&str> = Vec::new();
        for segment in self.0.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if matches!(stack.last(), Some(last) if *last != "..") {
                        stack.pop();
                    } else if !self.is_absolute() {
                        stack.push("..");
                    }
                }
                other => stack.push(other),
            }
        }
        Self::from_segments(self.is_absolute(), &stack)
    }

    /// Iterate over the non-empty segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty() && *s != ".")
    }
}

impl fmt::Display for FsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FsPath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FsPath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for FsPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A location pinned to a backend: `<scheme>://<authority><absolute path>`.
///
/// Produced by [`FsBackend::qualify`](crate::FsBackend::qualify).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedPath(String);

impl QualifiedPath {
    /// Assemble from its parts. `path` is normalized and made absolute.
    pub fn new(scheme: &str, authority: &str, path: &FsPath) -> Self {
        let normalized = path.normalized();
        let absolute = if normalized.is_absolute() {
            normalized.to_string()
        } else {
            format!("/{}", normalized.segments().collect::<Vec<_>>().join("/"))
        };
        Self(format!("{scheme}://{authority}{absolute}"))
    }

    /// String form.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when `self` is `ancestor` or lies below it.
    pub fn is_within(&self, ancestor: &QualifiedPath) -> bool {
        let base = ancestor.0.trim_end_matches('/');
        let candidate = self.0.trim_end_matches('/');
        candidate == base || candidate.starts_with(&format!("{base}/"))
    }
}

impl fmt::Display for QualifiedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_collapses_separators() {
        assert_eq!(FsPath::new("/a//b/./c/").as_str(), "/a/b/c");
        assert_eq!(FsPath::new("a/b/").as_str(), "a/b");
        assert_eq!(FsPath::new("/").as_str(), "/");
        assert_eq!(FsPath::new("").as_str(), "");
    }

    #[test]
    fn name_and_parent() {
        let p = FsPath::new("/data/in/part-1");
        assert_eq!(p.name(), Some("part-1"));
        assert_eq!(p.parent(), Some(FsPath::new("/data/in")));
        assert_eq!(FsPath::new("/a").parent(), Some(FsPath::new("/")));
        assert_eq!(FsPath::new("a").parent(), Some(FsPath::new(".")));
        assert_eq!(FsPath::new("/").name(), None);
        assert_eq!(FsPath::new("/").parent(), None);
        assert_eq!(FsPath::new("").name(), None);
    }

    #[test]
    fn join_rules() {
        assert_eq!(FsPath::new("/a").join("b"), FsPath::new("/a/b"));
        assert_eq!(FsPath::new("/").join("b"), FsPath::new("/b"));
        assert_eq!(FsPath::new("").join("b"), FsPath::new("b"));
        assert_eq!(FsPath::new("/a").join("/x"), FsPath::new("/x"));
        assert_eq!(FsPath::new("/a").join(""), FsPath::new("/a"));
    }

    #[test]
    fn normalized_folds_parent_segments() {
        assert_eq!(FsPath::new("/a/./b/../c").normalized(), FsPath::new("/a/c"));
        assert_eq!(FsPath::new("/../x").normalized(), FsPath::new("/x"));
        assert_eq!(FsPath::new("../x/..").normalized(), FsPath::new(".."));
        assert_eq!(FsPath::new("a/..").normalized(), FsPath::new("."));
    }

    #[test]
    fn qualified_path_containment() {
        let src = QualifiedPath::new("file", "", &FsPath::new("/data/src"));
        let same = QualifiedPath::new("file", "", &FsPath::new("/data/src/"));
        let child = QualifiedPath::new("file", "", &FsPath::new("/data/src/sub"));
        let sibling = QualifiedPath::new("file", "", &FsPath::new("/data/src2"));

        assert_eq!(src.as_str(), "file:///data/src");
        assert!(same.is_within(&src));
        assert!(child.is_within(&src));
        assert!(!sibling.is_within(&src));
        assert!(!src.is_within(&child));
    }

    #[test]
    fn qualified_path_anchors_relative_input() {
        let q = QualifiedPath::new("mem", "m1", &FsPath::new("x/y"));
        assert_eq!(q.as_str(), "mem://m1/x/y");
    }
}
