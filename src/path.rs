//! Addresses of values within a document.
//!
//! A path renders as `/a/b[2]/c`: keys are introduced by `/`, list indexes
//! are written as `[i]` directly after the list they index. The root renders
//! as `/`.

use crate::errors::SchemaError;
use json_pointer::JsonPointer;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One step of a [`Path`](struct.Path.html).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A sequence of segments from the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<Segment> {
        self.segments.pop()
    }

    /// Returns a copy of this path extended by one segment.
    pub fn join(&self, segment: Segment) -> Path {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    /// Parses an RFC 6901 JSON pointer such as `/a/b/2`.
    ///
    /// Pointer tokens carry no type, so every token becomes a key segment.
    /// Lookups through [`Value::at_keys`](../value/enum.Value.html#method.at_keys)
    /// treat numeric keys as list indexes.
    pub fn from_pointer(pointer: &str) -> Result<Vec<String>, SchemaError> {
        pointer
            .parse::<JsonPointer<String, Vec<String>>>()
            .map(|mut ptr| {
                let mut keys = vec![];
                while let Some(key) = ptr.pop() {
                    keys.push(key);
                }
                keys.reverse();
                keys
            })
            .map_err(|_| SchemaError::InvalidPath {
                path: pointer.to_owned(),
            })
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }

        for segment in &self.segments {
            match segment {
                Segment::Key(key) => write!(f, "/{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }

        Ok(())
    }
}

/// Parses the rendered form, `/a/b[2]/c`. The leading `/` is optional.
impl FromStr for Path {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SchemaError::InvalidPath { path: s.to_owned() };
        let mut path = Path::root();
        let rest = s.strip_prefix('/').unwrap_or(s);
        if rest.is_empty() {
            return Ok(path);
        }

        for part in rest.split('/') {
            let (key, mut indexes) = match part.find('[') {
                Some(at) => part.split_at(at),
                None => (part, ""),
            };
            if key.is_empty() {
                return Err(invalid());
            }
            path.push(Segment::Key(key.to_owned()));

            while !indexes.is_empty() {
                let close = indexes.find(']').ok_or_else(invalid)?;
                let index = indexes[1..close].parse().map_err(|_| invalid())?;
                path.push(Segment::Index(index));
                indexes = &indexes[close + 1..];
                if !indexes.is_empty() && !indexes.starts_with('[') {
                    return Err(invalid());
                }
            }
        }

        Ok(path)
    }
}

impl Serialize for Path {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn key(k: &str) -> Segment {
        Segment::Key(k.to_owned())
    }

    #[test]
    fn display() {
        let mut path = Path::root();
        assert_eq!(path.to_string(), "/");

        path.push(key("a"));
        path.push(key("b"));
        path.push(Segment::Index(2));
        path.push(key("c"));
        assert_eq!(path.to_string(), "/a/b[2]/c");

        path.pop();
        assert_eq!(path.to_string(), "/a/b[2]");
    }

    #[test]
    fn parse() {
        let path: Path = "/a/b[2]/c".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[key("a"), key("b"), Segment::Index(2), key("c")][..]
        );
        assert_eq!(path.to_string(), "/a/b[2]/c");

        let bare: Path = "a".parse().unwrap();
        assert_eq!(bare.segments(), &[key("a")][..]);

        assert!("/".parse::<Path>().unwrap().is_root());
        assert!("/a[x]".parse::<Path>().is_err());
        assert!("/a[1".parse::<Path>().is_err());
        assert!("/a//b".parse::<Path>().is_err());
        assert!("/a[1]b".parse::<Path>().is_err());
    }

    #[test]
    fn pointer() {
        assert_eq!(
            Path::from_pointer("/a/b~1c/0").unwrap(),
            vec!["a".to_owned(), "b/c".to_owned(), "0".to_owned()]
        );
        assert!(Path::from_pointer("a").is_err());
    }
}
