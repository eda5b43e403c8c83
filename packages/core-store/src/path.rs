//! Path keys addressing a location inside a document.

use std::fmt;

/// Errors related to path key parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A single segment of the key is unusable.
    InvalidComponent {
        component: String,
        position: usize,
        message: String,
    },
    /// The key as a whole is unusable.
    InvalidPath { message: String },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::InvalidComponent {
                component,
                position,
                message,
            } => {
                write!(
                    f,
                    "invalid key segment '{}' at position {}: {}",
                    component, position, message
                )
            }
            PathError::InvalidPath { message } => {
                write!(f, "invalid key: {}", message)
            }
        }
    }
}

impl std::error::Error for PathError {}

/// A parsed path key.
///
/// A path is never empty: every operation on a store addresses at least one
/// segment below the document root.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub components: Vec<String>,
}

impl Path {
    /// Parse a path key.
    ///
    /// # Path Syntax
    ///
    /// - Segments are separated by `.`
    /// - `[...]` starts a new segment; `[0]` and `["b.c"]` / `['b.c']` are
    ///   all accepted, and a quoted segment may contain dots
    /// - Numeric segments index into arrays when the value being descended
    ///   is an array, and are plain keys otherwise
    /// - Empty keys and empty segments are rejected
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pathstore_core::Path;
    ///
    /// let path = Path::parse("users.alice.tags[0]").unwrap();
    /// assert_eq!(path.len(), 4);
    ///
    /// let quoted = Path::parse(r#"hosts["example.com"].port"#).unwrap();
    /// assert_eq!(&quoted[1], "example.com");
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::InvalidPath {
                message: "key must be a non-empty string".to_string(),
            });
        }

        let mut components = Vec::new();
        let mut current = String::new();
        // A segment closed by `]` may be followed directly by `.` or `[`
        // without leaving an empty segment behind.
        let mut just_closed = false;
        let mut chars = s.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if just_closed && current.is_empty() {
                        just_closed = false;
                        continue;
                    }
                    Self::push_component(&mut components, std::mem::take(&mut current))?;
                }
                '[' => {
                    let follows_bracket = just_closed && current.is_empty();
                    let at_start = components.is_empty() && current.is_empty();
                    if !follows_bracket && !at_start {
                        Self::push_component(&mut components, std::mem::take(&mut current))?;
                    }
                    let segment = Self::read_bracket(&mut chars, components.len())?;
                    Self::push_component(&mut components, segment)?;
                    just_closed = true;
                    continue;
                }
                ']' => {
                    return Err(PathError::InvalidComponent {
                        component: current,
                        position: components.len(),
                        message: "unexpected ']'".to_string(),
                    });
                }
                c => {
                    if just_closed {
                        return Err(PathError::InvalidComponent {
                            component: c.to_string(),
                            position: components.len(),
                            message: "expected '.' or '[' after ']'".to_string(),
                        });
                    }
                    current.push(c);
                }
            }
            just_closed = false;
        }

        if !just_closed {
            Self::push_component(&mut components, current)?;
        }

        Ok(Path { components })
    }

    fn push_component(components: &mut Vec<String>, component: String) -> Result<(), PathError> {
        if component.is_empty() {
            return Err(PathError::InvalidComponent {
                component,
                position: components.len(),
                message: "empty segment".to_string(),
            });
        }
        components.push(component);
        Ok(())
    }

    /// Read the body of a `[...]` segment, consuming the closing bracket.
    fn read_bracket(
        chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
        position: usize,
    ) -> Result<String, PathError> {
        let quote = match chars.peek() {
            Some(&q) if q == '"' || q == '\'' => {
                chars.next();
                Some(q)
            }
            _ => None,
        };

        let mut segment = String::new();
        loop {
            match (chars.next(), quote) {
                (None, _) => {
                    return Err(PathError::InvalidComponent {
                        component: segment,
                        position,
                        message: "unterminated '['".to_string(),
                    });
                }
                (Some('\\'), Some(_)) => match chars.next() {
                    Some(escaped) => segment.push(escaped),
                    None => continue,
                },
                (Some(c), Some(q)) if c == q => {
                    if chars.next() != Some(']') {
                        return Err(PathError::InvalidComponent {
                            component: segment,
                            position,
                            message: "expected ']' after closing quote".to_string(),
                        });
                    }
                    return Ok(segment);
                }
                (Some(']'), None) => return Ok(segment),
                (Some(c), _) => segment.push(c),
            }
        }
    }

    /// Get the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Check if this path has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Split into the parent segments and the final segment.
    pub fn split_last(&self) -> Option<(&String, &[String])> {
        self.components.split_last()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if component.contains(['.', '[', ']']) {
                write!(f, "[{:?}]", component)?;
            } else {
                if i > 0 {
                    f.write_str(".")?;
                }
                f.write_str(component)?;
            }
        }
        Ok(())
    }
}

impl std::ops::Index<usize> for Path {
    type Output = String;

    fn index(&self, i: usize) -> &Self::Output {
        &self.components[i]
    }
}

/// Macro for creating paths from literals.
///
/// # Example
///
/// ```rust
/// use pathstore_core::path;
///
/// let p = path!("users.alice.name");
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s).expect("invalid path literal")
    };
}
