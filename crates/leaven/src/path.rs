//! Cycle-detection path.

use std::sync::Arc;

/// The ordered chain of canonical type names currently being validated or
/// expanded at one input position.
///
/// Copy-on-append: a child receives its own extended copy and never
/// mutates the parent's. Entering a *new* input position (a field value, a
/// list element) starts a fresh path — the path tracks the types attempted
/// against one position, which is exactly the recursion that can loop.
#[derive(Clone, Debug, Default)]
pub struct Path {
    names: Vec<Arc<str>>,
}

impl Path {
    /// The empty path for a fresh input position.
    pub fn root() -> Self {
        Path::default()
    }

    /// Whether `canonical` is already being resolved on this path.
    pub fn contains(&self, canonical: &str) -> bool {
        self.names.iter().any(|name| &**name == canonical)
    }

    /// A new path with `canonical` appended.
    pub fn with(&self, canonical: &str) -> Path {
        let mut names = self.names.clone();
        names.push(Arc::from(canonical));
        Path { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_does_not_touch_parent() {
        let root = Path::root();
        let child = root.with("Service<int>");
        assert!(root.is_empty());
        assert_eq!(child.len(), 1);
        assert!(child.contains("Service<int>"));
        assert!(!child.contains("Service<string>"));
    }
}
