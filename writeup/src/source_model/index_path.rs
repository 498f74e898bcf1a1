//! Hierarchical section index paths

use itertools::Itertools;

/// Sibling ranks from the root section down to a nested section
///
/// `[2, 1]` is the first subsection of the second top-level section. A
/// document's implicit intro section is `[0]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexPath {
    /// Rank components (1-based, except the intro section's single 0)
    pub parts: Vec<u32>,
}

impl IndexPath {
    /// Index path of the implicit intro section
    pub fn intro() -> Self {
        Self { parts: vec![0] }
    }

    /// Index path of a top-level section with the given rank
    pub fn root(rank: u32) -> Self {
        Self { parts: vec![rank] }
    }

    /// Index path of a child section with the given rank
    pub fn child(&self, rank: u32) -> Self {
        let mut parts = self.parts.clone();
        parts.push(rank);
        Self { parts }
    }

    /// Nesting depth (equals the number of parts)
    pub fn depth(&self) -> usize {
        self.parts.len()
    }

    /// Whether this is the intro section's path
    pub fn is_intro(&self) -> bool {
        self.parts == [0]
    }
}

impl std::fmt::Display for IndexPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.parts.iter().join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_extends_depth() {
        let path = IndexPath::root(2).child(3).child(1);
        assert_eq!(path.parts, vec![2, 3, 1]);
        assert_eq!(path.depth(), 3);
        assert_eq!(path.to_string(), "2.3.1");
    }

    #[test]
    fn test_intro_path() {
        assert!(IndexPath::intro().is_intro());
        assert!(!IndexPath::root(1).is_intro());
        assert_eq!(IndexPath::intro().to_string(), "0");
    }
}
