//! Search-root file lookup
//!
//! Block files and templates live under an ordered list of roots, highest
//! precedence first (a child theme before its parent theme). A relative path is
//! resolved against each root in turn.

use std::path::{Path, PathBuf};

/// Ordered set of search roots
#[derive(Debug, Clone, Default)]
pub struct TemplateLocator {
    roots: Vec<PathBuf>,
}

impl TemplateLocator {
    /// Create a locator over the given roots, highest precedence first
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a root with lower precedence than every existing root
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    /// The search roots, highest precedence first
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// First existing file for `relative`, searching roots in precedence order
    pub fn locate(&self, relative: impl AsRef<Path>) -> Option<PathBuf> {
        let relative = relative.as_ref();
        self.roots
            .iter()
            .map(|root| root.join(relative))
            .find(|candidate| candidate.is_file())
    }

    /// Every existing file for `relative`, highest precedence first
    pub fn locate_all(&self, relative: impl AsRef<Path>) -> Vec<PathBuf> {
        let relative = relative.as_ref();
        self.roots
            .iter()
            .map(|root| root.join(relative))
            .filter(|candidate| candidate.is_file())
            .collect()
    }
}
