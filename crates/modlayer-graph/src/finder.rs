//! Lookup sources that map module names to module references.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use super::ModuleReference;

/// A source of modules, consulted by name during resolution.
///
/// Implementations may perform I/O; the resolver treats each call as a
/// blocking lookup.
pub trait ModuleFinder: Send + Sync {
    /// Find a module by name.
    fn find(&self, name: &str) -> Option<ModuleReference>;

    /// Every module this source can locate.
    fn find_all(&self) -> Vec<ModuleReference>;
}

/// Finder that never locates anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyFinder;

impl ModuleFinder for EmptyFinder {
    fn find(&self, _name: &str) -> Option<ModuleReference> {
        None
    }

    fn find_all(&self) -> Vec<ModuleReference> {
        Vec::new()
    }
}

/// Finder over a fixed set of references.
///
/// When two references share a name the first one wins.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFinder {
    modules: IndexMap<String, ModuleReference, FxBuildHasher>,
}

impl InMemoryFinder {
    /// Index `references` by module name, keeping insertion order.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modlayer_graph::{InMemoryFinder, ModuleDescriptor, ModuleFinder, ModuleReference};
    ///
    /// let finder = InMemoryFinder::new([
    ///     ModuleReference::new(ModuleDescriptor::builder("a").build()).with_location("first"),
    ///     ModuleReference::new(ModuleDescriptor::builder("a").build()).with_location("second"),
    /// ]);
    /// assert_eq!(finder.find("a").and_then(|r| r.location().map(String::from)), Some("first".into()));
    /// assert_eq!(finder.find_all().len(), 1);
    /// ```
    pub fn new<I, R>(references: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<ModuleReference>,
    {
        let mut modules = IndexMap::with_hasher(FxBuildHasher);
        for reference in references {
            let reference: ModuleReference = reference.into();
            modules
                .entry(reference.name().to_string())
                .or_insert(reference);
        }
        Self { modules }
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleFinder for InMemoryFinder {
    fn find(&self, name: &str) -> Option<ModuleReference> {
        self.modules.get(name).cloned()
    }

    fn find_all(&self) -> Vec<ModuleReference> {
        self.modules.values().cloned().collect()
    }
}

/// Finder that searches a sequence of finders in order.
#[derive(Clone, Default)]
pub struct ComposedFinder {
    finders: Vec<Arc<dyn ModuleFinder>>,
}

impl ComposedFinder {
    pub fn new(finders: Vec<Arc<dyn ModuleFinder>>) -> Self {
        Self { finders }
    }
}

impl ModuleFinder for ComposedFinder {
    fn find(&self, name: &str) -> Option<ModuleReference> {
        self.finders.iter().find_map(|finder| finder.find(name))
    }

    /// Modules found by earlier finders shadow same-named modules of later ones.
    fn find_all(&self) -> Vec<ModuleReference> {
        let mut seen: IndexMap<String, ModuleReference, FxBuildHasher> =
            IndexMap::with_hasher(FxBuildHasher);
        for finder in &self.finders {
            for reference in finder.find_all() {
                seen.entry(reference.name().to_string())
                    .or_insert(reference);
            }
        }
        seen.into_values().collect()
    }
}
