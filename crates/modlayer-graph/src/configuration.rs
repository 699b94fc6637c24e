//! Resolved configurations and their readability graphs.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxBuildHasher, FxHashSet};
use serde::{Deserialize, Serialize};

use super::resolver::{Resolver, ResolverOptions};
use super::{ModuleDescriptor, ModuleFinder, ModuleReference, Result};

pub(crate) type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;
pub(crate) type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

/// The set of modules a module may read.
pub type Reads = FxIndexSet<ResolvedModule>;

static NEXT_CONFIGURATION_ID: AtomicU64 = AtomicU64::new(1);

static EMPTY: LazyLock<Arc<Configuration>> = LazyLock::new(|| {
    Arc::new(Configuration {
        id: ConfigurationId(0),
        parents: Vec::new(),
        modules: FxIndexMap::default(),
        graph: FxIndexMap::default(),
        target_platform: None,
    })
});

/// Process-unique identity of a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigurationId(u64);

impl ConfigurationId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONFIGURATION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A module as a node of one configuration's readability graph.
///
/// Two resolved modules are equal when they belong to the same configuration
/// and have the same name.
#[derive(Clone)]
pub struct ResolvedModule {
    configuration: ConfigurationId,
    reference: ModuleReference,
}

impl ResolvedModule {
    pub(crate) fn new(configuration: ConfigurationId, reference: ModuleReference) -> Self {
        Self {
            configuration,
            reference,
        }
    }

    pub fn configuration(&self) -> ConfigurationId {
        self.configuration
    }

    pub fn reference(&self) -> &ModuleReference {
        &self.reference
    }

    pub fn descriptor(&self) -> &Arc<ModuleDescriptor> {
        self.reference.descriptor()
    }

    pub fn name(&self) -> &str {
        self.reference.name()
    }

    pub fn is_automatic(&self) -> bool {
        self.reference.descriptor().is_automatic()
    }
}

impl PartialEq for ResolvedModule {
    fn eq(&self, other: &Self) -> bool {
        self.configuration == other.configuration && self.name() == other.name()
    }
}

impl Eq for ResolvedModule {}

impl Hash for ResolvedModule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.configuration.hash(state);
        self.name().hash(state);
    }
}

impl fmt::Debug for ResolvedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name(), self.configuration.0)
    }
}

/// The outcome of a resolution: selected modules and their readability graph.
///
/// Configurations are immutable and serve as parents of later resolutions.
pub struct Configuration {
    id: ConfigurationId,
    parents: Vec<Arc<Configuration>>,
    modules: FxIndexMap<String, ResolvedModule>,
    graph: FxIndexMap<ResolvedModule, Reads>,
    target_platform: Option<String>,
}

impl Configuration {
    pub(crate) fn new(
        id: ConfigurationId,
        parents: Vec<Arc<Configuration>>,
        graph: FxIndexMap<ResolvedModule, Reads>,
        target_platform: Option<String>,
    ) -> Self {
        let modules = graph
            .keys()
            .map(|module| (module.name().to_string(), module.clone()))
            .collect();
        Self {
            id,
            parents,
            modules,
            graph,
            target_platform,
        }
    }

    /// The configuration with no modules and no parents.
    pub fn empty() -> Arc<Configuration> {
        Arc::clone(&EMPTY)
    }

    /// Resolve `roots` on top of `parents` without binding services.
    pub fn resolve<I, S>(
        before: Arc<dyn ModuleFinder>,
        parents: Vec<Arc<Configuration>>,
        after: Arc<dyn ModuleFinder>,
        roots: I,
        options: ResolverOptions,
    ) -> Result<Arc<Configuration>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolver = Resolver::new(before, parents, after, options)?;
        resolver.resolve(roots)?;
        Ok(Arc::new(resolver.finish()?))
    }

    /// Resolve `roots` on top of `parents` and bind service providers.
    pub fn resolve_and_bind<I, S>(
        before: Arc<dyn ModuleFinder>,
        parents: Vec<Arc<Configuration>>,
        after: Arc<dyn ModuleFinder>,
        roots: I,
        options: ResolverOptions,
    ) -> Result<Arc<Configuration>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut resolver = Resolver::new(before, parents, after, options)?;
        resolver.resolve(roots)?;
        resolver.bind_services()?;
        Ok(Arc::new(resolver.finish()?))
    }

    pub fn id(&self) -> ConfigurationId {
        self.id
    }

    pub fn parents(&self) -> &[Arc<Configuration>] {
        &self.parents
    }

    pub fn target_platform(&self) -> Option<&str> {
        self.target_platform.as_deref()
    }

    /// Modules selected in this configuration, in binding order.
    pub fn modules(&self) -> impl Iterator<Item = &ResolvedModule> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Find a module in this configuration, then in its ancestors.
    pub fn find_module(&self, name: &str) -> Option<ResolvedModule> {
        self.ancestors()
            .into_iter()
            .find_map(|configuration| configuration.modules.get(name).cloned())
    }

    /// This configuration followed by every ancestor, depth-first, each once.
    pub fn ancestors(&self) -> Vec<&Configuration> {
        let mut ordered = Vec::new();
        let mut visited = FxHashSet::default();
        let mut stack = vec![self];
        visited.insert(self.id);
        while let Some(configuration) = stack.pop() {
            ordered.push(configuration);
            for parent in configuration.parents.iter().rev() {
                if visited.insert(parent.id) {
                    stack.push(parent.as_ref());
                }
            }
        }
        ordered
    }

    /// Modules read by `module`, if it belongs to this configuration.
    pub fn reads(&self, module: &ResolvedModule) -> Option<&Reads> {
        self.graph.get(module)
    }

    /// Modules read by the module named `name` in this configuration.
    pub fn reads_of(&self, name: &str) -> Option<&Reads> {
        self.modules
            .get(name)
            .and_then(|module| self.graph.get(module))
    }

    /// Whether `reader` (in this configuration) reads a module named `target`.
    pub fn reads_module_named(&self, reader: &str, target: &str) -> bool {
        self.reads_of(reader)
            .is_some_and(|reads| reads.iter().any(|module| module.name() == target))
    }

    /// Serializable view of the readability graph.
    pub fn snapshot(&self) -> GraphSnapshot {
        let modules = self
            .graph
            .iter()
            .map(|(module, reads)| {
                let mut names: Vec<String> =
                    reads.iter().map(|read| read.name().to_string()).collect();
                names.sort();
                (module.name().to_string(), names)
            })
            .collect();
        GraphSnapshot {
            modules,
            target_platform: self.target_platform.clone(),
        }
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("id", &self.id)
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .field("parents", &self.parents.iter().map(|p| p.id).collect::<Vec<_>>())
            .field("target_platform", &self.target_platform)
            .finish()
    }
}

/// Readability graph by module name, with reads sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub modules: BTreeMap<String, Vec<String>>,
    pub target_platform: Option<String>,
}
