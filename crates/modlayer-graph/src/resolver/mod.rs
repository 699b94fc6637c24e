//! The resolution engine.
//!
//! A [`Resolver`] selects modules starting from a set of root names, expands
//! the selection along `requires` edges, optionally binds service providers,
//! and finally produces a [`Configuration`] with the readability graph.
//!
//! ```text
//!   Resolver::new ──► resolve(roots) ──► bind_services()* ──► finish()
//!                          │                   │                 │
//!                          └──── closure ◄─────┘                 ▼
//!                                                        Configuration
//! ```
//!
//! Modules are looked up in a fixed order: the *before* finder, then the
//! parent configurations, then the *after* finder. A module found in a parent
//! is already satisfied and is not selected again.

mod bind;
mod finish;

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use super::configuration::{Configuration, ConfigurationId, FxIndexMap, ResolvedModule};
use super::error::{FindError, ResolveError, Result};
use super::trace::TraceSink;
use super::{ModuleFinder, ModuleReference};

/// Settings for a single resolution.
pub struct ResolverOptions {
    bootstrap_graph_exists: bool,
    trace: Option<Box<dyn TraceSink>>,
}

impl ResolverOptions {
    pub fn new() -> Self {
        Self {
            bootstrap_graph_exists: true,
            trace: None,
        }
    }

    /// Whether an initial system-wide graph was already resolved.
    ///
    /// When `false`, service binding also scans every module of the parent
    /// configurations for `uses` declarations. Defaults to `true`.
    pub fn bootstrap_graph_exists(mut self, exists: bool) -> Self {
        self.bootstrap_graph_exists = exists;
        self
    }

    /// Send human-readable trace lines to `sink`.
    pub fn trace(mut self, sink: impl TraceSink + 'static) -> Self {
        self.trace = Some(Box::new(sink));
        self
    }
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ResolverOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverOptions")
            .field("bootstrap_graph_exists", &self.bootstrap_graph_exists)
            .field("tracing", &self.trace.is_some())
            .finish()
    }
}

/// Single-use resolution engine.
///
/// Call [`resolve`](Self::resolve), then [`bind_services`](Self::bind_services)
/// as often as wanted, then [`finish`](Self::finish). A resolver that returned
/// an error refuses further calls with [`ResolveError::Poisoned`].
pub struct Resolver {
    configuration_id: ConfigurationId,
    before: Arc<dyn ModuleFinder>,
    after: Arc<dyn ModuleFinder>,
    parents: Vec<Arc<Configuration>>,
    bootstrap_graph_exists: bool,
    trace: Option<Box<dyn TraceSink>>,

    // monotonic: a bound name is never rebound or removed
    name_to_reference: FxIndexMap<String, ModuleReference>,
    target_platform: Option<String>,
    have_all_automatic_modules: bool,
    poisoned: bool,
}

impl Resolver {
    /// Create a resolver over two finders and a list of parent configurations.
    ///
    /// # Arguments
    ///
    /// * `before` - Searched first, ahead of every parent
    /// * `parents` - Configurations the new one is resolved on top of; an
    ///   empty list means [`Configuration::empty`]
    /// * `after` - Searched last; its modules are hidden by same-named
    ///   modules of `before` or of a parent
    /// * `options` - Parent-consumer scanning and the trace sink
    ///
    /// # Errors
    ///
    /// [`FindError::ConflictingParentPlatforms`] when two parents were
    /// resolved for different target platforms.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use modlayer_graph::{EmptyFinder, InMemoryFinder, ModuleDescriptor, Resolver, ResolverOptions};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let finder = InMemoryFinder::new([ModuleDescriptor::builder("app").build()]);
    /// let mut resolver = Resolver::new(
    ///     Arc::new(finder),
    ///     vec![],
    ///     Arc::new(EmptyFinder),
    ///     ResolverOptions::default(),
    /// )?;
    /// resolver.resolve(["app"])?;
    /// assert!(resolver.is_selected("app"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(
        before: Arc<dyn ModuleFinder>,
        parents: Vec<Arc<Configuration>>,
        after: Arc<dyn ModuleFinder>,
        options: ResolverOptions,
    ) -> Result<Self> {
        let parents = if parents.is_empty() {
            vec![Configuration::empty()]
        } else {
            parents
        };

        let mut target_platform: Option<String> = None;
        for parent in &parents {
            let Some(platform) = parent.target_platform() else {
                continue;
            };
            match &target_platform {
                None => target_platform = Some(platform.to_string()),
                Some(established) if established != platform => {
                    return Err(FindError::ConflictingParentPlatforms {
                        first: established.clone(),
                        second: platform.to_string(),
                    }
                    .into());
                }
                Some(_) => {}
            }
        }

        Ok(Self {
            configuration_id: ConfigurationId::next(),
            before,
            after,
            parents,
            bootstrap_graph_exists: options.bootstrap_graph_exists,
            trace: options.trace,
            name_to_reference: FxIndexMap::default(),
            target_platform,
            have_all_automatic_modules: false,
            poisoned: false,
        })
    }

    /// Select the root modules and everything they require.
    ///
    /// Returns the references selected by this call.
    pub fn resolve<I, S>(&mut self, roots: I) -> Result<Vec<ModuleReference>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.guarded(|resolver| resolver.resolve_roots(roots))
    }

    /// Modules selected so far, in binding order.
    pub fn selected(&self) -> impl Iterator<Item = &ModuleReference> {
        self.name_to_reference.values()
    }

    pub fn is_selected(&self, name: &str) -> bool {
        self.name_to_reference.contains_key(name)
    }

    /// The target platform agreed on so far.
    pub fn target_platform(&self) -> Option<&str> {
        self.target_platform.as_deref()
    }

    fn guarded<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.poisoned {
            return Err(ResolveError::Poisoned);
        }
        let result = op(self);
        if result.is_err() {
            self.poisoned = true;
        }
        result
    }

    fn resolve_roots<I, S>(&mut self, roots: I) -> Result<Vec<ModuleReference>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut queue = VecDeque::new();
        for root in roots {
            let root = root.as_ref();
            let reference = match self.before.find(root) {
                Some(reference) => reference,
                None => {
                    if self.find_in_parent(root).is_some() {
                        self.emit(|| format!("root module {root} found in parent"));
                        continue;
                    }
                    self.after.find(root).ok_or_else(|| FindError::NotFound {
                        name: root.to_string(),
                        required_by: None,
                    })?
                }
            };

            self.emit(|| format!("root module {root} located{}", location_suffix(&reference)));
            if !self.name_to_reference.contains_key(root) {
                self.add_found_module(reference.clone())?;
                queue.push_back(reference);
            }
        }
        self.expand(queue)
    }

    /// Drain `queue`, selecting everything reachable through `requires`.
    ///
    /// Returns every reference taken off the queue.
    fn expand(&mut self, mut queue: VecDeque<ModuleReference>) -> Result<Vec<ModuleReference>> {
        let mut selected = Vec::new();
        while let Some(reference) = queue.pop_front() {
            let descriptor = Arc::clone(reference.descriptor());

            if descriptor.is_automatic() && !self.have_all_automatic_modules {
                for automatic in self.add_found_automatic_modules()? {
                    self.emit(|| {
                        format!(
                            "automatic module {} located, activated by {}",
                            automatic.name(),
                            descriptor.name()
                        )
                    });
                    queue.push_back(automatic);
                }
                self.have_all_automatic_modules = true;
            }

            for requires in descriptor.requires.iter().filter(|r| !r.is_static) {
                let name = requires.name.as_str();
                let found = match self.before.find(name) {
                    Some(found) => found,
                    None => {
                        if self.find_in_parent(name).is_some() {
                            tracing::trace!(module = descriptor.name(), requires = name, "satisfied by parent");
                            self.emit(|| format!("{} requires {name} (found in parent)", descriptor.name()));
                            continue;
                        }
                        self.after.find(name).ok_or_else(|| FindError::NotFound {
                            name: name.to_string(),
                            required_by: Some(descriptor.name().to_string()),
                        })?
                    }
                };

                tracing::trace!(module = descriptor.name(), requires = name, "requires edge");
                if !self.name_to_reference.contains_key(name) {
                    self.emit(|| {
                        format!(
                            "module {name} located, required by {}{}",
                            descriptor.name(),
                            location_suffix(&found)
                        )
                    });
                    self.add_found_module(found.clone())?;
                    queue.push_back(found);
                } else {
                    self.emit(|| format!("{} requires {name}", descriptor.name()));
                }
            }

            selected.push(reference);
        }
        Ok(selected)
    }

    /// Select every visible automatic module that is not selected yet.
    fn add_found_automatic_modules(&mut self) -> Result<Vec<ModuleReference>> {
        let mut added = Vec::new();
        for reference in self.find_all() {
            if reference.descriptor().is_automatic()
                && !self.name_to_reference.contains_key(reference.name())
            {
                self.add_found_module(reference.clone())?;
                added.push(reference);
            }
        }
        Ok(added)
    }

    fn add_found_module(&mut self, reference: ModuleReference) -> Result<()> {
        let name = reference.name().to_string();
        if let Some(platform) = reference.descriptor().target_platform.as_deref() {
            self.check_target_platform(&name, platform)?;
        }
        tracing::debug!(module = %name, location = ?reference.location(), "module selected");
        self.name_to_reference.insert(name, reference);
        Ok(())
    }

    fn check_target_platform(&mut self, module: &str, platform: &str) -> Result<()> {
        match &self.target_platform {
            None => {
                self.target_platform = Some(platform.to_string());
                Ok(())
            }
            Some(established) if established != platform => Err(FindError::ConflictingPlatform {
                module: module.to_string(),
                platform: platform.to_string(),
                established: established.clone(),
            }
            .into()),
            Some(_) => Ok(()),
        }
    }

    /// Every module visible through the finders.
    ///
    /// A module of the after finder is hidden when the before finder or a
    /// parent configuration has a module of the same name.
    fn find_all(&self) -> Vec<ModuleReference> {
        let mut modules = self.before.find_all();
        let after = self.after.find_all();
        if after.is_empty() {
            return modules;
        }
        for reference in after {
            let name = reference.name();
            if self.before.find(name).is_none() && self.find_in_parent(name).is_none() {
                modules.push(reference);
            }
        }
        modules
    }

    fn find_in_parent(&self, name: &str) -> Option<ResolvedModule> {
        self.parents
            .iter()
            .find_map(|parent| parent.find_module(name))
    }

    /// Every configuration reachable from the parents, each once.
    fn ancestor_configurations(&self) -> Vec<&Configuration> {
        let mut seen = rustc_hash::FxHashSet::default();
        self.parents
            .iter()
            .flat_map(|parent| parent.ancestors())
            .filter(|configuration| seen.insert(configuration.id()))
            .collect()
    }

    fn emit(&mut self, line: impl FnOnce() -> String) {
        if let Some(sink) = self.trace.as_mut() {
            sink.trace(&line());
        }
    }
}

fn location_suffix(reference: &ModuleReference) -> String {
    reference
        .location()
        .map(|location| format!(" ({location})"))
        .unwrap_or_default()
}
