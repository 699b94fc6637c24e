//! Service binding: select the providers of every used service.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashSet;

use super::Resolver;
use crate::configuration::FxIndexMap;
use crate::error::Result;
use crate::{ModuleDescriptor, ModuleReference};

impl Resolver {
    /// Select provider modules for the services used by selected modules.
    ///
    /// Repeats until a round selects nothing new, so providers that use other
    /// services are bound as well. Only visible modules are candidates, and a
    /// module never binds itself as a provider of its own uses.
    ///
    /// # Returns
    ///
    /// The references selected by this call, including the `requires` closure
    /// of every provider. Calling again after a completed call returns an
    /// empty list.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    /// use modlayer_graph::{InMemoryFinder, ModuleDescriptor, Resolver, ResolverOptions};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let before = InMemoryFinder::new([
    ///     ModuleDescriptor::builder("app").requires("api").uses("api.Codec").build(),
    ///     ModuleDescriptor::builder("api").exports("api").build(),
    /// ]);
    /// let after = InMemoryFinder::new([ModuleDescriptor::builder("json")
    ///     .requires("api")
    ///     .provides("api.Codec", ["json.JsonCodec"])
    ///     .build()]);
    ///
    /// let mut resolver =
    ///     Resolver::new(Arc::new(before), vec![], Arc::new(after), ResolverOptions::default())?;
    /// resolver.resolve(["app"])?;
    /// let bound = resolver.bind_services()?;
    /// assert_eq!(bound.len(), 1);
    /// assert!(resolver.bind_services()?.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn bind_services(&mut self) -> Result<Vec<ModuleReference>> {
        self.guarded(Self::bind_until_fixpoint)
    }

    fn bind_until_fixpoint(&mut self) -> Result<Vec<ModuleReference>> {
        let providers_by_service = self.index_providers();
        let mut consumers = self.initial_consumers();
        let mut bound = Vec::new();

        loop {
            let mut queue = VecDeque::new();
            for consumer in &consumers {
                let mut traced = FxHashSet::default();
                for service in &consumer.uses {
                    let Some(candidates) = providers_by_service.get(service) else {
                        continue;
                    };
                    for provider in candidates {
                        if provider.descriptor().as_ref() == consumer.as_ref() {
                            continue;
                        }
                        if traced.insert(provider.name().to_string()) {
                            self.emit(|| format!("{} binds {}", consumer.name(), provider.name()));
                        }
                        if !self.name_to_reference.contains_key(provider.name()) {
                            tracing::debug!(
                                consumer = consumer.name(),
                                provider = provider.name(),
                                service = %service,
                                "binding service provider"
                            );
                            self.add_found_module(provider.clone())?;
                            queue.push_back(provider.clone());
                        }
                    }
                }
            }

            let selected = self.expand(queue)?;
            if selected.is_empty() {
                break;
            }
            consumers = selected
                .iter()
                .map(|reference| Arc::clone(reference.descriptor()))
                .collect();
            bound.extend(selected);
        }

        Ok(bound)
    }

    /// Service name to the visible modules providing it.
    fn index_providers(&self) -> FxIndexMap<String, Vec<ModuleReference>> {
        let mut index: FxIndexMap<String, Vec<ModuleReference>> = FxIndexMap::default();
        for reference in self.find_all() {
            for provides in &reference.descriptor().provides {
                let providers = index.entry(provides.service.clone()).or_default();
                if !providers.iter().any(|p| p.name() == reference.name()) {
                    providers.push(reference.clone());
                }
            }
        }
        index
    }

    /// Selected modules, plus every ancestor module when no bootstrap graph
    /// has been resolved yet.
    fn initial_consumers(&self) -> Vec<Arc<ModuleDescriptor>> {
        let mut consumers = Vec::new();
        if !self.bootstrap_graph_exists {
            consumers.extend(
                self.ancestor_configurations()
                    .into_iter()
                    .flat_map(|configuration| configuration.modules())
                    .map(|module| Arc::clone(module.descriptor())),
            );
        }
        consumers.extend(
            self.name_to_reference
                .values()
                .map(|reference| Arc::clone(reference.descriptor())),
        );
        consumers
    }
}
