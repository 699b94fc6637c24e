//! Validation of the selected modules and construction of the readability graph.

use std::collections::hash_map::Entry;

use rustc_hash::{FxHashMap, FxHashSet};

use super::Resolver;
use crate::configuration::{Configuration, FxIndexMap, FxIndexSet, Reads, ResolvedModule};
use crate::descriptor::package_name;
use crate::error::{FindError, ResolutionError, ResolveError, Result};
use crate::{ModuleDescriptor, ModuleKind, ModuleReference};

impl Resolver {
    /// Validate the selection and build the configuration.
    ///
    /// Checks run in order and stop at the first failure: cycles, recorded
    /// hashes, then package suppliers of the readability graph.
    ///
    /// # Errors
    ///
    /// * [`ResolutionError::Cycle`] - a `requires` path leads back to its start
    /// * [`FindError::HashUnavailable`] / [`FindError::HashMismatch`] - a
    ///   recorded hash cannot be computed or does not match
    /// * [`ResolutionError::ReadsSelfName`] / [`ResolutionError::ReadsDuplicateName`]
    /// * [`ResolutionError::PackageShadowed`] /
    ///   [`ResolutionError::AmbiguousPackageSupplier`]
    /// * [`ResolutionError::MissingServiceExport`] - a used or provided
    ///   service's package is neither owned nor read
    /// * [`ResolveError::Poisoned`] - an earlier call failed
    pub fn finish(self) -> Result<Configuration> {
        if self.poisoned {
            return Err(ResolveError::Poisoned);
        }

        detect_cycles(&self.name_to_reference)?;
        self.check_hashes()?;
        let graph = self.make_graph();
        check_export_suppliers(&graph)?;

        tracing::info!(
            modules = graph.len(),
            parents = self.parents.len(),
            target_platform = ?self.target_platform,
            "configuration resolved"
        );
        Ok(Configuration::new(
            self.configuration_id,
            self.parents,
            graph,
            self.target_platform,
        ))
    }

    fn check_hashes(&self) -> Result<()> {
        for reference in self.name_to_reference.values() {
            let descriptor = reference.descriptor();
            let Some(recorded) = &descriptor.hashes else {
                continue;
            };

            for (name, expected) in &recorded.hashes {
                let other = match self.name_to_reference.get(name) {
                    Some(other) => other.clone(),
                    None => match self.find_in_parent(name) {
                        Some(module) => module.reference().clone(),
                        None => continue,
                    },
                };

                let actual = other
                    .compute_hash(&recorded.algorithm)
                    .ok_or_else(|| FindError::HashUnavailable {
                        module: name.clone(),
                    })?;
                if actual != *expected {
                    return Err(FindError::HashMismatch {
                        module: name.clone(),
                        actual: hex::encode(&actual),
                        expected: hex::encode(expected),
                        recorded_in: descriptor.name().to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Build the readability graph of the selected modules.
    ///
    /// Starts from the dependence graph and closes it under `requires
    /// transitive`, including transitive edges declared in ancestors.
    fn make_graph(&self) -> FxIndexMap<ResolvedModule, Reads> {
        let ancestors = self.ancestor_configurations();

        let selected: FxIndexMap<&str, ResolvedModule> = self
            .name_to_reference
            .iter()
            .map(|(name, reference)| {
                (
                    name.as_str(),
                    ResolvedModule::new(self.configuration_id, reference.clone()),
                )
            })
            .collect();

        let mut requires_transitive: FxHashMap<ResolvedModule, FxIndexSet<ResolvedModule>> =
            FxHashMap::default();
        for configuration in &ancestors {
            for m1 in configuration.modules() {
                for requires in m1.descriptor().requires.iter().filter(|r| r.is_transitive) {
                    if let Some(m2) = configuration.find_module(&requires.name) {
                        requires_transitive.entry(m1.clone()).or_default().insert(m2);
                    }
                }
            }
        }

        let mut graph: FxIndexMap<ResolvedModule, Reads> = FxIndexMap::default();
        for m1 in selected.values() {
            let mut reads = Reads::default();
            let mut transitive = FxIndexSet::default();

            match m1.descriptor().kind() {
                ModuleKind::Declared => {
                    for requires in m1.descriptor().requires.iter().filter(|r| !r.is_static) {
                        let m2 = match selected.get(requires.name.as_str()) {
                            Some(m2) => m2.clone(),
                            None => match self.find_in_parent(&requires.name) {
                                Some(m2) => m2,
                                None => continue,
                            },
                        };
                        if m2 == *m1 {
                            continue;
                        }
                        if requires.is_transitive {
                            transitive.insert(m2.clone());
                        }
                        reads.insert(m2);
                    }
                }
                ModuleKind::Automatic => {
                    let others = selected.values().filter(|m2| m2.name() != m1.name());
                    let inherited = ancestors.iter().flat_map(|c| c.modules());
                    for m2 in others.chain(inherited) {
                        if m2.is_automatic() {
                            transitive.insert(m2.clone());
                        }
                        reads.insert(m2.clone());
                    }
                }
            }

            graph.insert(m1.clone(), reads);
            requires_transitive.insert(m1.clone(), transitive);
        }

        let mut staged = Vec::new();
        let mut changed = true;
        while changed {
            changed = false;
            for (m1, reads) in graph.iter_mut() {
                for m2 in reads.iter() {
                    if let Some(m2_transitive) = requires_transitive.get(m2) {
                        staged.extend(
                            m2_transitive
                                .iter()
                                .filter(|m3| *m3 != m1 && !reads.contains(*m3))
                                .cloned(),
                        );
                    }
                }
                if !staged.is_empty() {
                    reads.extend(staged.drain(..));
                    changed = true;
                }
            }
        }

        graph
    }
}

/// Depth-first search for a `requires` cycle among the selected modules.
///
/// Edges to modules outside the selection are not followed; parents are
/// already acyclic.
fn detect_cycles(selected: &FxIndexMap<String, ModuleReference>) -> Result<()> {
    let mut detector = CycleDetector {
        selected,
        visited: FxHashSet::default(),
        path: FxIndexSet::default(),
    };
    for reference in selected.values() {
        detector.visit(reference.descriptor())?;
    }
    Ok(())
}

struct CycleDetector<'a> {
    selected: &'a FxIndexMap<String, ModuleReference>,
    visited: FxHashSet<&'a str>,
    path: FxIndexSet<&'a str>,
}

impl<'a> CycleDetector<'a> {
    fn visit(&mut self, descriptor: &'a ModuleDescriptor) -> std::result::Result<(), ResolutionError> {
        let name = descriptor.name();
        if self.visited.contains(name) {
            return Ok(());
        }
        if let Some(start) = self.path.get_index_of(name) {
            let mut path: Vec<String> = self
                .path
                .iter()
                .skip(start)
                .map(|n| n.to_string())
                .collect();
            path.push(name.to_string());
            return Err(ResolutionError::Cycle { path });
        }

        self.path.insert(name);
        for requires in &descriptor.requires {
            if let Some(other) = self.selected.get(&requires.name) {
                if other.name() != name {
                    self.visit(other.descriptor())?;
                }
            }
        }
        self.path.shift_remove(name);
        self.visited.insert(name);
        Ok(())
    }
}

/// Check that every module reads at most one supplier per package and can
/// see the packages of the services it uses or provides.
fn check_export_suppliers(graph: &FxIndexMap<ResolvedModule, Reads>) -> Result<()> {
    for (m1, reads) in graph {
        let descriptor = m1.descriptor();

        let mut names: FxHashSet<&str> = FxHashSet::default();
        names.insert(m1.name());

        let mut suppliers: FxHashMap<&str, &ResolvedModule> = descriptor
            .packages
            .iter()
            .map(|package| (package.as_str(), m1))
            .collect();

        for m2 in reads {
            if m2 == m1 {
                continue;
            }
            if !names.insert(m2.name()) {
                let err = if m2.name() == m1.name() {
                    ResolutionError::ReadsSelfName {
                        reader: m1.name().to_string(),
                    }
                } else {
                    ResolutionError::ReadsDuplicateName {
                        reader: m1.name().to_string(),
                        name: m2.name().to_string(),
                    }
                };
                return Err(err.into());
            }

            let supplied: Vec<&str> = match m2.descriptor().kind() {
                // automatic modules export every package they own
                ModuleKind::Automatic => m2.descriptor().packages.iter().map(String::as_str).collect(),
                ModuleKind::Declared => m2.descriptor().exports_to(m1.name()).collect(),
            };
            for package in supplied {
                match suppliers.entry(package) {
                    Entry::Vacant(entry) => {
                        entry.insert(m2);
                    }
                    Entry::Occupied(entry) if *entry.get() == m2 => {}
                    Entry::Occupied(entry) => {
                        return Err(two_suppliers(m1, package, m2, entry.get()).into());
                    }
                }
            }
        }

        if descriptor.kind() == ModuleKind::Declared {
            let services = descriptor
                .uses
                .iter()
                .chain(descriptor.provides.iter().map(|provides| &provides.service));
            for service in services {
                let package = package_name(service);
                if !suppliers.contains_key(package) {
                    return Err(ResolutionError::MissingServiceExport {
                        module: m1.name().to_string(),
                        package: package.to_string(),
                    }
                    .into());
                }
            }
        }
    }
    Ok(())
}

fn two_suppliers(
    reader: &ResolvedModule,
    package: &str,
    supplier: &ResolvedModule,
    existing: &ResolvedModule,
) -> ResolutionError {
    if existing == reader || supplier == reader {
        let exporter = if existing == reader { supplier } else { existing };
        ResolutionError::PackageShadowed {
            reader: reader.name().to_string(),
            package: package.to_string(),
            exporter: exporter.name().to_string(),
        }
    } else {
        ResolutionError::AmbiguousPackageSupplier {
            reader: reader.name().to_string(),
            package: package.to_string(),
            first: existing.name().to_string(),
            second: supplier.name().to_string(),
        }
    }
}
