//! Module descriptors: the declared shape of a module.
//!
//! A descriptor names a module and lists what it requires, which packages it
//! owns and exports, and which services it uses and provides. Two kinds
//! exist:
//!
//! - **Declared** modules carry explicit metadata.
//! - **Automatic** modules carry only packages and provided services; once
//!   selected they read every other module and export every package.
//!
//! Descriptors are usually built with [`ModuleDescriptor::builder`] or
//! [`ModuleDescriptor::automatic`], or deserialized from a manifest entry and
//! passed through [`ModuleDescriptor::normalized`].

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Declarative description of a module.
///
/// Descriptors are immutable values. They are produced by a builder (or by
/// deserializing a manifest entry) and shared behind an `Arc` by
/// [`ModuleReference`](crate::ModuleReference).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    #[serde(default)]
    pub kind: ModuleKind,
    #[serde(default)]
    pub requires: Vec<Requires>,
    #[serde(default)]
    pub exports: Vec<Exports>,
    #[serde(default)]
    pub packages: BTreeSet<String>,
    #[serde(default)]
    pub uses: BTreeSet<String>,
    #[serde(default)]
    pub provides: Vec<Provides>,
    #[serde(default)]
    pub target_platform: Option<String>,
    #[serde(default)]
    pub hashes: Option<RecordedHashes>,
}

impl ModuleDescriptor {
    /// Start building a declared (explicit) module.
    pub fn builder(name: impl Into<String>) -> ModuleDescriptorBuilder {
        ModuleDescriptorBuilder::new(name.into(), ModuleKind::Declared)
    }

    /// Start building an automatic module.
    ///
    /// Automatic modules have no requires, exports, or uses of their own; the
    /// builder ignores attempts to add them.
    pub fn automatic(name: impl Into<String>) -> ModuleDescriptorBuilder {
        ModuleDescriptorBuilder::new(name.into(), ModuleKind::Automatic)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }

    pub fn is_automatic(&self) -> bool {
        self.kind == ModuleKind::Automatic
    }

    /// Packages exported by this module to `reader`.
    ///
    /// Qualified exports only count when `reader` is one of their targets.
    pub fn exports_to<'a>(&'a self, reader: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.exports
            .iter()
            .filter(move |export| export.is_exported_to(reader))
            .map(|export| export.package.as_str())
    }

    /// Re-establish the descriptor invariants after deserialization.
    ///
    /// Automatic modules lose any `requires`, `exports` and `uses` they were
    /// given, matching what [`ModuleDescriptor::automatic`] builds. Exported
    /// packages and provider packages are always owned by the module.
    ///
    /// # Examples
    ///
    /// ```
    /// use modlayer_graph::{ModuleDescriptor, ModuleKind, Requires};
    ///
    /// let mut descriptor = ModuleDescriptor::builder("auto").build();
    /// descriptor.kind = ModuleKind::Automatic;
    /// descriptor.requires.push(Requires::new("ghost"));
    ///
    /// assert!(descriptor.normalized().requires.is_empty());
    /// ```
    pub fn normalized(mut self) -> Self {
        if self.is_automatic() {
            self.requires.clear();
            self.exports.clear();
            self.uses.clear();
        }
        for export in &self.exports {
            self.packages.insert(export.package.clone());
        }
        for provides in &self.provides {
            for provider in &provides.providers {
                let package = package_name(provider);
                if !package.is_empty() {
                    self.packages.insert(package.to_string());
                }
            }
        }
        self
    }
}

/// Whether a module carries explicit metadata or is treated as automatic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    #[default]
    Declared,
    Automatic,
}

/// A dependence on another module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requires {
    pub name: String,
    /// Compile-time only; ignored during resolution.
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Readers of the requiring module also read the required module.
    #[serde(default, rename = "transitive")]
    pub is_transitive: bool,
}

impl Requires {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_static: false,
            is_transitive: false,
        }
    }

    pub fn transitive(name: impl Into<String>) -> Self {
        Self {
            is_transitive: true,
            ..Self::new(name)
        }
    }

    pub fn compile_only(name: impl Into<String>) -> Self {
        Self {
            is_static: true,
            ..Self::new(name)
        }
    }
}

/// An exported package, optionally qualified to a list of target modules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exports {
    pub package: String,
    #[serde(default)]
    pub targets: BTreeSet<String>,
}

impl Exports {
    pub fn is_qualified(&self) -> bool {
        !self.targets.is_empty()
    }

    pub fn is_exported_to(&self, reader: &str) -> bool {
        !self.is_qualified() || self.targets.contains(reader)
    }
}

/// Service implementations supplied by a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provides {
    pub service: String,
    pub providers: Vec<String>,
}

/// Hashes of dependencies recorded when the module was packaged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedHashes {
    pub algorithm: String,
    #[serde(with = "hex_map_serde")]
    pub hashes: BTreeMap<String, Vec<u8>>,
}

impl RecordedHashes {
    pub fn new(algorithm: impl Into<String>) -> Self {
        Self {
            algorithm: algorithm.into(),
            hashes: BTreeMap::new(),
        }
    }

    pub fn with_hash(mut self, module: impl Into<String>, hash: Vec<u8>) -> Self {
        self.hashes.insert(module.into(), hash);
        self
    }
}

// Serde helper: hash bytes are written as lowercase hex strings.
mod hex_map_serde {
    use std::collections::BTreeMap;

    use serde::de::{Deserializer, Error as _};
    use serde::ser::Serializer;
    use serde::{Deserialize, Serialize};

    pub fn serialize<S>(value: &BTreeMap<String, Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value
            .iter()
            .map(|(name, bytes)| (name.as_str(), hex::encode(bytes)))
            .collect::<BTreeMap<_, _>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        BTreeMap::<String, String>::deserialize(deserializer)?
            .into_iter()
            .map(|(name, digest)| {
                hex::decode(&digest)
                    .map(|bytes| (name, bytes))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}

/// Package portion of a fully qualified type name.
///
/// Everything before the last `.`; the empty string for an unnamed package.
pub fn package_name(type_name: &str) -> &str {
    type_name.rfind('.').map_or("", |index| &type_name[..index])
}

/// Builder for [`ModuleDescriptor`].
///
/// Every exported package and every provider's package is recorded as owned.
/// Builders started with [`ModuleDescriptor::automatic`] ignore `requires`,
/// `exports` and `uses`.
///
/// # Example
///
/// ```rust
/// use modlayer_graph::ModuleDescriptor;
///
/// let sql = ModuleDescriptor::builder("sql")
///     .requires_transitive("base")
///     .requires_static("annotations")
///     .exports("sql.api")
///     .exports_to("sql.internal", ["sql.driver"])
///     .uses("sql.api.Driver")
///     .build();
///
/// assert!(sql.packages.contains("sql.internal"));
/// assert_eq!(sql.exports_to("app").collect::<Vec<_>>(), vec!["sql.api"]);
/// ```
pub struct ModuleDescriptorBuilder {
    descriptor: ModuleDescriptor,
}

impl ModuleDescriptorBuilder {
    fn new(name: String, kind: ModuleKind) -> Self {
        Self {
            descriptor: ModuleDescriptor {
                name,
                kind,
                requires: Vec::new(),
                exports: Vec::new(),
                packages: BTreeSet::new(),
                uses: BTreeSet::new(),
                provides: Vec::new(),
                target_platform: None,
                hashes: None,
            },
        }
    }

    fn is_declared(&self) -> bool {
        self.descriptor.kind == ModuleKind::Declared
    }

    /// Add a plain `requires` edge.
    pub fn requires(self, name: impl Into<String>) -> Self {
        self.add_requires(Requires::new(name))
    }

    pub fn requires_transitive(self, name: impl Into<String>) -> Self {
        self.add_requires(Requires::transitive(name))
    }

    /// Add a compile-time only edge; resolution skips it, cycle detection
    /// does not.
    pub fn requires_static(self, name: impl Into<String>) -> Self {
        self.add_requires(Requires::compile_only(name))
    }

    pub fn add_requires(mut self, requires: Requires) -> Self {
        if self.is_declared() {
            self.descriptor.requires.push(requires);
        }
        self
    }

    /// Export a package to every module.
    pub fn exports(self, package: impl Into<String>) -> Self {
        self.exports_to(package, std::iter::empty::<String>())
    }

    /// Export a package only to the named modules.
    pub fn exports_to<I, S>(mut self, package: impl Into<String>, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.is_declared() {
            let package = package.into();
            self.descriptor.packages.insert(package.clone());
            self.descriptor.exports.push(Exports {
                package,
                targets: targets.into_iter().map(Into::into).collect(),
            });
        }
        self
    }

    pub fn package(mut self, package: impl Into<String>) -> Self {
        self.descriptor.packages.insert(package.into());
        self
    }

    pub fn uses(mut self, service: impl Into<String>) -> Self {
        if self.is_declared() {
            self.descriptor.uses.insert(service.into());
        }
        self
    }

    /// Declare providers of `service`.
    ///
    /// # Arguments
    ///
    /// * `service` - Fully qualified service type name
    /// * `providers` - Fully qualified implementation type names; their
    ///   packages become owned by the module
    pub fn provides<I, S>(mut self, service: impl Into<String>, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let providers: Vec<String> = providers.into_iter().map(Into::into).collect();
        for provider in &providers {
            let package = package_name(provider);
            if !package.is_empty() {
                self.descriptor.packages.insert(package.to_string());
            }
        }
        self.descriptor.provides.push(Provides {
            service: service.into(),
            providers,
        });
        self
    }

    pub fn target_platform(mut self, platform: impl Into<String>) -> Self {
        self.descriptor.target_platform = Some(platform.into());
        self
    }

    pub fn hashes(mut self, hashes: RecordedHashes) -> Self {
        self.descriptor.hashes = Some(hashes);
        self
    }

    pub fn build(self) -> ModuleDescriptor {
        self.descriptor
    }
}
