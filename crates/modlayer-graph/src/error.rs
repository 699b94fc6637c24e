//! Failure conditions raised while resolving a configuration.
//!
//! Failures fall in two families: [`FindError`] for lookup problems (missing
//! modules, platform conflicts, hash verification) and [`ResolutionError`]
//! for inconsistencies in the resulting graph. Every failure is terminal for
//! the resolver that produced it.

use thiserror::Error;

/// Result type alias for resolution operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Top-level resolution failure.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Find(#[from] FindError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// The resolver already failed and cannot be used again.
    #[error("resolver already failed; start again with a new resolver")]
    Poisoned,
}

impl ResolveError {
    pub fn as_find(&self) -> Option<&FindError> {
        match self {
            Self::Find(err) => Some(err),
            _ => None,
        }
    }

    pub fn as_resolution(&self) -> Option<&ResolutionError> {
        match self {
            Self::Resolution(err) => Some(err),
            _ => None,
        }
    }
}

/// A module or a property of a module could not be located or verified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FindError {
    #[error("module {name} not found{}", required_by_suffix(.required_by))]
    NotFound {
        name: String,
        required_by: Option<String>,
    },

    #[error(
        "module {module} has constraints on target platform ({platform}) that conflict with other modules: {established}"
    )]
    ConflictingPlatform {
        module: String,
        platform: String,
        established: String,
    },

    #[error("parents have conflicting constraints on target platform: {first}, {second}")]
    ConflictingParentPlatforms { first: String, second: String },

    #[error("unable to compute the hash of module {module}")]
    HashUnavailable { module: String },

    #[error("hash of {module} ({actual}) differs to expected hash ({expected}) recorded in {recorded_in}")]
    HashMismatch {
        module: String,
        actual: String,
        expected: String,
        recorded_in: String,
    },
}

fn required_by_suffix(required_by: &Option<String>) -> String {
    required_by
        .as_ref()
        .map(|by| format!(", required by {by}"))
        .unwrap_or_default()
}

/// The selected modules do not form a valid readability graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("cycle detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("module {reader} reads another module named {reader}")]
    ReadsSelfName { reader: String },

    #[error("module {reader} reads more than one module named {name}")]
    ReadsDuplicateName { reader: String, name: String },

    #[error("module {reader} contains package {package}, module {exporter} exports package {package} to {reader}")]
    PackageShadowed {
        reader: String,
        package: String,
        exporter: String,
    },

    #[error("modules {first} and {second} export package {package} to module {reader}")]
    AmbiguousPackageSupplier {
        reader: String,
        package: String,
        first: String,
        second: String,
    },

    #[error("module {module} does not read a module that exports {package}")]
    MissingServiceExport { module: String, package: String },
}
