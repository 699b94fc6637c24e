//! # modlayer-graph
//!
//! Module resolution and readability graph construction.
//!
//! Given root module names, two module finders and zero or more parent
//! configurations, this crate selects the modules that participate in a new
//! configuration, binds service providers on demand, and validates the
//! result before handing back its readability graph.
//!
//! ## Overview
//!
//! - **Pure computation**: no file I/O; finders supply modules
//! - **Layered**: every [`Configuration`] can be the parent of the next one
//! - **Typed failures**: lookup problems and graph inconsistencies are
//!   distinct [`FindError`] and [`ResolutionError`] variants
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────────────┐
//! │ before finder│   │   parents    │   │     after finder     │
//! └──────┬───────┘   └──────┬───────┘   └──────────┬───────────┘
//!        └──────────────────┼──────────────────────┘
//!                           ▼
//!                 ┌───────────────────┐
//!                 │     Resolver      │  resolve → bind_services → finish
//!                 └─────────┬─────────┘
//!                           ▼
//!                 ┌───────────────────┐
//!                 │   Configuration   │  modules + readability graph
//!                 └───────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use modlayer_graph::{
//!     Configuration, EmptyFinder, InMemoryFinder, ModuleDescriptor, ResolverOptions,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let finder = InMemoryFinder::new([
//!     ModuleDescriptor::builder("app").requires("lib").build(),
//!     ModuleDescriptor::builder("lib").exports("lib.api").build(),
//! ]);
//!
//! let configuration = Configuration::resolve(
//!     Arc::new(finder),
//!     vec![],
//!     Arc::new(EmptyFinder),
//!     ["app"],
//!     ResolverOptions::default(),
//! )?;
//!
//! assert!(configuration.reads_module_named("app", "lib"));
//! # Ok(())
//! # }
//! ```

pub mod configuration;
pub mod descriptor;
pub mod error;
pub mod finder;
pub mod reference;
pub mod resolver;
pub mod trace;

pub use configuration::{Configuration, ConfigurationId, GraphSnapshot, Reads, ResolvedModule};
pub use descriptor::{
    Exports, ModuleDescriptor, ModuleDescriptorBuilder, ModuleKind, Provides, RecordedHashes,
    Requires, package_name,
};
pub use error::{FindError, ResolutionError, ResolveError, Result};
pub use finder::{ComposedFinder, EmptyFinder, InMemoryFinder, ModuleFinder};
pub use reference::{ContentHasher, ModuleHasher, ModuleReference};
pub use resolver::{Resolver, ResolverOptions};
pub use trace::{TraceLog, TraceSink, TracingSink};

#[cfg(test)]
mod tests;
