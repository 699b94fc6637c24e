//! Located modules and the hashing of their content.
//!
//! [`ModuleReference`] pairs a shared descriptor with the place it was found
//! and, optionally, a [`ModuleHasher`] used to verify hashes recorded by
//! requiring modules.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use super::ModuleDescriptor;

/// Computes content hashes for a module reference.
///
/// Returning `None` means the hash cannot be computed with the requested
/// algorithm, which fails hash verification for any module that recorded one.
pub trait ModuleHasher: Send + Sync {
    fn compute_hash(&self, algorithm: &str) -> Option<Vec<u8>>;
}

/// Hashes an in-memory copy of a module's content.
#[derive(Debug, Clone)]
pub struct ContentHasher {
    content: Arc<[u8]>,
}

impl ContentHasher {
    pub fn new(content: impl Into<Vec<u8>>) -> Self {
        let content: Vec<u8> = content.into();
        Self {
            content: Arc::from(content),
        }
    }

    /// Digest `content` with a named algorithm.
    ///
    /// Accepts `SHA-224`, `SHA-256`, `SHA-384` and `SHA-512` (case-insensitive,
    /// the dash is optional).
    pub fn digest(algorithm: &str, content: &[u8]) -> Option<Vec<u8>> {
        let normalized = algorithm.to_ascii_uppercase().replace('-', "");
        let digest = match normalized.as_str() {
            "SHA224" => Sha224::digest(content).to_vec(),
            "SHA256" => Sha256::digest(content).to_vec(),
            "SHA384" => Sha384::digest(content).to_vec(),
            "SHA512" => Sha512::digest(content).to_vec(),
            _ => return None,
        };
        Some(digest)
    }
}

impl ModuleHasher for ContentHasher {
    fn compute_hash(&self, algorithm: &str) -> Option<Vec<u8>> {
        Self::digest(algorithm, &self.content)
    }
}

/// Handle to a located module: its descriptor plus where it came from.
///
/// Cloning is cheap; the descriptor and hasher are shared.
#[derive(Clone)]
pub struct ModuleReference {
    descriptor: Arc<ModuleDescriptor>,
    location: Option<String>,
    hasher: Option<Arc<dyn ModuleHasher>>,
}

impl ModuleReference {
    pub fn new(descriptor: ModuleDescriptor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            location: None,
            hasher: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_hasher(mut self, hasher: impl ModuleHasher + 'static) -> Self {
        self.hasher = Some(Arc::new(hasher));
        self
    }

    /// Attach in-memory content hashed by [`ContentHasher`].
    pub fn with_content(self, content: impl Into<Vec<u8>>) -> Self {
        self.with_hasher(ContentHasher::new(content))
    }

    pub fn descriptor(&self) -> &Arc<ModuleDescriptor> {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn can_hash(&self) -> bool {
        self.hasher.is_some()
    }

    /// Hash the module's content with `algorithm`.
    ///
    /// # Returns
    ///
    /// `None` when the reference has no hasher or the hasher does not
    /// support the algorithm.
    ///
    /// # Example
    ///
    /// ```rust
    /// use modlayer_graph::{ModuleDescriptor, ModuleReference};
    ///
    /// let reference = ModuleReference::new(ModuleDescriptor::builder("lib").build())
    ///     .with_content("lib bytes");
    /// assert_eq!(reference.compute_hash("SHA-256").map(|h| h.len()), Some(32));
    /// assert!(reference.compute_hash("MD5").is_none());
    /// ```
    pub fn compute_hash(&self, algorithm: &str) -> Option<Vec<u8>> {
        self.hasher
            .as_ref()
            .and_then(|hasher| hasher.compute_hash(algorithm))
    }
}

impl fmt::Debug for ModuleReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleReference")
            .field("name", &self.descriptor.name)
            .field("location", &self.location)
            .field("hashable", &self.hasher.is_some())
            .finish()
    }
}

impl From<ModuleDescriptor> for ModuleReference {
    fn from(descriptor: ModuleDescriptor) -> Self {
        Self::new(descriptor)
    }
}
