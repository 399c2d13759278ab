//! Contract interface descriptors (JSON ABI).
//!
//! The registry refers to descriptors by name (`pool.abi.json`, ...). A
//! [`DescriptorSource`] turns such a name into a parsed [`JsonAbi`] that the
//! RPC collaborator uses to encode calls and decode results.

use alloy::json_abi::JsonAbi;
use std::path::{Path, PathBuf};

use crate::error::{PoolError, Result};
use crate::registry::{BSC_POOL_DESCRIPTOR, FACTORY_DESCRIPTOR, POOL_DESCRIPTOR};

/// Resolves descriptor names to parsed ABIs.
pub trait DescriptorSource: Send + Sync {
    /// # Errors
    /// Returns [`PoolError::DescriptorNotFound`] if the name is unknown or its
    /// content is not a valid JSON ABI.
    fn resolve(&self, name: &str) -> Result<JsonAbi>;
}

/// Descriptors compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedDescriptors;

const EMBEDDED: [(&str, &str); 3] = [
    (POOL_DESCRIPTOR, include_str!("../abi/pool.abi.json")),
    (BSC_POOL_DESCRIPTOR, include_str!("../abi/bsc.pool.abi.json")),
    (FACTORY_DESCRIPTOR, include_str!("../abi/factory.abi.json")),
];

impl EmbeddedDescriptors {
    /// Names of the bundled descriptors.
    pub fn names() -> impl Iterator<Item = &'static str> {
        EMBEDDED.iter().map(|(name, _)| *name)
    }
}

impl DescriptorSource for EmbeddedDescriptors {
    fn resolve(&self, name: &str) -> Result<JsonAbi> {
        let (_, json) = EMBEDDED
            .iter()
            .find(|(known, _)| *known == name)
            .ok_or_else(|| not_found(name, "no bundled descriptor with this name"))?;
        parse_abi(name, json)
    }
}

/// Descriptors read from `<root>/<name>` on every lookup.
#[derive(Debug, Clone)]
pub struct DirectoryDescriptors {
    root: PathBuf,
}

impl DirectoryDescriptors {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DescriptorSource for DirectoryDescriptors {
    fn resolve(&self, name: &str) -> Result<JsonAbi> {
        // Names are plain file names; anything that could escape the root is refused.
        if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
            return Err(not_found(name, "descriptor names must be plain file names"));
        }

        let path = self.root.join(name);
        let json = std::fs::read_to_string(&path)
            .map_err(|e| not_found(name, format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded interface descriptor");
        parse_abi(name, &json)
    }
}

fn parse_abi(name: &str, json: &str) -> Result<JsonAbi> {
    serde_json::from_str(json).map_err(|e| not_found(name, format!("malformed JSON ABI: {e}")))
}

fn not_found(name: &str, reason: impl Into<String>) -> PoolError {
    PoolError::DescriptorNotFound {
        name: name.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_descriptors_parse() {
        let source = EmbeddedDescriptors;
        for name in EmbeddedDescriptors::names() {
            source.resolve(name).unwrap_or_else(|e| panic!("{name}: {e}"));
        }

        let factory = source.resolve(FACTORY_DESCRIPTOR).unwrap();
        let get_pool = &factory.function("getPool").expect("getPool present")[0];
        assert_eq!(get_pool.signature(), "getPool(address,address,uint24)");
    }

    #[test]
    fn bsc_pool_uses_wider_fee_protocol() {
        let abi = EmbeddedDescriptors.resolve(BSC_POOL_DESCRIPTOR).unwrap();
        let slot0 = &abi.function("slot0").unwrap()[0];
        assert_eq!(slot0.outputs[5].ty, "uint32");

        let abi = EmbeddedDescriptors.resolve(POOL_DESCRIPTOR).unwrap();
        let slot0 = &abi.function("slot0").unwrap()[0];
        assert_eq!(slot0.outputs[5].ty, "uint8");
    }

    #[test]
    fn unknown_embedded_name_is_not_found() {
        assert!(matches!(
            EmbeddedDescriptors.resolve("router.abi.json"),
            Err(PoolError::DescriptorNotFound { ref name, .. }) if name == "router.abi.json"
        ));
    }

    #[test]
    fn directory_source_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("factory.abi.json"),
            include_str!("../abi/factory.abi.json"),
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.abi.json"), "{ not json").unwrap();

        let source = DirectoryDescriptors::new(dir.path());
        assert!(source.resolve("factory.abi.json").is_ok());
        assert!(matches!(
            source.resolve("broken.abi.json"),
            Err(PoolError::DescriptorNotFound { .. })
        ));
        assert!(matches!(
            source.resolve("pool.abi.json"),
            Err(PoolError::DescriptorNotFound { .. })
        ));
        assert!(matches!(
            source.resolve("../factory.abi.json"),
            Err(PoolError::DescriptorNotFound { .. })
        ));
    }
}
