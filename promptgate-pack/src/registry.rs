use std::collections::HashMap;

use promptgate_core::PromptgateError;

use crate::PromptPack;

/// Closed lookup table from capability key to its registered versions, in
/// registration order. Built once at startup, read-only afterwards; safe for
/// unlimited concurrent reads.
#[derive(Debug)]
pub struct PackRegistry {
    packs: HashMap<String, Vec<PromptPack>>,
}

impl PackRegistry {
    pub fn builder() -> PackRegistryBuilder {
        PackRegistryBuilder::default()
    }

    /// Resolves a capability key to a single pack. An omitted version means
    /// the last-registered entry for that key, not the highest semantic
    /// version.
    pub fn resolve(
        &self,
        key: &str,
        version: Option<&str>,
    ) -> Result<&PromptPack, PromptgateError> {
        let versions = self
            .packs
            .get(key)
            .ok_or_else(|| PromptgateError::PackNotFound {
                key: key.to_string(),
            })?;

        match version {
            Some(version) => versions
                .iter()
                .find(|pack| pack.version == version)
                .ok_or_else(|| PromptgateError::VersionNotFound {
                    key: key.to_string(),
                    version: version.to_string(),
                }),
            // The builder never stores an empty version list.
            None => versions.last().ok_or_else(|| PromptgateError::PackNotFound {
                key: key.to_string(),
            }),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.packs.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.packs.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}

#[derive(Default)]
pub struct PackRegistryBuilder {
    packs: Vec<PromptPack>,
}

impl PackRegistryBuilder {
    pub fn register(mut self, pack: PromptPack) -> Self {
        self.packs.push(pack);
        self
    }

    /// Validates the whole table before first use: empty keys/versions and
    /// duplicate `(key, version)` pairs are construction errors.
    pub fn build(self) -> Result<PackRegistry, PromptgateError> {
        let mut table: HashMap<String, Vec<PromptPack>> = HashMap::new();

        for pack in self.packs {
            if pack.key.trim().is_empty() {
                return Err(PromptgateError::InvalidConfig(
                    "pack key must not be empty".into(),
                ));
            }
            if pack.version.trim().is_empty() {
                return Err(PromptgateError::InvalidConfig(format!(
                    "pack '{}' has an empty version",
                    pack.key
                )));
            }

            let versions = table.entry(pack.key.clone()).or_default();
            if versions.iter().any(|known| known.version == pack.version) {
                return Err(PromptgateError::InvalidConfig(format!(
                    "duplicate pack '{}@{}'",
                    pack.key, pack.version
                )));
            }
            if let Some(last) = versions.last() {
                if pack.version.as_str() < last.version.as_str() {
                    tracing::warn!(
                        key = %pack.key,
                        registered = %pack.version,
                        after = %last.version,
                        "pack versions registered out of order; unversioned resolution returns the last registered entry"
                    );
                }
            }
            versions.push(pack);
        }

        Ok(PackRegistry { packs: table })
    }
}
