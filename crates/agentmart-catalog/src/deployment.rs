//! Deployment file loader
//!
//! The contract deployment script writes a JSON file of the form
//! `{ "network": ..., "agents": { "<key>": { "name", "address", "price" } } }`.
//! Keys are mapped to capability slugs; keys we do not know are dropped.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::capability::Capability;
use crate::error::{CatalogError, Result};

/// One agent as written by the deployment script
#[derive(Debug, Clone, Deserialize)]
pub struct DeployedAgent {
    pub name: String,
    pub address: String,
    /// Accepts either `"0.02"` or `0.02`
    pub price: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentFile {
    #[serde(default)]
    pub network: serde_json::Value,
    pub agents: HashMap<String, DeployedAgent>,
}

/// A catalog entry enriched with UI metadata
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub name: String,
    pub address: String,
    pub price: Decimal,
    pub capability: Capability,
    #[serde(flatten)]
    pub display: crate::capability::DisplayInfo,
}

/// Response body of `GET /api/agents`
#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub agents: BTreeMap<String, CatalogEntry>,
    pub network: serde_json::Value,
}

impl DeploymentFile {
    pub fn into_catalog(self) -> Catalog {
        let mut agents = BTreeMap::new();
        for (key, agent) in self.agents {
            let Some(capability) = Capability::from_deployment_key(&key) else {
                tracing::debug!(key = %key, "Skipping unknown deployment key");
                continue;
            };
            agents.insert(
                capability.slug().to_string(),
                CatalogEntry {
                    name: agent.name,
                    address: agent.address,
                    price: agent.price,
                    capability,
                    display: capability.display(),
                },
            );
        }

        Catalog {
            agents,
            network: self.network,
        }
    }
}

/// Read and transform the deployment file
pub fn load_catalog(path: impl AsRef<Path>) -> Result<Catalog> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CatalogError::DeploymentNotFound {
            path: path.display().to_string(),
        });
    }

    let raw = std::fs::read_to_string(path)?;
    let deployment: DeploymentFile = serde_json::from_str(&raw)?;
    Ok(deployment.into_catalog())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn write_deployment(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_maps_keys_to_slugs() {
        let file = write_deployment(
            r#"{
                "network": "localhost",
                "agents": {
                    "priceOracle": {"name": "Price Oracle Agent", "address": "0x3F11", "price": "0.01"},
                    "swap": {"name": "Swap Agent", "address": "0x51e5", "price": 0.1},
                    "mystery": {"name": "Nobody", "address": "0x0", "price": "9"}
                }
            }"#,
        );

        let catalog = load_catalog(file.path()).unwrap();
        assert_eq!(catalog.agents.len(), 2);
        assert_eq!(catalog.network, "localhost");

        let oracle = &catalog.agents["price-feed"];
        assert_eq!(oracle.price, dec!(0.01));
        assert_eq!(oracle.display.category, "DeFi");

        let json = serde_json::to_value(&catalog).unwrap();
        assert_eq!(json["agents"]["token-swap"]["capability"], "token-swap");
        assert_eq!(json["agents"]["token-swap"]["icon"], "💱");
        assert_eq!(json["agents"]["price-feed"]["price"], "0.01");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_catalog(dir.path().join("deployments.json")).unwrap_err();
        assert!(matches!(err, CatalogError::DeploymentNotFound { .. }));
        assert!(err.to_string().contains("Please run deployment first."));
    }

    #[test]
    fn test_malformed_file() {
        let file = write_deployment("{ not json");
        assert!(matches!(load_catalog(file.path()), Err(CatalogError::Parse(_))));
    }
}
