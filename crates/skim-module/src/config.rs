//! Module configuration.
//!
//! The module is configured once at setup: who owns the administrative
//! capability, which account holds the vault positions, and which assets
//! are bound to which vault-share tokens. Identities are hex-encoded in
//! the TOML form.

use std::path::Path;

use serde::{Deserialize, Serialize};
use skim_types::{AccountId, Asset};

/// Binding of a supported asset to its vault-share token identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetBinding {
    /// The supported asset.
    pub asset: Asset,
    /// The vault's share token for this asset.
    #[serde(with = "hex")]
    pub vault_token: AccountId,
}

/// Complete module configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// The module owner (administrative capability, transferable at
    /// runtime).
    #[serde(with = "hex")]
    pub owner: AccountId,
    /// Account the module's vault deposits are held under.
    #[serde(with = "hex")]
    pub module_account: AccountId,
    /// Supported assets and their vault-share token bindings.
    #[serde(default)]
    pub assets: Vec<AssetBinding>,
}

impl ModuleConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the TOML configuration file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ModuleConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Rejects duplicate asset bindings: each asset maps to at most one
    /// vault-share token.
    pub fn validate(&self) -> anyhow::Result<()> {
        for asset in Asset::ALL {
            let count = self.assets.iter().filter(|b| b.asset == asset).count();
            if count > 1 {
                anyhow::bail!("asset {asset} is bound {count} times");
            }
        }
        Ok(())
    }
}
