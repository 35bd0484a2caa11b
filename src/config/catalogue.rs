use crate::utils::error::{MarketError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Static league catalogue: the valid modalities with their roster and quota
/// limits, plus the venue-level settings the adapters need. Read-only
/// configuration the core consults but never mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalogue {
    pub league: LeagueSettings,
    #[serde(rename = "modality", default)]
    pub modalities: Vec<ModalityRules>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueSettings {
    #[serde(default = "default_guild_id")]
    pub guild_id: String,
    /// Global cap on free signings while a regular-season market is open.
    #[serde(default = "default_mid_season_limit")]
    pub mid_season_free_limit: u32,
    /// Actor ids with the official capability (confirm signings, administer rosters).
    #[serde(default)]
    pub officials: Vec<String>,
    /// Optional audit-log webhook consumed by the notification adapter.
    #[serde(default)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModalityRules {
    pub name: String,
    pub max_roster_size: usize,
    /// Per-team cap on quota-limited ("article") signings per season.
    pub article_limit: u32,
}

fn default_guild_id() -> String {
    "league".to_string()
}

fn default_mid_season_limit() -> u32 {
    5
}

impl ModalityRules {
    /// Canonical document key for this modality.
    pub fn key(&self) -> String {
        self.name.to_lowercase()
    }
}

impl Catalogue {
    pub fn from_toml(content: &str) -> Result<Self> {
        let catalogue: Catalogue = toml::from_str(content).map_err(|e| MarketError::Config {
            message: format!("failed to parse catalogue: {e}"),
        })?;
        catalogue.validate()?;
        Ok(catalogue)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Case-insensitive modality lookup.
    pub fn rules(&self, modality: &str) -> Option<&ModalityRules> {
        self.modalities
            .iter()
            .find(|m| m.name.eq_ignore_ascii_case(modality))
    }

    pub fn require(&self, modality: &str) -> Result<&ModalityRules> {
        self.rules(modality)
            .ok_or_else(|| MarketError::UnknownModality(modality.to_string()))
    }

    pub fn mid_season_free_limit(&self) -> u32 {
        self.league.mid_season_free_limit
    }
}

impl Validate for Catalogue {
    fn validate(&self) -> Result<()> {
        if self.modalities.is_empty() {
            return Err(MarketError::Config {
                message: "catalogue must declare at least one modality".to_string(),
            });
        }

        for rules in &self.modalities {
            validate_non_empty_string("modality.name", &rules.name)?;
            validate_positive_number("modality.max_roster_size", rules.max_roster_size, 1)?;
            validate_positive_number(
                "modality.article_limit",
                rules.article_limit as usize,
                1,
            )?;
        }

        let mut keys: Vec<String> = self.modalities.iter().map(|m| m.key()).collect();
        keys.sort();
        keys.dedup();
        if keys.len() != self.modalities.len() {
            return Err(MarketError::Config {
                message: "catalogue declares the same modality twice".to_string(),
            });
        }

        if let Some(url) = &self.league.webhook_url {
            validate_url("league.webhook_url", url)?;
        }

        Ok(())
    }
}
