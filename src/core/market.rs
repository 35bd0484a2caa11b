use crate::config::catalogue::Catalogue;
use crate::core::{load_document, persist_document, DocumentStore, MARKET_DOCUMENT};
use crate::domain::model::{MarketDocument, MarketPhase, MarketState, SigningKind};
use crate::utils::error::{MarketError, Result};
use chrono::Utc;

/// Per-modality season phase plus the mid-season free-signing counter.
/// Phases only move through the four season/market operations; a newly seen
/// modality starts in pre-season.
pub struct MarketStateStore<D: DocumentStore> {
    store: D,
    catalogue: Catalogue,
    doc: MarketDocument,
}

impl<D: DocumentStore> MarketStateStore<D> {
    /// Loads the market document and ensures a state record exists for every
    /// catalogued modality, so `classify_signing` can never miss one that
    /// went through league initialization.
    pub async fn load(store: D, catalogue: Catalogue) -> Result<Self> {
        let mut doc: MarketDocument = load_document(&store, MARKET_DOCUMENT)
            .await?
            .unwrap_or_default();

        let mut seeded = false;
        let today = Utc::now().date_naive();
        for rules in &catalogue.modalities {
            if !doc.modalities.contains_key(&rules.key()) {
                doc.modalities
                    .insert(rules.key(), MarketState::new_pre_season(today));
                seeded = true;
            }
        }
        if seeded {
            persist_document(&store, MARKET_DOCUMENT, &doc).await?;
            tracing::info!("market state seeded with new modalities");
        }

        Ok(Self {
            store,
            catalogue,
            doc,
        })
    }

    async fn persist(&self) -> Result<()> {
        persist_document(&self.store, MARKET_DOCUMENT, &self.doc).await
    }

    pub fn state(&self, modality: &str) -> Option<&MarketState> {
        self.doc.modalities.get(&modality.to_lowercase())
    }

    /// Idempotently initializes a catalogued modality to pre-season.
    pub async fn ensure_modality(&mut self, modality: &str) -> Result<()> {
        let key = self.catalogue.require(modality)?.key();
        if !self.doc.modalities.contains_key(&key) {
            self.doc
                .modalities
                .insert(key, MarketState::new_pre_season(Utc::now().date_naive()));
            self.persist().await?;
        }
        Ok(())
    }

    fn state_mut(&mut self, modality: &str) -> Result<&mut MarketState> {
        let key = self.catalogue.require(modality)?.key();
        // Catalogued modalities are seeded at load and by ensure_modality.
        self.doc
            .modalities
            .get_mut(&key)
            .ok_or(MarketError::UnknownMarketState(key))
    }

    /// Opens the mid-season free market. The free-signing counter carries
    /// over; it only resets on season boundaries.
    pub async fn open_market(&mut self, modality: &str) -> Result<MarketState> {
        let state = self.state_mut(modality)?;
        state.phase = MarketPhase::RegularSeasonMarketOpen;
        let snapshot = state.clone();
        self.persist().await?;
        Ok(snapshot)
    }

    pub async fn close_market(&mut self, modality: &str) -> Result<MarketState> {
        let state = self.state_mut(modality)?;
        state.phase = MarketPhase::RegularSeasonMarketClosed;
        let snapshot = state.clone();
        self.persist().await?;
        Ok(snapshot)
    }

    /// Starts a season: market closed, free-signing counter back to zero,
    /// start date stamped today.
    pub async fn start_season(&mut self, modality: &str) -> Result<MarketState> {
        let today = Utc::now().date_naive();
        let state = self.state_mut(modality)?;
        state.phase = MarketPhase::RegularSeasonMarketClosed;
        state.mid_season_free_signings_used = 0;
        state.season_start_date = today;
        let snapshot = state.clone();
        self.persist().await?;
        Ok(snapshot)
    }

    /// Ends a season: back to the unlimited pre-season market.
    pub async fn end_season(&mut self, modality: &str) -> Result<MarketState> {
        let today = Utc::now().date_naive();
        let state = self.state_mut(modality)?;
        state.phase = MarketPhase::PreSeason;
        state.mid_season_free_signings_used = 0;
        state.season_start_date = today;
        let snapshot = state.clone();
        self.persist().await?;
        Ok(snapshot)
    }

    /// The core decision function: current phase, nothing else, determines
    /// the signing kind. Counters only decide whether the later quota check
    /// passes.
    pub fn classify_signing(&self, modality: &str) -> Result<SigningKind> {
        let state = self
            .state(modality)
            .ok_or_else(|| MarketError::UnknownMarketState(modality.to_lowercase()))?;
        Ok(match state.phase {
            MarketPhase::PreSeason => SigningKind::FreeUnlimited,
            MarketPhase::RegularSeasonMarketOpen => SigningKind::FreeMidSeason,
            MarketPhase::RegularSeasonMarketClosed => SigningKind::QuotaLimited,
        })
    }

    /// Fails without touching state when the global mid-season allowance is
    /// used up.
    pub fn check_mid_season_quota(&self, modality: &str) -> Result<()> {
        let limit = self.catalogue.mid_season_free_limit();
        let state = self
            .state(modality)
            .ok_or_else(|| MarketError::UnknownMarketState(modality.to_lowercase()))?;
        if state.mid_season_free_signings_used >= limit {
            return Err(MarketError::MidSeasonQuotaExceeded {
                modality: modality.to_lowercase(),
                limit,
            });
        }
        Ok(())
    }

    /// Consumes one mid-season free signing, returning the new counter.
    pub async fn consume_mid_season_free_signing(&mut self, modality: &str) -> Result<u32> {
        self.check_mid_season_quota(modality)?;
        let state = self.state_mut(modality)?;
        state.mid_season_free_signings_used += 1;
        let used = state.mid_season_free_signings_used;
        self.persist().await?;
        Ok(used)
    }
}
