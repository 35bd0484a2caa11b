use crate::config::catalogue::Catalogue;
use crate::core::{load_document, persist_document, DocumentStore, LEAGUE_DOCUMENT};
use crate::domain::model::{
    ActorId, LeagueDocument, MessageRef, ModalityRecord, PlayerEntry, PlayerLocation, PlayerRole,
    RosterSnapshot, SigningKind, TeamRecord,
};
use crate::utils::error::{MarketError, Result};

/// Authoritative per-modality team rosters with their consumed article
/// counters. Every mutator persists the whole league document before
/// returning; lookups are case-insensitive on team names and hand back the
/// canonical stored name so one operation resolves it exactly once.
pub struct RosterStore<D: DocumentStore> {
    store: D,
    catalogue: Catalogue,
    doc: LeagueDocument,
}

impl<D: DocumentStore> RosterStore<D> {
    /// Loads the league document, seeding an empty record for every
    /// catalogued modality the document does not know yet.
    pub async fn load(store: D, catalogue: Catalogue) -> Result<Self> {
        let mut doc: LeagueDocument = load_document(&store, LEAGUE_DOCUMENT)
            .await?
            .unwrap_or_default();

        let mut seeded = false;
        for rules in &catalogue.modalities {
            if !doc.modalities.contains_key(&rules.key()) {
                doc.modalities.insert(rules.key(), ModalityRecord::default());
                seeded = true;
            }
        }
        if seeded {
            persist_document(&store, LEAGUE_DOCUMENT, &doc).await?;
            tracing::info!("league document seeded with new modalities");
        }

        Ok(Self {
            store,
            catalogue,
            doc,
        })
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn document(&self) -> &LeagueDocument {
        &self.doc
    }

    async fn persist(&self) -> Result<()> {
        persist_document(&self.store, LEAGUE_DOCUMENT, &self.doc).await
    }

    fn modality_key(&self, modality: &str) -> Result<String> {
        Ok(self.catalogue.require(modality)?.key())
    }

    fn record(&self, key: &str) -> Result<&ModalityRecord> {
        self.doc
            .modalities
            .get(key)
            .ok_or_else(|| MarketError::UnknownModality(key.to_string()))
    }

    fn canonical_in(record: &ModalityRecord, team: &str) -> Option<String> {
        record
            .teams
            .keys()
            .find(|name| name.eq_ignore_ascii_case(team))
            .cloned()
    }

    /// Resolves `(modality, team)` to the canonical stored team name.
    pub fn resolve_team(&self, modality: &str, team: &str) -> Result<String> {
        let key = self.modality_key(modality)?;
        let record = self.record(&key)?;
        Self::canonical_in(record, team).ok_or_else(|| MarketError::TeamNotFound {
            modality: key,
            team: team.to_string(),
        })
    }

    fn team(&self, modality: &str, team: &str) -> Result<(String, &TeamRecord)> {
        let key = self.modality_key(modality)?;
        let canonical = self.resolve_team(modality, team)?;
        let record = self
            .record(&key)?
            .teams
            .get(&canonical)
            .ok_or_else(|| MarketError::TeamNotFound {
                modality: key.clone(),
                team: canonical.clone(),
            })?;
        Ok((canonical, record))
    }

    fn team_mut(&mut self, modality: &str, team: &str) -> Result<(String, &mut TeamRecord)> {
        let key = self.modality_key(modality)?;
        let canonical = self.resolve_team(modality, team)?;
        let record = self
            .doc
            .modalities
            .get_mut(&key)
            .and_then(|m| m.teams.get_mut(&canonical))
            .ok_or_else(|| MarketError::TeamNotFound {
                modality: key.clone(),
                team: canonical.clone(),
            })?;
        Ok((canonical, record))
    }

    pub async fn create_team(&mut self, modality: &str, team: &str) -> Result<()> {
        let key = self.modality_key(modality)?;
        if Self::canonical_in(self.record(&key)?, team).is_some() {
            return Err(MarketError::TeamAlreadyExists {
                modality: key,
                team: team.to_string(),
            });
        }
        self.doc
            .modalities
            .get_mut(&key)
            .ok_or(MarketError::UnknownModality(key.clone()))?
            .teams
            .insert(team.to_string(), TeamRecord::default());
        self.persist().await
    }

    pub async fn delete_team(&mut self, modality: &str, team: &str) -> Result<()> {
        let key = self.modality_key(modality)?;
        let canonical = self.resolve_team(modality, team)?;
        self.doc
            .modalities
            .get_mut(&key)
            .ok_or(MarketError::UnknownModality(key.clone()))?
            .teams
            .remove(&canonical);
        self.persist().await
    }

    /// Fails without touching state when the roster is full.
    pub fn check_capacity(&self, modality: &str, team: &str) -> Result<()> {
        let limit = self.catalogue.require(modality)?.max_roster_size;
        let (canonical, record) = self.team(modality, team)?;
        if record.players.len() >= limit {
            return Err(MarketError::CapacityExceeded {
                team: canonical,
                limit,
            });
        }
        Ok(())
    }

    /// Fails without touching state when the team has no article left.
    pub fn check_article_quota(&self, modality: &str, team: &str) -> Result<()> {
        let limit = self.catalogue.require(modality)?.article_limit;
        let (canonical, record) = self.team(modality, team)?;
        if record.articles_used >= limit {
            return Err(MarketError::QuotaExceeded {
                team: canonical,
                limit,
            });
        }
        Ok(())
    }

    /// Appends a player, consuming one article when the signing is
    /// quota-limited. Capacity and quota are re-checked here so the store
    /// holds its own invariants regardless of the caller.
    pub async fn add_player(&mut self, modality: &str, team: &str, entry: PlayerEntry) -> Result<()> {
        self.check_capacity(modality, team)?;
        if entry.signing_kind == Some(SigningKind::QuotaLimited) {
            self.check_article_quota(modality, team)?;
        }

        let (_, record) = self.team_mut(modality, team)?;
        if entry.signing_kind == Some(SigningKind::QuotaLimited) {
            record.articles_used += 1;
        }
        record.players.push(entry);
        self.persist().await
    }

    /// Removes a player. Articles already spent on the signing stay spent;
    /// quota consumption is season-scoped and never refunded by a dismissal.
    pub async fn remove_player(
        &mut self,
        modality: &str,
        team: &str,
        player: &ActorId,
    ) -> Result<PlayerEntry> {
        let (canonical, record) = self.team_mut(modality, team)?;
        let index = record
            .players
            .iter()
            .position(|p| &p.id == player)
            .ok_or_else(|| MarketError::PlayerNotFound {
                player: player.to_string(),
                team: canonical.clone(),
            })?;
        let entry = record.players.remove(index);
        self.persist().await?;
        Ok(entry)
    }

    /// Overwrites a player's role, returning `(old, new)` for audit logging.
    pub async fn set_role(
        &mut self,
        modality: &str,
        team: &str,
        player: &ActorId,
        role: Option<PlayerRole>,
    ) -> Result<(Option<PlayerRole>, Option<PlayerRole>)> {
        let (canonical, record) = self.team_mut(modality, team)?;
        let entry = record
            .players
            .iter_mut()
            .find(|p| &p.id == player)
            .ok_or_else(|| MarketError::PlayerNotFound {
                player: player.to_string(),
                team: canonical.clone(),
            })?;
        let old = entry.role;
        entry.role = role;
        self.persist().await?;
        Ok((old, role))
    }

    /// Clears the player list and article counter for a fresh season.
    /// Irreversible.
    pub async fn reset_roster(&mut self, modality: &str, team: &str) -> Result<()> {
        let (_, record) = self.team_mut(modality, team)?;
        record.players.clear();
        record.articles_used = 0;
        self.persist().await
    }

    /// Wholesale replacement of the player list for a manual correction,
    /// optionally overriding the article counter directly.
    pub async fn sync_roster(
        &mut self,
        modality: &str,
        team: &str,
        players: Vec<PlayerEntry>,
        articles_used: Option<u32>,
    ) -> Result<()> {
        let (_, record) = self.team_mut(modality, team)?;
        record.players = players;
        if let Some(used) = articles_used {
            record.articles_used = used;
        }
        self.persist().await
    }

    /// Grants `amount` extra articles by lowering the consumed counter,
    /// floored at zero. Returns the new counter.
    pub async fn grant_articles(&mut self, modality: &str, team: &str, amount: u32) -> Result<u32> {
        let (_, record) = self.team_mut(modality, team)?;
        record.articles_used = record.articles_used.saturating_sub(amount);
        let used = record.articles_used;
        self.persist().await?;
        Ok(used)
    }

    pub async fn set_roster_message(
        &mut self,
        modality: &str,
        team: &str,
        message: MessageRef,
    ) -> Result<()> {
        let (_, record) = self.team_mut(modality, team)?;
        record.roster_message = Some(message);
        self.persist().await
    }

    /// League-wide lookup: the one team a player is enrolled in, if any.
    pub fn find_player(&self, player: &ActorId) -> Option<PlayerLocation> {
        for (modality, record) in &self.doc.modalities {
            for (team, team_record) in &record.teams {
                if let Some(entry) = team_record.players.iter().find(|p| &p.id == player) {
                    return Some(PlayerLocation {
                        modality: modality.clone(),
                        team: team.clone(),
                        entry: entry.clone(),
                    });
                }
            }
        }
        None
    }

    pub fn is_captain(&self, modality: &str, team: &str, actor: &ActorId) -> bool {
        self.team(modality, team)
            .map(|(_, record)| {
                record
                    .players
                    .iter()
                    .any(|p| &p.id == actor && p.role == Some(PlayerRole::Captain))
            })
            .unwrap_or(false)
    }

    pub fn team_names(&self, modality: &str) -> Result<Vec<String>> {
        let key = self.modality_key(modality)?;
        Ok(self.record(&key)?.teams.keys().cloned().collect())
    }

    /// Render-ready copy of one roster with its catalogue limits attached.
    pub fn snapshot(&self, modality: &str, team: &str) -> Result<RosterSnapshot> {
        let rules = self.catalogue.require(modality)?;
        let (canonical, record) = self.team(modality, team)?;
        Ok(RosterSnapshot {
            modality: rules.key(),
            team: canonical,
            players: record.players.clone(),
            articles_used: record.articles_used,
            article_limit: rules.article_limit,
            max_roster_size: rules.max_roster_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::DocumentStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MemoryStore {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    #[async_trait]
    impl DocumentStore for MemoryStore {
        async fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.files.lock().await.get(name).cloned())
        }

        async fn save(&self, name: &str, bytes: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(name.to_string(), bytes.to_vec());
            Ok(())
        }
    }

    fn catalogue() -> Catalogue {
        Catalogue::from_toml(
            r#"
            [league]

            [[modality]]
            name = "bigger5"
            max_roster_size = 3
            article_limit = 2
            "#,
        )
        .unwrap()
    }

    fn entry(id: &str, kind: Option<SigningKind>) -> PlayerEntry {
        PlayerEntry {
            id: ActorId::new(id),
            display_name: format!("player-{id}"),
            role: None,
            signing_kind: kind,
        }
    }

    async fn store_with_team() -> RosterStore<MemoryStore> {
        let mut roster = RosterStore::load(MemoryStore::default(), catalogue())
            .await
            .unwrap();
        roster.create_team("bigger5", "Lobos").await.unwrap();
        roster
    }

    #[tokio::test]
    async fn test_create_team_rejects_case_insensitive_duplicate() {
        let mut roster = store_with_team().await;
        let err = roster.create_team("BIGGER5", "lobos").await.unwrap_err();
        assert!(matches!(err, MarketError::TeamAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_delete_unknown_team() {
        let mut roster = store_with_team().await;
        assert!(matches!(
            roster.delete_team("bigger5", "Pumas").await.unwrap_err(),
            MarketError::TeamNotFound { .. }
        ));
        assert_eq!(roster.team_names("bigger5").unwrap(), vec!["Lobos"]);
        roster.delete_team("bigger5", "LOBOS").await.unwrap();
        assert!(roster.resolve_team("bigger5", "Lobos").is_err());
        assert!(roster.team_names("bigger5").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_capacity_limit_holds() {
        let mut roster = store_with_team().await;
        for i in 0..3 {
            roster
                .add_player("bigger5", "Lobos", entry(&i.to_string(), None))
                .await
                .unwrap();
        }

        let err = roster
            .add_player("bigger5", "Lobos", entry("overflow", None))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::CapacityExceeded { limit: 3, .. }));

        let snapshot = roster.snapshot("bigger5", "Lobos").unwrap();
        assert_eq!(snapshot.players.len(), 3);
    }

    #[tokio::test]
    async fn test_article_quota_consumed_and_enforced() {
        let mut roster = store_with_team().await;
        roster
            .add_player("bigger5", "Lobos", entry("1", Some(SigningKind::QuotaLimited)))
            .await
            .unwrap();
        roster
            .add_player("bigger5", "Lobos", entry("2", Some(SigningKind::QuotaLimited)))
            .await
            .unwrap();

        let err = roster
            .add_player("bigger5", "Lobos", entry("3", Some(SigningKind::QuotaLimited)))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::QuotaExceeded { limit: 2, .. }));

        // Free signings are still possible with the quota exhausted.
        roster
            .add_player("bigger5", "Lobos", entry("3", Some(SigningKind::FreeUnlimited)))
            .await
            .unwrap();
        assert_eq!(roster.snapshot("bigger5", "Lobos").unwrap().articles_used, 2);
    }

    #[tokio::test]
    async fn test_remove_player_keeps_articles_spent() {
        let mut roster = store_with_team().await;
        roster
            .add_player("bigger5", "Lobos", entry("1", Some(SigningKind::QuotaLimited)))
            .await
            .unwrap();

        let removed = roster
            .remove_player("bigger5", "lobos", &ActorId::new("1"))
            .await
            .unwrap();
        assert_eq!(removed.id, ActorId::new("1"));

        let snapshot = roster.snapshot("bigger5", "Lobos").unwrap();
        assert!(snapshot.players.is_empty());
        assert_eq!(snapshot.articles_used, 1);

        let err = roster
            .remove_player("bigger5", "Lobos", &ActorId::new("1"))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::PlayerNotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_role_returns_old_and_new() {
        let mut roster = store_with_team().await;
        roster
            .add_player("bigger5", "Lobos", entry("1", None))
            .await
            .unwrap();

        let (old, new) = roster
            .set_role("bigger5", "Lobos", &ActorId::new("1"), Some(PlayerRole::Captain))
            .await
            .unwrap();
        assert_eq!(old, None);
        assert_eq!(new, Some(PlayerRole::Captain));
        assert!(roster.is_captain("bigger5", "Lobos", &ActorId::new("1")));

        let (old, new) = roster
            .set_role("bigger5", "Lobos", &ActorId::new("1"), None)
            .await
            .unwrap();
        assert_eq!(old, Some(PlayerRole::Captain));
        assert_eq!(new, None);
    }

    #[tokio::test]
    async fn test_reset_roster_clears_players_and_articles() {
        let mut roster = store_with_team().await;
        roster
            .add_player("bigger5", "Lobos", entry("1", Some(SigningKind::QuotaLimited)))
            .await
            .unwrap();

        roster.reset_roster("bigger5", "Lobos").await.unwrap();
        let snapshot = roster.snapshot("bigger5", "Lobos").unwrap();
        assert!(snapshot.players.is_empty());
        assert_eq!(snapshot.articles_used, 0);
    }

    #[tokio::test]
    async fn test_sync_roster_replaces_wholesale() {
        let mut roster = store_with_team().await;
        roster
            .add_player("bigger5", "Lobos", entry("old", None))
            .await
            .unwrap();

        roster
            .sync_roster(
                "bigger5",
                "Lobos",
                vec![entry("a", None), entry("b", None)],
                Some(1),
            )
            .await
            .unwrap();

        let snapshot = roster.snapshot("bigger5", "Lobos").unwrap();
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.articles_used, 1);
        assert!(roster.find_player(&ActorId::new("old")).is_none());
    }

    #[tokio::test]
    async fn test_grant_articles_floors_at_zero() {
        let mut roster = store_with_team().await;
        roster
            .sync_roster("bigger5", "Lobos", vec![], Some(2))
            .await
            .unwrap();

        assert_eq!(roster.grant_articles("bigger5", "Lobos", 1).await.unwrap(), 1);
        assert_eq!(roster.grant_articles("bigger5", "Lobos", 5).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_player_across_league() {
        let mut roster = store_with_team().await;
        roster.create_team("bigger5", "Pumas").await.unwrap();
        roster
            .add_player("bigger5", "Pumas", entry("77", None))
            .await
            .unwrap();

        let location = roster.find_player(&ActorId::new("77")).unwrap();
        assert_eq!(location.team, "Pumas");
        assert_eq!(location.modality, "bigger5");
        assert!(roster.find_player(&ActorId::new("78")).is_none());
    }

    #[tokio::test]
    async fn test_unknown_modality() {
        let mut roster = store_with_team().await;
        assert!(matches!(
            roster.create_team("hoops", "Lobos").await.unwrap_err(),
            MarketError::UnknownModality(_)
        ));
    }

    #[tokio::test]
    async fn test_survives_reload() {
        let store = MemoryStore::default();
        {
            let mut roster = RosterStore::load(store.clone(), catalogue()).await.unwrap();
            roster.create_team("bigger5", "Lobos").await.unwrap();
            roster
                .add_player("bigger5", "Lobos", entry("1", Some(SigningKind::QuotaLimited)))
                .await
                .unwrap();
        }

        let reloaded = RosterStore::load(store, catalogue()).await.unwrap();
        let snapshot = reloaded.snapshot("bigger5", "lobos").unwrap();
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.articles_used, 1);
    }
}
