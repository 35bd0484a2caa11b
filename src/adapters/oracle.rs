use crate::domain::model::{ActorId, LeagueDocument, PlayerRole};
use crate::domain::ports::AuthorizationOracle;
use std::collections::HashSet;

/// Authorization answers derived from the catalogue's officials list and a
/// snapshot of the league document taken at startup. One command runs per
/// process, so the snapshot cannot go stale mid-decision.
pub struct ConfigOracle {
    officials: HashSet<String>,
    league: LeagueDocument,
}

impl ConfigOracle {
    pub fn new(officials: &[String], league: LeagueDocument) -> Self {
        Self {
            officials: officials.iter().cloned().collect(),
            league,
        }
    }
}

impl AuthorizationOracle for ConfigOracle {
    fn is_official(&self, actor: &ActorId) -> bool {
        self.officials.contains(actor.as_str())
    }

    fn is_captain_of(&self, actor: &ActorId, modality: &str, team: &str) -> bool {
        let Some(record) = self.league.modalities.get(&modality.to_lowercase()) else {
            return false;
        };
        record
            .teams
            .iter()
            .filter(|(name, _)| name.eq_ignore_ascii_case(team))
            .flat_map(|(_, team)| &team.players)
            .any(|p| {
                &p.id == actor
                    && matches!(p.role, Some(PlayerRole::Captain) | Some(PlayerRole::ViceCaptain))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ModalityRecord, PlayerEntry, TeamRecord};

    fn league_with_captain() -> LeagueDocument {
        let mut league = LeagueDocument::default();
        let mut record = ModalityRecord::default();
        let mut team = TeamRecord::default();
        team.players.push(PlayerEntry {
            id: ActorId::new("100"),
            display_name: "cap".to_string(),
            role: Some(PlayerRole::Captain),
            signing_kind: None,
        });
        team.players.push(PlayerEntry {
            id: ActorId::new("200"),
            display_name: "bench".to_string(),
            role: None,
            signing_kind: None,
        });
        record.teams.insert("Lobos".to_string(), team);
        league.modalities.insert("bigger5".to_string(), record);
        league
    }

    #[test]
    fn test_officials_come_from_config() {
        let oracle = ConfigOracle::new(&["900".to_string()], LeagueDocument::default());
        assert!(oracle.is_official(&ActorId::new("900")));
        assert!(!oracle.is_official(&ActorId::new("100")));
    }

    #[test]
    fn test_captaincy_comes_from_league_snapshot() {
        let oracle = ConfigOracle::new(&[], league_with_captain());
        assert!(oracle.is_captain_of(&ActorId::new("100"), "bigger5", "lobos"));
        assert!(!oracle.is_captain_of(&ActorId::new("200"), "bigger5", "Lobos"));
        assert!(!oracle.is_captain_of(&ActorId::new("100"), "bigger5", "Pumas"));
        assert!(!oracle.is_captain_of(&ActorId::new("100"), "hoops", "Lobos"));
    }
}
