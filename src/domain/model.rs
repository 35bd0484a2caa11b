use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Chat-platform identity of a member (requester, target, official).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identifier of one signing request, stable for its whole lifetime.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Leadership role inside a roster. Plain players carry no role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerRole {
    #[serde(rename = "C")]
    Captain,
    #[serde(rename = "SC")]
    ViceCaptain,
}

impl fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerRole::Captain => f.write_str("captain"),
            PlayerRole::ViceCaptain => f.write_str("vice-captain"),
        }
    }
}

impl std::str::FromStr for PlayerRole {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "c" | "captain" => Ok(PlayerRole::Captain),
            "sc" | "vice-captain" | "vicecaptain" => Ok(PlayerRole::ViceCaptain),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// How a confirmed signing counts against the season rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningKind {
    /// Pre-season signing, only bounded by roster capacity.
    FreeUnlimited,
    /// Mid-season open-market signing, bounded by the global free-signing counter.
    FreeMidSeason,
    /// "Article" signing while the market is closed, bounded per team.
    QuotaLimited,
}

impl fmt::Display for SigningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningKind::FreeUnlimited => f.write_str("free (pre-season)"),
            SigningKind::FreeMidSeason => f.write_str("free (mid-season)"),
            SigningKind::QuotaLimited => f.write_str("article"),
        }
    }
}

/// Correlation reference to a message rendered by the notification boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub id: ActorId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<PlayerRole>,
    /// Absent for rosters assembled through a manual sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_kind: Option<SigningKind>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub players: Vec<PlayerEntry>,
    pub articles_used: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster_message: Option<MessageRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ModalityRecord {
    pub teams: BTreeMap<String, TeamRecord>,
}

/// Whole persisted league document: every modality with its team rosters.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueDocument {
    pub modalities: BTreeMap<String, ModalityRecord>,
}

/// Season phase of one modality's transfer market.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketPhase {
    PreSeason,
    RegularSeasonMarketOpen,
    RegularSeasonMarketClosed,
}

impl fmt::Display for MarketPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketPhase::PreSeason => f.write_str("pre-season"),
            MarketPhase::RegularSeasonMarketOpen => f.write_str("regular season, market open"),
            MarketPhase::RegularSeasonMarketClosed => f.write_str("regular season, market closed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    pub phase: MarketPhase,
    pub mid_season_free_signings_used: u32,
    pub season_start_date: NaiveDate,
}

impl MarketState {
    pub fn new_pre_season(today: NaiveDate) -> Self {
        Self {
            phase: MarketPhase::PreSeason,
            mid_season_free_signings_used: 0,
            season_start_date: today,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketDocument {
    pub modalities: BTreeMap<String, MarketState>,
}

/// Where an in-flight signing request sits in the approval protocol.
/// Rejection and confirmation are terminal and delete the record instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    AwaitingTargetResponse,
    AwaitingOfficialConfirmation,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestState::AwaitingTargetResponse => f.write_str("awaiting target response"),
            RequestState::AwaitingOfficialConfirmation => {
                f.write_str("awaiting official confirmation")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingSigningRequest {
    pub id: RequestId,
    pub target_id: ActorId,
    pub target_name: String,
    pub requester_id: ActorId,
    pub guild_id: String,
    pub modality: String,
    pub team: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_role: Option<PlayerRole>,
    pub created_at: DateTime<Utc>,
    pub state: RequestState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_ref: Option<MessageRef>,
}

/// Result of a league-wide player lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerLocation {
    pub modality: String,
    pub team: String,
    pub entry: PlayerEntry,
}

/// Cloned, render-ready view of one roster with its catalogue limits.
#[derive(Clone, Debug, PartialEq)]
pub struct RosterSnapshot {
    pub modality: String,
    pub team: String,
    pub players: Vec<PlayerEntry>,
    pub articles_used: u32,
    pub article_limit: u32,
    pub max_roster_size: usize,
}
