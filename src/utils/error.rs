use crate::domain::model::RequestState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("unknown modality: {0}")]
    UnknownModality(String),

    #[error("no market state recorded for modality {0}")]
    UnknownMarketState(String),

    #[error("team {team} not found in modality {modality}")]
    TeamNotFound { modality: String, team: String },

    #[error("team {team} already exists in modality {modality}")]
    TeamAlreadyExists { modality: String, team: String },

    #[error("player {player} is not in team {team}")]
    PlayerNotFound { player: String, team: String },

    #[error("player {player} is not enrolled in any team")]
    NotEnrolled { player: String },

    #[error("player {player} is already enrolled in team {team}")]
    PlayerAlreadyEnrolled { player: String, team: String },

    #[error("signing request {0} not found")]
    RequestNotFound(String),

    #[error("a signing request for {target} to team {team} is already pending")]
    DuplicateRequest { target: String, team: String },

    #[error("signing request {id} is {actual}, expected {expected}")]
    UnexpectedRequestState {
        id: String,
        expected: RequestState,
        actual: RequestState,
    },

    #[error("{actor} is not authorized to {action}")]
    Unauthorized { actor: String, action: String },

    #[error("roster of {team} is already at the limit of {limit} players")]
    CapacityExceeded { team: String, limit: usize },

    #[error("team {team} has used all {limit} article signings this season")]
    QuotaExceeded { team: String, limit: u32 },

    #[error("all {limit} mid-season free signings are used for modality {modality}")]
    MidSeasonQuotaExceeded { modality: String, limit: u32 },

    /// The in-memory mutation that triggered the write is kept; durability
    /// of the named document is unconfirmed.
    #[error("failed to persist document {document}: {source}")]
    PersistenceFailed {
        document: String,
        #[source]
        source: Box<MarketError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("validation error: {message}")]
    Validation { message: String },
}

pub type Result<T> = std::result::Result<T, MarketError>;
