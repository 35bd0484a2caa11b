pub mod catalogue;

use crate::domain::model::PlayerRole;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// One invocation performs one workflow operation against the durable
/// documents under `--data-dir`, acting as `--actor`.
#[derive(Debug, Parser)]
#[command(name = "transfer-desk")]
#[command(about = "Roster and transfer-market workflow engine for chat-community leagues")]
pub struct Cli {
    #[arg(long, default_value = "./data")]
    pub data_dir: PathBuf,

    #[arg(long, default_value = "catalogue.toml")]
    pub catalogue: PathBuf,

    #[arg(long, help = "Member id performing the command")]
    pub actor: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit structured JSON logs")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the teams enrolled in a modality
    Team {
        #[command(subcommand)]
        action: TeamAction,
    },
    /// Inspect or administer a team roster
    Roster {
        #[command(subcommand)]
        action: RosterAction,
    },
    /// Drive a signing request through its lifecycle
    Sign {
        #[command(subcommand)]
        action: SignAction,
    },
    /// Remove a player from a roster (captain or official)
    Dismiss {
        modality: String,
        team: String,
        player: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Leave whichever team the acting member is enrolled in
    Leave {
        #[arg(long)]
        reason: Option<String>,
    },
    /// Set or clear a player's leadership role
    Role {
        modality: String,
        team: String,
        player: String,
        #[arg(help = "captain, vice-captain, or omit to clear")]
        role: Option<PlayerRole>,
    },
    /// Grant extra signing articles to a team (official only)
    GrantArticles {
        modality: String,
        team: String,
        amount: u32,
    },
    /// Open or close the transfer market (official only)
    Market {
        #[command(subcommand)]
        action: MarketAction,
    },
    /// Season boundaries (official only)
    Season {
        #[command(subcommand)]
        action: SeasonAction,
    },
    /// Show the market state and pending requests of a modality
    Info { modality: String },
    /// Show which team a member is enrolled in
    Player { id: String },
}

#[derive(Debug, Subcommand)]
pub enum TeamAction {
    Create { modality: String, name: String },
    Delete { modality: String, name: String },
}

#[derive(Debug, Subcommand)]
pub enum RosterAction {
    Show {
        modality: String,
        team: String,
    },
    /// Wipe the roster and article counter (official only)
    Reset {
        modality: String,
        team: String,
    },
    /// Replace the roster wholesale from a list of chat mentions
    Sync {
        modality: String,
        team: String,
        #[arg(help = "Raw message text containing <@id> mentions")]
        mentions: String,
        #[arg(long, help = "Also overwrite the used-article counter")]
        articles_used: Option<u32>,
    },
    /// Remember which rendered message shows this roster
    SetMessage {
        modality: String,
        team: String,
        channel_id: String,
        message_id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum SignAction {
    /// Open a signing request for a target member
    Request {
        modality: String,
        team: String,
        target: String,
        #[arg(long, help = "Display name to roster the target under")]
        target_name: String,
        #[arg(long, help = "Leadership role the signing proposes")]
        role: Option<PlayerRole>,
    },
    /// Answer a request as its target
    Respond {
        id: String,
        #[arg(value_parser = ["accept", "reject"])]
        decision: String,
    },
    /// Confirm an accepted request as an official
    Confirm { id: String },
    /// Withdraw a request before it is confirmed
    Cancel { id: String },
}

#[derive(Debug, Subcommand)]
pub enum MarketAction {
    Open { modality: String },
    Close { modality: String },
}

#[derive(Debug, Subcommand)]
pub enum SeasonAction {
    Start { modality: String },
    End { modality: String },
}
