use clap::Parser;
use transfer_desk::adapters::oracle::ConfigOracle;
use transfer_desk::adapters::webhook::{TracingSink, WebhookSink};
use transfer_desk::config::{
    Cli, Command, MarketAction, RosterAction, SeasonAction, SignAction, TeamAction,
};
use transfer_desk::domain::model::{ActorId, MessageRef, PlayerEntry, RequestId};
use transfer_desk::domain::ports::NotificationSink;
use transfer_desk::utils::validation::parse_player_mentions;
use transfer_desk::utils::{error::MarketError, logger};
use transfer_desk::{
    Catalogue, FileDocumentStore, MarketStateStore, PendingSigningRegistry, Result, RosterStore,
    SigningWorkflow,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    if let Err(e) = run(cli).await {
        tracing::error!("command failed: {e}");
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
    Ok(())
}

fn require_official(catalogue: &Catalogue, actor: &ActorId, action: &str) -> Result<()> {
    if catalogue
        .league
        .officials
        .iter()
        .any(|o| o == actor.as_str())
    {
        return Ok(());
    }
    Err(MarketError::Unauthorized {
        actor: actor.to_string(),
        action: action.to_string(),
    })
}

/// Targets arrive either as a raw member id or as a chat mention.
fn parse_target(raw: &str) -> Result<ActorId> {
    if raw.contains('<') {
        let mut ids = parse_player_mentions(raw)?;
        Ok(ids.remove(0))
    } else {
        Ok(ActorId::new(raw))
    }
}

async fn run(cli: Cli) -> Result<()> {
    let catalogue = Catalogue::from_path(&cli.catalogue)?;
    let actor = ActorId::new(cli.actor.as_str());
    tracing::debug!(actor = %actor, data_dir = %cli.data_dir.display(), "loading documents");

    let store = FileDocumentStore::new(&cli.data_dir);
    let roster = RosterStore::load(store.clone(), catalogue.clone()).await?;
    let market = MarketStateStore::load(store.clone(), catalogue.clone()).await?;
    let pending = PendingSigningRegistry::load(store).await?;

    let oracle = ConfigOracle::new(&catalogue.league.officials, roster.document().clone());
    let sink: Box<dyn NotificationSink> = match &catalogue.league.webhook_url {
        Some(url) => Box::new(WebhookSink::new(url)?),
        None => Box::new(TracingSink),
    };
    let mut workflow = SigningWorkflow::new(roster, market, pending, oracle, sink);

    match cli.command {
        Command::Team { action } => match action {
            TeamAction::Create { modality, name } => {
                require_official(&catalogue, &actor, "create teams")?;
                workflow.roster_mut().create_team(&modality, &name).await?;
                println!("✅ Team '{name}' created in {modality}");
            }
            TeamAction::Delete { modality, name } => {
                require_official(&catalogue, &actor, "delete teams")?;
                workflow.roster_mut().delete_team(&modality, &name).await?;
                println!("✅ Team '{name}' deleted from {modality}");
            }
        },
        Command::Roster { action } => match action {
            RosterAction::Show { modality, team } => {
                let snapshot = workflow.roster().snapshot(&modality, &team)?;
                println!(
                    "📋 {} [{}]: {}/{} players, articles {}/{}",
                    snapshot.team,
                    snapshot.modality,
                    snapshot.players.len(),
                    snapshot.max_roster_size,
                    snapshot.articles_used,
                    snapshot.article_limit,
                );
                for player in &snapshot.players {
                    let role = player
                        .role
                        .map(|r| format!(" ({r})"))
                        .unwrap_or_default();
                    println!("  - {}{role}", player.display_name);
                }
            }
            RosterAction::Reset { modality, team } => {
                workflow.reset_roster(&actor, &modality, &team).await?;
                println!("✅ Roster of '{team}' reset");
            }
            RosterAction::Sync {
                modality,
                team,
                mentions,
                articles_used,
            } => {
                require_official(&catalogue, &actor, "sync rosters")?;
                let canonical = workflow.roster().resolve_team(&modality, &team)?;
                let players: Vec<PlayerEntry> = parse_player_mentions(&mentions)?
                    .into_iter()
                    .map(|id| PlayerEntry {
                        display_name: id.to_string(),
                        id,
                        role: None,
                        signing_kind: None,
                    })
                    .collect();
                let count = players.len();
                workflow
                    .roster_mut()
                    .sync_roster(&modality, &canonical, players, articles_used)
                    .await?;
                println!("✅ Roster of '{canonical}' synced with {count} players");
            }
            RosterAction::SetMessage {
                modality,
                team,
                channel_id,
                message_id,
            } => {
                require_official(&catalogue, &actor, "set roster messages")?;
                workflow
                    .roster_mut()
                    .set_roster_message(
                        &modality,
                        &team,
                        MessageRef {
                            channel_id,
                            message_id,
                        },
                    )
                    .await?;
                println!("✅ Roster message recorded");
            }
        },
        Command::Sign { action } => match action {
            SignAction::Request {
                modality,
                team,
                target,
                target_name,
                role,
            } => {
                let target = parse_target(&target)?;
                let request = workflow
                    .create(
                        &actor,
                        &target,
                        &target_name,
                        &catalogue.league.guild_id,
                        &modality,
                        &team,
                        role,
                    )
                    .await?;
                println!("✅ Signing request {} awaits {}'s answer", request.id, target_name);
            }
            SignAction::Respond { id, decision } => {
                let id = RequestId::from(id.as_str());
                let accepted = decision == "accept";
                workflow.respond(&id, &actor, accepted).await?;
                if accepted {
                    println!("✅ Request {id} accepted, awaiting an official");
                } else {
                    println!("✅ Request {id} rejected");
                }
            }
            SignAction::Confirm { id } => {
                let id = RequestId::from(id.as_str());
                let confirmed = workflow.confirm(&id, &actor).await?;
                println!(
                    "✅ {} joins '{}' as a {} signing",
                    confirmed.request.target_name, confirmed.team, confirmed.kind,
                );
            }
            SignAction::Cancel { id } => {
                let id = RequestId::from(id.as_str());
                let request = workflow.cancel(&id, &actor).await?;
                println!("✅ Request for {} withdrawn", request.target_name);
            }
        },
        Command::Dismiss {
            modality,
            team,
            player,
            reason,
        } => {
            let player = parse_target(&player)?;
            let entry = workflow
                .dismiss_player(&actor, &modality, &team, &player, reason)
                .await?;
            println!("✅ {} dismissed from '{team}'", entry.display_name);
        }
        Command::Leave { reason } => {
            let entry = workflow.leave_team(&actor, reason).await?;
            println!("✅ {} left the team", entry.display_name);
        }
        Command::Role {
            modality,
            team,
            player,
            role,
        } => {
            let player = parse_target(&player)?;
            let (_, new) = workflow
                .change_role(&actor, &modality, &team, &player, role)
                .await?;
            match new {
                Some(role) => println!("✅ {player} is now {role}"),
                None => println!("✅ {player}'s leadership role cleared"),
            }
        }
        Command::GrantArticles {
            modality,
            team,
            amount,
        } => {
            require_official(&catalogue, &actor, "grant articles")?;
            let remaining = workflow
                .roster_mut()
                .grant_articles(&modality, &team, amount)
                .await?;
            println!("✅ Granted {amount} article(s); used counter now {remaining}");
        }
        Command::Market { action } => {
            let (modality, opening) = match action {
                MarketAction::Open { modality } => (modality, true),
                MarketAction::Close { modality } => (modality, false),
            };
            require_official(&catalogue, &actor, "administer the market")?;
            workflow.market_mut().ensure_modality(&modality).await?;
            let state = if opening {
                workflow.market_mut().open_market(&modality).await?
            } else {
                workflow.market_mut().close_market(&modality).await?
            };
            println!("✅ Market of {modality} is now: {}", state.phase);
        }
        Command::Season { action } => {
            let (modality, starting) = match action {
                SeasonAction::Start { modality } => (modality, true),
                SeasonAction::End { modality } => (modality, false),
            };
            require_official(&catalogue, &actor, "administer the season")?;
            workflow.market_mut().ensure_modality(&modality).await?;
            let state = if starting {
                workflow.market_mut().start_season(&modality).await?
            } else {
                workflow.market_mut().end_season(&modality).await?
            };
            println!("✅ Season boundary applied; {modality} is now: {}", state.phase);
        }
        Command::Info { modality } => {
            let state = workflow
                .market()
                .state(&modality)
                .ok_or_else(|| MarketError::UnknownModality(modality.clone()))?;
            println!("📈 {modality}: {}", state.phase);
            println!(
                "   mid-season free signings used: {}/{}",
                state.mid_season_free_signings_used,
                catalogue.mid_season_free_limit(),
            );
            println!("   season started: {}", state.season_start_date);

            let teams = workflow.roster().team_names(&modality)?;
            if teams.is_empty() {
                println!("   no teams enrolled");
            } else {
                println!("   teams: {}", teams.join(", "));
            }

            let pending: Vec<_> = workflow
                .pending()
                .iter()
                .filter(|r| r.modality.eq_ignore_ascii_case(&modality))
                .collect();
            if pending.is_empty() {
                println!("   no pending signing requests");
            } else {
                println!("   pending signing requests:");
                for request in pending {
                    println!(
                        "   - {} for '{}' [{}]: {}",
                        request.target_name, request.team, request.id, request.state,
                    );
                }
            }
        }
        Command::Player { id } => {
            let player = parse_target(&id)?;
            match workflow.roster().find_player(&player) {
                Some(location) => {
                    let role = location
                        .entry
                        .role
                        .map(|r| format!(" as {r}"))
                        .unwrap_or_default();
                    println!(
                        "👤 {} plays for '{}' [{}]{role}",
                        location.entry.display_name, location.team, location.modality,
                    );
                }
                None => println!("👤 {player} is not enrolled in any team"),
            }
        }
    }

    Ok(())
}
