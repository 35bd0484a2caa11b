use httpmock::prelude::*;
use tempfile::TempDir;
use transfer_desk::adapters::oracle::ConfigOracle;
use transfer_desk::adapters::webhook::{TracingSink, WebhookSink};
use transfer_desk::domain::model::{ActorId, MarketPhase, RequestId, SigningKind};
use transfer_desk::domain::ports::NotificationSink;
use transfer_desk::{
    Catalogue, FileDocumentStore, MarketStateStore, PendingSigningRegistry, RosterStore,
    SigningWorkflow,
};

const OFFICIAL: &str = "900";
const TARGET: &str = "555";

fn catalogue() -> Catalogue {
    Catalogue::from_toml(
        r#"
        [league]
        guild_id = "g1"
        mid_season_free_limit = 2
        officials = ["900"]

        [[modality]]
        name = "bigger5"
        max_roster_size = 10
        article_limit = 4
        "#,
    )
    .unwrap()
}

type Desk = SigningWorkflow<FileDocumentStore, ConfigOracle, Box<dyn NotificationSink>>;

/// Rebuilds the whole stack from the durable documents, the way each CLI
/// invocation does.
async fn desk(dir: &TempDir) -> Desk {
    let catalogue = catalogue();
    let store = FileDocumentStore::new(dir.path());
    let roster = RosterStore::load(store.clone(), catalogue.clone())
        .await
        .unwrap();
    let market = MarketStateStore::load(store.clone(), catalogue.clone())
        .await
        .unwrap();
    let pending = PendingSigningRegistry::load(store).await.unwrap();
    let oracle = ConfigOracle::new(&catalogue.league.officials, roster.document().clone());
    let sink: Box<dyn NotificationSink> = Box::new(TracingSink);
    SigningWorkflow::new(roster, market, pending, oracle, sink)
}

#[tokio::test]
async fn test_signing_lifecycle_survives_process_restarts() {
    let dir = TempDir::new().unwrap();
    let official = ActorId::new(OFFICIAL);
    let target = ActorId::new(TARGET);

    // Invocation 1: set up the team and open the request.
    let mut wf = desk(&dir).await;
    wf.roster_mut().create_team("bigger5", "Lobos").await.unwrap();
    let request = wf
        .create(&official, &target, "newcomer", "g1", "bigger5", "lobos", None)
        .await
        .unwrap();
    let id: RequestId = request.id.clone();
    drop(wf);

    // Invocation 2: the target answers after a fresh load from disk.
    let mut wf = desk(&dir).await;
    assert_eq!(wf.pending().len(), 1);
    wf.respond(&id, &target, true).await.unwrap();
    drop(wf);

    // Invocation 3: an official confirms, again from a fresh load.
    let mut wf = desk(&dir).await;
    let confirmed = wf.confirm(&id, &official).await.unwrap();
    assert_eq!(confirmed.kind, SigningKind::FreeUnlimited);
    drop(wf);

    // Invocation 4: the roster change is durable and the request is gone.
    let wf = desk(&dir).await;
    let snapshot = wf.roster().snapshot("bigger5", "Lobos").unwrap();
    assert_eq!(snapshot.players.len(), 1);
    assert_eq!(snapshot.players[0].id, target);
    assert!(wf.pending().is_empty());
}

#[tokio::test]
async fn test_market_phases_and_quotas_survive_restarts() {
    let dir = TempDir::new().unwrap();
    let official = ActorId::new(OFFICIAL);

    let mut wf = desk(&dir).await;
    wf.roster_mut().create_team("bigger5", "Lobos").await.unwrap();
    wf.market_mut().start_season("bigger5").await.unwrap();
    wf.market_mut().open_market("bigger5").await.unwrap();
    drop(wf);

    // Mid-season free signing consumes the global counter.
    let mut wf = desk(&dir).await;
    assert_eq!(
        wf.market().state("bigger5").unwrap().phase,
        MarketPhase::RegularSeasonMarketOpen
    );
    let request = wf
        .create(
            &official,
            &ActorId::new(TARGET),
            "newcomer",
            "g1",
            "bigger5",
            "Lobos",
            None,
        )
        .await
        .unwrap();
    wf.respond(&request.id, &ActorId::new(TARGET), true)
        .await
        .unwrap();
    let confirmed = wf.confirm(&request.id, &official).await.unwrap();
    assert_eq!(confirmed.kind, SigningKind::FreeMidSeason);
    drop(wf);

    // Counter and roster both persisted; ending the season resets the counter.
    let mut wf = desk(&dir).await;
    assert_eq!(
        wf.market()
            .state("bigger5")
            .unwrap()
            .mid_season_free_signings_used,
        1
    );
    wf.market_mut().end_season("bigger5").await.unwrap();
    drop(wf);

    let wf = desk(&dir).await;
    let state = wf.market().state("bigger5").unwrap();
    assert_eq!(state.phase, MarketPhase::PreSeason);
    assert_eq!(state.mid_season_free_signings_used, 0);
    assert_eq!(wf.roster().snapshot("bigger5", "Lobos").unwrap().players.len(), 1);
}

#[tokio::test]
async fn test_confirmed_signing_reaches_the_audit_webhook() {
    let dir = TempDir::new().unwrap();
    let official = ActorId::new(OFFICIAL);
    let target = ActorId::new(TARGET);

    let server = MockServer::start_async().await;
    let hook = server
        .mock_async(|when, then| {
            when.method(POST).path("/audit");
            then.status(204);
        })
        .await;

    let catalogue = catalogue();
    let store = FileDocumentStore::new(dir.path());
    let roster = RosterStore::load(store.clone(), catalogue.clone())
        .await
        .unwrap();
    let market = MarketStateStore::load(store.clone(), catalogue.clone())
        .await
        .unwrap();
    let pending = PendingSigningRegistry::load(store).await.unwrap();
    let oracle = ConfigOracle::new(&catalogue.league.officials, roster.document().clone());
    let sink = WebhookSink::new(&server.url("/audit")).unwrap();
    let mut wf = SigningWorkflow::new(roster, market, pending, oracle, sink);

    wf.roster_mut().create_team("bigger5", "Lobos").await.unwrap();
    let request = wf
        .create(&official, &target, "newcomer", "g1", "bigger5", "Lobos", None)
        .await
        .unwrap();
    wf.respond(&request.id, &target, true).await.unwrap();
    wf.confirm(&request.id, &official).await.unwrap();

    // Request, response, and confirmation each produced one audit post.
    hook.assert_hits_async(3).await;
}
