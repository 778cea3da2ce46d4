use creature_arena::{
    AccountStore, ArenaConfig, ArenaResult, BattleRunner, MemoryAccountStore, MemoryBattleStore,
    MemoryCatalog, MemoryProgressStore, NewAccount, ProgressStore, RecordId,
};
use std::path::Path;
use tracing_subscriber::EnvFilter;

const SEED_CATALOG: &str = include_str!("../data/catalog.ron");

/// Upper bound on rounds, in case both sides keep missing.
const MAX_ROUNDS: usize = 500;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let creature = std::env::args().nth(1).unwrap_or_else(|| "c-025".to_string());
    if let Err(e) = run_demo(RecordId::new(creature)).await {
        println!("Error running demo battle: {}", e);
    }
}

async fn run_demo(creature: RecordId) -> ArenaResult<()> {
    let config_path = Path::new("data/arena.ron");
    let config = if config_path.exists() {
        ArenaConfig::load(config_path)?
    } else {
        ArenaConfig::default()
    };
    let catalog = MemoryCatalog::from_ron_str(SEED_CATALOG)?;
    println!("Loaded {} creatures into the catalog", catalog.len().await);

    let runner = BattleRunner::new(
        MemoryAccountStore::new(),
        catalog,
        MemoryProgressStore::new(),
        MemoryBattleStore::new(),
        config,
    );
    let account_id = runner.accounts().create(NewAccount::named("demo")).await?.id;

    let mut session = runner.create_battle(account_id, &creature).await?;
    let mut rounds = 0;
    while !session.is_finished() && rounds < MAX_ROUNDS {
        session = runner.submit_action(session.id, "attack").await?;
        rounds += 1;
    }
    if !session.is_finished() {
        session = runner.surrender(session.id).await?;
    }

    println!();
    for line in &session.log {
        println!("  {}", line);
    }
    println!();
    println!(
        "Final HP: {} {}/{} vs {} {}/{}",
        session.player.name(),
        session.player.current_hp(),
        session.player.max_hp(),
        session.computer.name(),
        session.computer.current_hp(),
        session.computer.max_hp()
    );

    if let Some(account) = runner.accounts().get(account_id).await? {
        println!("Record: {} wins, {} losses", account.wins, account.losses);
    }
    for record in runner.progress().get_all_for_account(account_id).await? {
        println!(
            "  {} -> level {} ({} wins)",
            record.species, record.level, record.wins
        );
    }
    Ok(())
}
