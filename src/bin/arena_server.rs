//! Creature Arena stdio server
//!
//! Reads one JSON request per line from stdin and writes one JSON response
//! per line to stdout. All state lives in memory for the life of the process.
//!
//! Environment:
//! - `ARENA_CATALOG`: path to a RON creature list (defaults to the bundled seed catalog)
//! - `ARENA_CONFIG`: path to a RON config file (defaults to built-in values)
//! - `RUST_LOG`: tracing filter; diagnostics go to stderr

use creature_arena::{
    AccountId, AccountStore, ArenaConfig, ArenaError, ArenaResult, BattleId, BattleRunner,
    ErrorKind, MemoryAccountStore, MemoryBattleStore, MemoryCatalog, MemoryProgressStore,
    NewAccount, ProgressStore, RecordId,
};
use serde_json::{json, Value};
use std::error::Error;
use std::str::FromStr;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

const SEED_CATALOG: &str = include_str!("../../data/catalog.ron");

type MemoryRunner =
    BattleRunner<MemoryAccountStore, MemoryCatalog, MemoryProgressStore, MemoryBattleStore>;

struct ArenaServer {
    runner: MemoryRunner,
}

impl ArenaServer {
    fn from_env() -> ArenaResult<Self> {
        let config = match std::env::var("ARENA_CONFIG") {
            Ok(path) => ArenaConfig::load(path)?,
            Err(_) => ArenaConfig::default(),
        };
        let catalog = match std::env::var("ARENA_CATALOG") {
            Ok(path) => {
                let text = std::fs::read_to_string(&path)
                    .map_err(|e| ArenaError::Config(format!("{}: {}", path, e)))?;
                MemoryCatalog::from_ron_str(&text)?
            }
            Err(_) => MemoryCatalog::from_ron_str(SEED_CATALOG)?,
        };

        Ok(Self {
            runner: BattleRunner::new(
                MemoryAccountStore::new(),
                catalog,
                MemoryProgressStore::new(),
                MemoryBattleStore::new(),
                config,
            ),
        })
    }

    async fn handle_request(&self, method: &str, params: &Value) -> ArenaResult<Value> {
        match method {
            "create_account" => self.create_account(params).await,
            "create_battle" => {
                let account_id: AccountId = parse_id(params, "account_id")?;
                let creature_id = RecordId::new(params["creature_id"].as_str().unwrap_or(""));
                let session = self.runner.create_battle(account_id, &creature_id).await?;
                Ok(json!(session.view()))
            }
            "get_battle" => {
                let session = self.runner.battle_state(parse_id(params, "battle_id")?).await?;
                Ok(json!(session.view()))
            }
            "action" => {
                let id: BattleId = parse_id(params, "battle_id")?;
                let token = params["action"].as_str().unwrap_or("");
                let session = self.runner.submit_action(id, token).await?;
                Ok(json!(session.view()))
            }
            "surrender" => {
                let session = self.runner.surrender(parse_id(params, "battle_id")?).await?;
                Ok(json!(session.view()))
            }
            "progress" => {
                let account_id: AccountId = parse_id(params, "account_id")?;
                let records = self.runner.progress().get_all_for_account(account_id).await?;
                Ok(json!(records))
            }
            other => Err(ArenaError::UnknownAction(other.to_string())),
        }
    }

    async fn create_account(&self, params: &Value) -> ArenaResult<Value> {
        let username = params["username"].as_str().unwrap_or("").trim();
        if username.is_empty() {
            return Err(ArenaError::MissingIdentifier("username"));
        }
        let fields = NewAccount {
            username: username.to_string(),
            address: params["address"].as_str().map(str::to_string),
        };
        let account = self.runner.accounts().create(fields).await?;
        Ok(json!(account))
    }

    async fn run(&self) -> io::Result<()> {
        let mut lines = BufReader::new(io::stdin()).lines();
        let mut stdout = io::stdout();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let request: Value = match serde_json::from_str(&line) {
                Ok(req) => req,
                Err(e) => {
                    tracing::warn!(error = %e, "Ignoring malformed request line");
                    continue;
                }
            };

            let id = request["id"].clone();
            let method = request["method"].as_str().unwrap_or("");
            let params = &request["params"];

            let response = match self.handle_request(method, params).await {
                Ok(result) => json!({ "id": id, "result": result }),
                Err(e) => {
                    tracing::debug!(method, error = %e, "Request failed");
                    json!({
                        "id": id,
                        "error": {
                            "code": error_code(e.kind()),
                            "kind": e.kind(),
                            "message": e.to_string(),
                        }
                    })
                }
            };

            stdout.write_all(format!("{}\n", response).as_bytes()).await?;
            stdout.flush().await?;
        }

        Ok(())
    }
}

/// A uuid-valued string parameter. Absent and malformed ids are both
/// reported as missing.
fn parse_id<T: FromStr>(params: &Value, field: &'static str) -> ArenaResult<T> {
    params[field]
        .as_str()
        .and_then(|raw| raw.parse().ok())
        .ok_or(ArenaError::MissingIdentifier(field))
}

fn error_code(kind: ErrorKind) -> i64 {
    match kind {
        ErrorKind::NotFound => -32004,
        ErrorKind::InvalidState => -32009,
        ErrorKind::InvalidInput => -32602,
        ErrorKind::NoOpponentFound => -32010,
        ErrorKind::Infrastructure => -32603,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let server = ArenaServer::from_env()?;
    tracing::info!("Arena server ready on stdio");
    server.run().await?;
    Ok(())
}
