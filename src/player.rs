use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(AccountId)
    }
}

/// A player account as the battle core sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    /// Wallet address the account signs in with, unique when present.
    pub address: Option<String>,
    pub wins: u32,
    pub losses: u32,
}

/// Fields supplied when registering an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewAccount {
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            address: None,
        }
    }
}

impl Account {
    pub fn from_new(id: AccountId, fields: NewAccount) -> Self {
        Self {
            id,
            username: fields.username,
            address: fields.address,
            wins: 0,
            losses: 0,
        }
    }

    pub fn record_battle(&mut self, won: bool) {
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
    }
}
