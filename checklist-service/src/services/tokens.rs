//! Expiring single-use login tokens.
//!
//! Process-local, best-effort state: tokens live 60 seconds and die with the
//! process. Encapsulated behind insert/redeem so a durable TTL cache could
//! replace the map without touching callers.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use rand::Rng;
use std::sync::Arc;
use uuid::Uuid;

pub const TEMP_TOKEN_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct TempToken {
    user_id: Uuid,
    expires_at: Instant,
}

#[derive(Clone)]
pub struct TempTokenStore {
    tokens: Arc<DashMap<String, TempToken>>,
    ttl: Duration,
}

impl Default for TempTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TempTokenStore {
    pub fn new() -> Self {
        Self::with_ttl(TEMP_TOKEN_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            tokens: Arc::new(DashMap::new()),
            ttl,
        }
    }

    /// Mint a token for the user, valid for the store's TTL.
    pub fn issue(&self, user_id: Uuid) -> String {
        self.purge_expired();

        let token = generate_token();
        self.tokens.insert(
            token.clone(),
            TempToken {
                user_id,
                expires_at: Instant::now() + self.ttl,
            },
        );
        token
    }

    /// Consume a token. Returns the user it was minted for, or `None` if the
    /// token is unknown, already used or expired. A token never redeems twice.
    pub fn redeem(&self, token: &str) -> Option<Uuid> {
        let (_, entry) = self.tokens.remove(token)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        Some(entry.user_id)
    }

    fn purge_expired(&self) {
        let now = Instant::now();
        self.tokens.retain(|_, entry| entry.expires_at > now);
    }
}

fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let token_bytes: [u8; 32] = rng.gen();
    hex::encode(token_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_redeems_exactly_once() {
        let store = TempTokenStore::new();
        let user = Uuid::new_v4();

        let token = store.issue(user);
        assert_eq!(store.redeem(&token), Some(user));
        assert_eq!(store.redeem(&token), None);
    }

    #[test]
    fn unknown_token_fails() {
        let store = TempTokenStore::new();
        assert_eq!(store.redeem("deadbeef"), None);
    }

    #[test]
    fn expired_token_fails() {
        let store = TempTokenStore::with_ttl(Duration::from_millis(0));
        let token = store.issue(Uuid::new_v4());
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.redeem(&token), None);
    }

    #[test]
    fn tokens_are_unique_per_issue() {
        let store = TempTokenStore::new();
        let user = Uuid::new_v4();
        assert_ne!(store.issue(user), store.issue(user));
    }
}
