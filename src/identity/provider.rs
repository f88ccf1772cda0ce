use std::collections::HashMap;

use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use parking_lot::RwLock;
use password_hash::{PasswordHash, SaltString};
use serde::Deserialize;

use crate::tprintln;

use super::principal::SessionData;
use super::resolver::CookieJar;
use super::role::Role;
use super::session::{Session, SessionManager};

/// Session lookup as consumed by the resolver. Implementations own the name of
/// the cookie they read.
#[async_trait]
pub trait AuthService: Send + Sync {
    fn cookie_name(&self) -> &str;
    async fn get_session(&self, cookies: &CookieJar) -> Option<SessionData>;
}

#[async_trait]
impl AuthService for SessionManager {
    fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    async fn get_session(&self, cookies: &CookieJar) -> Option<SessionData> {
        let token = cookies.get(&self.cookie_name)?;
        self.validate(token)
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let phc = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!(e.to_string()))?
        .to_string();
    Ok(phc)
}

pub fn verify_password(phc: &str, password: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: String,
    pub display_name: String,
    pub role: Role,
    pub password_hash: String,
}

/// Seed entry for an account. Either a plaintext `password` (hashed on load) or
/// a ready-made Argon2 `password_hash`.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_hash: Option<String>,
}

/// In-memory account list keyed by lowercase user id.
#[derive(Default)]
pub struct UserDirectory {
    accounts: RwLock<HashMap<String, Account>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: &str, display_name: &str, role: Role, password: &str) -> Result<()> {
        let password_hash = hash_password(password)?;
        self.insert(Account { id: id.to_string(), display_name: display_name.to_string(), role, password_hash });
        Ok(())
    }

    pub fn insert(&self, account: Account) {
        self.accounts.write().insert(account.id.to_lowercase(), account);
    }

    pub fn add_seed(&self, seed: &SeedUser) -> Result<()> {
        let password_hash = match (&seed.password_hash, &seed.password) {
            (Some(phc), _) => phc.clone(),
            (None, Some(pw)) => hash_password(pw)?,
            (None, None) => return Err(anyhow!("seed user '{}' has neither password nor password_hash", seed.id)),
        };
        let display_name = if seed.display_name.is_empty() { seed.id.clone() } else { seed.display_name.clone() };
        self.insert(Account { id: seed.id.clone(), display_name, role: seed.role, password_hash });
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Account> {
        self.accounts.read().get(&id.to_lowercase()).cloned()
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Password login against the local directory, issuing sessions through the manager.
pub struct LocalAuthProvider {
    pub users: UserDirectory,
}

impl LocalAuthProvider {
    pub fn new(users: UserDirectory) -> Self {
        Self { users }
    }

    /// Unknown user and wrong password are indistinguishable to the caller.
    pub fn login(&self, sessions: &SessionManager, req: &LoginRequest) -> Result<Session> {
        let Some(account) = self.users.get(req.username.trim()) else {
            return Err(anyhow!("invalid_credentials"));
        };
        if !verify_password(&account.password_hash, &req.password) {
            return Err(anyhow!("invalid_credentials"));
        }
        let data = SessionData {
            user_id: account.id.clone(),
            display_name: account.display_name.clone(),
            role: account.role.as_str().to_string(),
        };
        let session = sessions.issue(data).map_err(|e| anyhow!(e.to_string()))?;
        tprintln!("auth.login user={} sid={}", account.id, session.session_id);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> LocalAuthProvider {
        let users = UserDirectory::new();
        users.add_user("alice", "Alice", Role::Trainer, "s3cr3t!").unwrap();
        LocalAuthProvider::new(users)
    }

    #[test]
    fn login_positive_and_negative() {
        let p = provider();
        let sm = SessionManager::new(60, "sid", b"k".to_vec());
        let ok = p.login(&sm, &LoginRequest { username: "Alice".into(), password: "s3cr3t!".into() }).unwrap();
        assert_eq!(ok.data.role, "trainer");
        assert_eq!(ok.data.display_name, "Alice");

        let bad = p.login(&sm, &LoginRequest { username: "alice".into(), password: "wrong".into() });
        assert_eq!(bad.unwrap_err().to_string(), "invalid_credentials");
        let missing = p.login(&sm, &LoginRequest { username: "bob".into(), password: "s3cr3t!".into() });
        assert_eq!(missing.unwrap_err().to_string(), "invalid_credentials");
    }

    #[test]
    fn seed_requires_some_password() {
        let users = UserDirectory::new();
        let seed = SeedUser { id: "x".into(), display_name: String::new(), role: Role::Member, password: None, password_hash: None };
        assert!(users.add_seed(&seed).is_err());
        let seed = SeedUser { password: Some("pw".into()), ..seed };
        users.add_seed(&seed).unwrap();
        assert_eq!(users.get("X").map(|a| a.display_name), Some("x".to_string()));
    }

    #[tokio::test]
    async fn session_manager_reads_its_own_cookie() {
        let sm = SessionManager::new(60, "suivi_session", b"k".to_vec());
        let s = sm.issue(SessionData { user_id: "u".into(), display_name: "U".into(), role: "member".into() }).unwrap();
        let jar = CookieJar::parse(&format!("theme=dark; suivi_session={}", s.token));
        assert_eq!(sm.get_session(&jar).await.map(|d| d.user_id), Some("u".to_string()));
        let other = CookieJar::parse(&format!("other={}", s.token));
        assert!(sm.get_session(&other).await.is_none());
    }
}
