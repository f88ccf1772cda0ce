use std::collections::{HashMap, HashSet};

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use parking_lot::RwLock;
use sha2::Sha256;

use crate::error::{AppError, AppResult};
use crate::tprintln;

use super::principal::SessionData;

type HmacSha256 = Hmac<Sha256>;

/// Opaque cookie value: `<sid>.<sig>`.
pub type SessionToken = String;

#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: String,
    pub token: SessionToken,
    pub csrf: String,
    pub data: SessionData,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

fn gen_id() -> AppResult<String> {
    // 256-bit random id, base64url without padding
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf)
        .map_err(|e| AppError::internal("rng_unavailable".to_string(), e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

/// Local session store. Tokens are HMAC-signed so that forged or mangled cookies
/// are rejected before any lookup. All state lives on the instance.
pub struct SessionManager {
    pub ttl: Duration,
    pub cookie_name: String,
    secret: Vec<u8>,
    sessions: RwLock<HashMap<String, Session>>,
    user_index: RwLock<HashMap<String, HashSet<String>>>,
}

impl SessionManager {
    pub fn new(ttl_secs: u64, cookie_name: &str, secret: Vec<u8>) -> Self {
        Self {
            ttl: Duration::seconds(ttl_secs as i64),
            cookie_name: cookie_name.to_string(),
            secret,
            sessions: RwLock::new(HashMap::new()),
            user_index: RwLock::new(HashMap::new()),
        }
    }

    /// Secret drawn from the OS RNG; sessions do not survive a restart.
    pub fn with_random_secret(ttl_secs: u64, cookie_name: &str) -> AppResult<Self> {
        let mut secret = vec![0u8; 32];
        getrandom::getrandom(&mut secret)
            .map_err(|e| AppError::internal("rng_unavailable".to_string(), e.to_string()))?;
        Ok(Self::new(ttl_secs, cookie_name, secret))
    }

    fn mac(&self) -> Option<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret).ok()
    }

    fn sign(&self, sid: &str) -> AppResult<String> {
        let mut mac = self
            .mac()
            .ok_or_else(|| AppError::internal("session_key", "invalid session secret"))?;
        mac.update(sid.as_bytes());
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    /// Split `<sid>.<sig>` and check the signature in constant time.
    fn verified_sid<'a>(&self, token: &'a str) -> Option<&'a str> {
        let (sid, sig) = token.split_once('.')?;
        if sid.is_empty() || sig.is_empty() { return None; }
        let sig = base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(sig).ok()?;
        let mut mac = self.mac()?;
        mac.update(sid.as_bytes());
        mac.verify_slice(&sig).ok()?;
        Some(sid)
    }

    pub fn issue(&self, data: SessionData) -> AppResult<Session> {
        self.issue_at(data, Utc::now())
    }

    pub fn issue_at(&self, data: SessionData, now: DateTime<Utc>) -> AppResult<Session> {
        self.sweep_expired(now);
        let sid = gen_id()?;
        let token = format!("{}.{}", sid, self.sign(&sid)?);
        let session = Session {
            session_id: sid.clone(),
            token,
            csrf: gen_id()?,
            data,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        self.sessions.write().insert(sid.clone(), session.clone());
        self.user_index
            .write()
            .entry(session.data.user_id.clone())
            .or_default()
            .insert(sid.clone());
        tprintln!("session.issue user={} sid={} ttl_secs={}", session.data.user_id, sid, self.ttl.num_seconds());
        Ok(session)
    }

    pub fn validate(&self, token: &str) -> Option<SessionData> {
        self.validate_at(token, Utc::now())
    }

    /// Returns the session data when the token is well-formed, correctly signed,
    /// still stored and not expired. Expired entries are pruned on the way.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Option<SessionData> {
        self.live_session(token, now).map(|s| s.data)
    }

    fn live_session(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let sid = self.verified_sid(token)?;
        let found = self.sessions.read().get(sid).cloned()?;
        if found.expires_at > now {
            return Some(found);
        }
        self.forget(sid, &found.data.user_id);
        None
    }

    fn forget(&self, sid: &str, user_id: &str) {
        self.sessions.write().remove(sid);
        self.unindex(user_id, sid);
    }

    fn unindex(&self, user_id: &str, sid: &str) {
        let mut index = self.user_index.write();
        if let Some(set) = index.get_mut(user_id) {
            set.remove(sid);
            if set.is_empty() {
                index.remove(user_id);
            }
        }
    }

    /// Drop every session expired at `now`, whether or not its token is ever presented again.
    fn sweep_expired(&self, now: DateTime<Utc>) {
        let expired: Vec<(String, String)> = {
            let mut sessions = self.sessions.write();
            let expired = sessions
                .iter()
                .filter(|(_, s)| s.expires_at <= now)
                .map(|(sid, s)| (sid.clone(), s.data.user_id.clone()))
                .collect::<Vec<_>>();
            sessions.retain(|_, s| s.expires_at > now);
            expired
        };
        if expired.is_empty() { return; }
        for (sid, user_id) in expired.iter() {
            self.unindex(user_id, sid);
        }
        tprintln!("session.sweep expired={}", expired.len());
    }

    pub fn csrf_for(&self, token: &str) -> Option<String> {
        self.live_session(token, Utc::now()).map(|s| s.csrf)
    }

    pub fn check_csrf(&self, token: &str, provided: &str) -> bool {
        match self.csrf_for(token) {
            Some(expected) => !provided.is_empty() && expected == provided,
            None => false,
        }
    }

    pub fn logout(&self, token: &str) -> bool {
        let Some(sid) = self.verified_sid(token) else { return false; };
        let removed = self.sessions.write().remove(sid);
        match removed {
            Some(sess) => {
                self.unindex(&sess.data.user_id, sid);
                true
            }
            None => false,
        }
    }

    pub fn revoke_user(&self, user_id: &str) -> usize {
        let mut count = 0usize;
        let sids = self.user_index.write().remove(user_id).unwrap_or_default();
        {
            let mut s = self.sessions.write();
            for sid in sids.iter() {
                if s.remove(sid).is_some() { count += 1; }
            }
        }
        tprintln!("session.revoke user={} count={}", user_id, count);
        count
    }

    pub fn active_count(&self) -> usize {
        self.sessions.read().len()
    }
}
