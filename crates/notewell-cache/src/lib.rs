//! Per-user note cache: key = user id, field = note id, value = the
//! serialized snapshot written by the last note mutation.
//!
//! The cache mirrors committed store state and is never authoritative:
//! backend failures are logged and reported as a miss so a request can
//! always fall through to the store.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use thiserror::Error;
use tracing::warn;

use notewell_types::models::NoteSnapshot;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("snapshot is missing its {0} id")]
    MissingField(&'static str),
    #[error("serialized snapshot is empty")]
    EmptyPayload,
    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// ## Cache Modes
///
/// - **Local**: in-process hash, used by tests and single-node dev
/// - **Redis**: one remote hash per user (`HSET`/`HGETALL`/`HDEL`)
#[derive(Clone)]
pub enum NoteCache {
    Local(Arc<DashMap<i64, HashMap<i64, String>>>),
    Redis(ConnectionManager),
}

impl NoteCache {
    pub fn new_local() -> Self {
        NoteCache::Local(Arc::new(DashMap::new()))
    }

    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(NoteCache::Redis(manager))
    }

    fn user_key(user_id: i64) -> String {
        format!("notes:{user_id}")
    }

    /// Overwrite the cached snapshot for `(user, note)`.
    ///
    /// Rejects snapshots without ids; backend errors are swallowed.
    pub async fn save(&self, snapshot: &NoteSnapshot) -> Result<(), CacheError> {
        if snapshot.note.user_id == 0 {
            return Err(CacheError::MissingField("user"));
        }
        if snapshot.note.id == 0 {
            return Err(CacheError::MissingField("note"));
        }

        let payload = serde_json::to_string(snapshot)?;
        if payload.is_empty() {
            return Err(CacheError::EmptyPayload);
        }

        match self {
            NoteCache::Local(map) => {
                map.entry(snapshot.note.user_id)
                    .or_default()
                    .insert(snapshot.note.id, payload);
            }
            NoteCache::Redis(manager) => {
                let mut conn = manager.clone();
                if let Err(e) = conn
                    .hset::<_, _, _, ()>(Self::user_key(snapshot.note.user_id), snapshot.note.id, &payload)
                    .await
                {
                    warn!(
                        user_id = snapshot.note.user_id,
                        note_id = snapshot.note.id,
                        error = %e,
                        "cache HSET error"
                    );
                }
            }
        }

        Ok(())
    }

    /// One cached snapshot, or `None` on miss or backend failure.
    pub async fn retrieve_one(&self, user_id: i64, note_id: i64) -> Option<NoteSnapshot> {
        let payload = match self {
            NoteCache::Local(map) => map.get(&user_id)?.get(&note_id).cloned()?,
            NoteCache::Redis(manager) => {
                let mut conn = manager.clone();
                match conn
                    .hget::<_, _, Option<String>>(Self::user_key(user_id), note_id)
                    .await
                {
                    Ok(Some(payload)) => payload,
                    Ok(None) => return None,
                    Err(e) => {
                        warn!(user_id, note_id, error = %e, "cache HGET error");
                        return None;
                    }
                }
            }
        };

        parse_snapshot(user_id, note_id, &payload)
    }

    /// The user's full note-id → snapshot map, `None` when nothing is
    /// cached.
    pub async fn retrieve_all(&self, user_id: i64) -> Option<HashMap<i64, NoteSnapshot>> {
        let fields: Vec<(i64, String)> = match self {
            NoteCache::Local(map) => map
                .get(&user_id)?
                .iter()
                .map(|(note_id, payload)| (*note_id, payload.clone()))
                .collect(),
            NoteCache::Redis(manager) => {
                let mut conn = manager.clone();
                match conn
                    .hgetall::<_, HashMap<String, String>>(Self::user_key(user_id))
                    .await
                {
                    Ok(raw) => raw
                        .into_iter()
                        .filter_map(|(field, payload)| match field.parse::<i64>() {
                            Ok(note_id) => Some((note_id, payload)),
                            Err(_) => {
                                warn!(user_id, field, "cache hash field is not a note id");
                                None
                            }
                        })
                        .collect(),
                    Err(e) => {
                        warn!(user_id, error = %e, "cache HGETALL error");
                        return None;
                    }
                }
            }
        };

        let snapshots: HashMap<i64, NoteSnapshot> = fields
            .into_iter()
            .filter_map(|(note_id, payload)| {
                parse_snapshot(user_id, note_id, &payload).map(|s| (note_id, s))
            })
            .collect();

        if snapshots.is_empty() {
            None
        } else {
            Some(snapshots)
        }
    }

    /// Remove one entry; reports whether it existed. Backend errors are
    /// downgraded to "not removed".
    pub async fn delete(&self, user_id: i64, note_id: i64) -> bool {
        match self {
            NoteCache::Local(map) => map
                .get_mut(&user_id)
                .map(|mut notes| notes.remove(&note_id).is_some())
                .unwrap_or(false),
            NoteCache::Redis(manager) => {
                let mut conn = manager.clone();
                match conn.hdel::<_, _, i64>(Self::user_key(user_id), note_id).await {
                    Ok(removed) => removed > 0,
                    Err(e) => {
                        warn!(user_id, note_id, error = %e, "cache HDEL error");
                        false
                    }
                }
            }
        }
    }
}

fn parse_snapshot(user_id: i64, note_id: i64, payload: &str) -> Option<NoteSnapshot> {
    match serde_json::from_str(payload) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(user_id, note_id, error = %e, "corrupt cached snapshot");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notewell_types::models::Note;

    fn snapshot(user_id: i64, note_id: i64, title: &str) -> NoteSnapshot {
        NoteSnapshot {
            note: Note {
                id: note_id,
                title: title.to_string(),
                description: "body".to_string(),
                color: "yellow".to_string(),
                reminder: None,
                is_archive: false,
                is_trash: false,
                user_id,
            },
            labels: vec![],
        }
    }

    #[tokio::test]
    async fn save_then_retrieve_round_trips() {
        let cache = NoteCache::new_local();
        cache.save(&snapshot(7, 3, "groceries")).await.unwrap();

        let cached = cache.retrieve_one(7, 3).await.unwrap();
        assert_eq!(cached.note.title, "groceries");
        assert_eq!(cached.note.user_id, 7);
    }

    #[tokio::test]
    async fn save_overwrites_the_previous_entry() {
        let cache = NoteCache::new_local();
        cache.save(&snapshot(7, 3, "old")).await.unwrap();
        cache.save(&snapshot(7, 3, "new")).await.unwrap();

        let all = cache.retrieve_all(7).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[&3].note.title, "new");
    }

    #[tokio::test]
    async fn delete_reports_existence_and_leaves_a_miss() {
        let cache = NoteCache::new_local();
        cache.save(&snapshot(7, 3, "groceries")).await.unwrap();

        assert!(cache.delete(7, 3).await);
        assert!(!cache.delete(7, 3).await);
        assert!(cache.retrieve_one(7, 3).await.is_none());
        assert!(cache.retrieve_all(7).await.is_none());
    }

    #[tokio::test]
    async fn unknown_user_is_a_miss() {
        let cache = NoteCache::new_local();
        assert!(cache.retrieve_all(42).await.is_none());
        assert!(cache.retrieve_one(42, 1).await.is_none());
        assert!(!cache.delete(42, 1).await);
    }

    #[tokio::test]
    async fn snapshots_without_ids_are_rejected() {
        let cache = NoteCache::new_local();

        let err = cache.save(&snapshot(0, 3, "t")).await.unwrap_err();
        assert!(matches!(err, CacheError::MissingField("user")));

        let err = cache.save(&snapshot(7, 0, "t")).await.unwrap_err();
        assert!(matches!(err, CacheError::MissingField("note")));
    }
}
