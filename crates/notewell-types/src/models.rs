use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note as persisted, without label context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub color: String,
    pub reminder: Option<DateTime<Utc>>,
    pub is_archive: bool,
    pub is_trash: bool,
    pub user_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

/// Denormalized note state as serialized into the cache and returned by
/// listings: the note plus its labels as of the last note write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteSnapshot {
    #[serde(flatten)]
    pub note: Note,
    pub labels: Vec<Label>,
}
