/// Database row types — these map directly to SQLite rows.
/// Distinct from notewell-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_verified: bool,
}

pub struct NoteRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub color: String,
    pub reminder: Option<String>,
    pub is_archive: bool,
    pub is_trash: bool,
    pub user_id: i64,
}

pub struct LabelRow {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}
