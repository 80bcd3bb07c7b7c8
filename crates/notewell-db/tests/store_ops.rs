use notewell_db::Database;

fn seed_user(db: &Database, username: &str) -> i64 {
    db.create_user(
        username,
        "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$AAAAAAAAAAAAAAAAAAAAAA",
        "Test",
        "User",
        &format!("{username}@example.com"),
    )
    .unwrap()
}

#[test]
fn duplicate_username_is_rejected_by_the_store() {
    let db = Database::open_in_memory().unwrap();
    seed_user(&db, "alice");

    let second = db.create_user("alice", "hash", "Other", "Alice", "other@example.com");
    assert!(second.is_err());
}

#[test]
fn mark_verified_is_idempotent() {
    let db = Database::open_in_memory().unwrap();
    let id = seed_user(&db, "alice");

    assert!(!db.get_user_by_id(id).unwrap().unwrap().is_verified);
    db.mark_verified(id).unwrap();
    db.mark_verified(id).unwrap();
    assert!(db.get_user_by_id(id).unwrap().unwrap().is_verified);
}

#[test]
fn set_password_replaces_the_hash() {
    let db = Database::open_in_memory().unwrap();
    let id = seed_user(&db, "alice");

    db.set_password(id, "new-hash").unwrap();
    assert_eq!(db.get_user_by_id(id).unwrap().unwrap().password, "new-hash");
}

#[test]
fn lookup_by_email_finds_the_user() {
    let db = Database::open_in_memory().unwrap();
    let id = seed_user(&db, "alice");

    let user = db.get_user_by_email("alice@example.com").unwrap().unwrap();
    assert_eq!(user.id, id);
    assert!(db.get_user_by_email("nobody@example.com").unwrap().is_none());
}

#[test]
fn archived_then_trashed_note_only_shows_in_the_trash_list() {
    let db = Database::open_in_memory().unwrap();
    let user = seed_user(&db, "alice");
    let note = db
        .insert_note(user, "title", "desc", "blue", None, false, false)
        .unwrap();

    assert!(db.set_note_archive(user, note, true).unwrap());
    assert!(db.set_note_trash(user, note, true).unwrap());

    assert!(db.list_notes_active(user).unwrap().is_empty());
    // trashed takes precedence: the note leaves the archived list too
    assert!(db.list_notes_archived(user).unwrap().is_empty());
    let trashed = db.list_notes_trashed(user).unwrap();
    assert_eq!(trashed.len(), 1);
    assert_eq!(trashed[0].id, note);
}

#[test]
fn all_four_flag_combinations_are_representable() {
    let db = Database::open_in_memory().unwrap();
    let user = seed_user(&db, "alice");

    let plain = db.insert_note(user, "a", "d", "red", None, false, false).unwrap();
    let archived = db.insert_note(user, "b", "d", "red", None, true, false).unwrap();
    let trashed = db.insert_note(user, "c", "d", "red", None, false, true).unwrap();
    let both = db.insert_note(user, "e", "d", "red", None, true, true).unwrap();

    let active: Vec<i64> = db.list_notes_active(user).unwrap().iter().map(|n| n.id).collect();
    assert_eq!(active, vec![plain]);

    let in_archive: Vec<i64> = db.list_notes_archived(user).unwrap().iter().map(|n| n.id).collect();
    assert_eq!(in_archive, vec![archived]);

    let in_trash: Vec<i64> = db.list_notes_trashed(user).unwrap().iter().map(|n| n.id).collect();
    assert_eq!(in_trash, vec![trashed, both]);
}

#[test]
fn foreign_notes_are_indistinguishable_from_missing_ones() {
    let db = Database::open_in_memory().unwrap();
    let alice = seed_user(&db, "alice");
    let bob = seed_user(&db, "bob");
    let note = db
        .insert_note(alice, "private", "d", "red", None, false, false)
        .unwrap();

    assert!(db.get_note(bob, note).unwrap().is_none());
    assert!(!db.update_note(bob, note, "stolen", "d").unwrap());
    assert!(!db.set_note_archive(bob, note, true).unwrap());
    assert!(!db.delete_note(bob, note).unwrap());

    // still intact for the owner
    assert_eq!(db.get_note(alice, note).unwrap().unwrap().title, "private");
}

#[test]
fn attach_rejects_duplicates_and_detach_rejects_absent_edges() {
    let db = Database::open_in_memory().unwrap();
    let user = seed_user(&db, "alice");
    let note = db.insert_note(user, "t", "d", "red", None, false, false).unwrap();
    let label = db.insert_label(user, "work").unwrap();

    assert!(db.attach_label(note, label).unwrap());
    assert!(!db.attach_label(note, label).unwrap());

    assert!(db.detach_label(note, label).unwrap());
    assert!(!db.detach_label(note, label).unwrap());
}

#[test]
fn deleting_a_note_removes_its_label_edges() {
    let db = Database::open_in_memory().unwrap();
    let user = seed_user(&db, "alice");
    let note = db.insert_note(user, "t", "d", "red", None, false, false).unwrap();
    let label = db.insert_label(user, "work").unwrap();
    db.attach_label(note, label).unwrap();

    assert!(db.delete_note(user, note).unwrap());
    assert!(db.get_note(user, note).unwrap().is_none());
    assert!(!db.detach_label(note, label).unwrap());

    // the label itself survives
    assert_eq!(db.get_label(user, label).unwrap().unwrap().name, "work");
}

#[test]
fn deleting_a_label_removes_its_note_edges() {
    let db = Database::open_in_memory().unwrap();
    let user = seed_user(&db, "alice");
    let note = db.insert_note(user, "t", "d", "red", None, false, false).unwrap();
    let label = db.insert_label(user, "work").unwrap();
    db.attach_label(note, label).unwrap();

    assert!(db.delete_label(user, label).unwrap());
    assert!(db.labels_for_note(note).unwrap().is_empty());
}

#[test]
fn batch_label_lookup_groups_by_note() {
    let db = Database::open_in_memory().unwrap();
    let user = seed_user(&db, "alice");
    let first = db.insert_note(user, "a", "d", "red", None, false, false).unwrap();
    let second = db.insert_note(user, "b", "d", "red", None, false, false).unwrap();
    let work = db.insert_label(user, "work").unwrap();
    let home = db.insert_label(user, "home").unwrap();
    db.attach_label(first, work).unwrap();
    db.attach_label(first, home).unwrap();
    db.attach_label(second, work).unwrap();

    let edges = db.labels_for_notes(&[first, second]).unwrap();
    assert_eq!(edges.len(), 3);
    assert_eq!(edges.iter().filter(|(note, _)| *note == first).count(), 2);

    assert!(db.labels_for_notes(&[]).unwrap().is_empty());
}
