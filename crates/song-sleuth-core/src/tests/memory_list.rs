use crate::{MemoryList, PersistedSong, Song};

use std::collections::HashSet;

fn song(title: &str, link: &str) -> Song {
    Song {
        title: title.to_string(),
        artist: format!("{title} artist"),
        song_link: link.to_string(),
        audio_src: format!("https://cdn.example/{link}.mp3"),
        image_src: None,
    }
}

fn links(list: &MemoryList) -> Vec<&str> {
    list.songs().iter().map(|s| s.song_link.as_str()).collect()
}

/// WHAT: New songs are inserted at the front
/// WHY: History is shown most-recent-first
#[test]
fn given_empty_list_when_inserting_songs_then_most_recent_first() {
    // Given: An empty list
    let mut list = MemoryList::new();
    assert!(list.is_empty());

    // When: Inserting three distinct songs
    list.insert_deduplicated(song("A", "L1"));
    list.insert_deduplicated(song("B", "L2"));
    list.insert_deduplicated(song("C", "L3"));

    // Then: Newest is at index 0
    assert_eq!(links(&list), vec!["L3", "L2", "L1"]);
    assert_eq!(list.latest().map(|s| s.title.as_str()), Some("C"));
}

/// WHAT: Re-recognizing a song replaces its old entry and moves it to the front
/// WHY: At most one entry per song_link, newest data wins
#[test]
fn given_existing_link_when_inserting_same_link_then_old_entry_replaced() {
    // Given: A list containing L1 at the back
    let mut list = MemoryList::new();
    list.insert_deduplicated(song("A", "L1"));
    list.insert_deduplicated(song("B", "L2"));
    list.insert_deduplicated(song("C", "L3"));

    // When: Inserting a song with link L1 but a different title
    list.insert_deduplicated(song("A (Remastered)", "L1"));

    // Then: Length unchanged, L1 at front with the new title
    assert_eq!(list.len(), 3);
    assert_eq!(links(&list), vec!["L1", "L3", "L2"]);
    assert_eq!(list.songs()[0].title, "A (Remastered)");
}

/// WHAT: Any insertion sequence keeps links unique and most-recent-first
/// WHY: Core MemoryList invariant
#[test]
fn given_insertion_sequence_with_repeats_when_inserting_then_links_unique_and_ordered() {
    // Given: A sequence with repeated links
    let sequence = ["L1", "L2", "L1", "L3", "L2", "L2", "L4", "L1"];
    let mut list = MemoryList::new();

    // When: Inserting in order
    for (i, link) in sequence.iter().enumerate() {
        list.insert_deduplicated(song(&format!("t{i}"), link));
    }

    // Then: Links are unique
    let unique: HashSet<&str> = links(&list).into_iter().collect();
    assert_eq!(unique.len(), list.len());

    // Then: Order is by last insertion, newest first
    assert_eq!(links(&list), vec!["L1", "L4", "L2", "L3"]);
    assert_eq!(list.songs()[0].title, "t7");
    assert_eq!(list.songs()[2].title, "t5");
}

/// WHAT: Loading a snapshot reproduces the list exactly
/// WHY: Persistence must preserve order and content
#[test]
fn given_populated_list_when_round_tripping_through_snapshot_then_equal() {
    // Given: A list with an image on one entry
    let mut list = MemoryList::new();
    list.insert_deduplicated(song("A", "L1"));
    let mut with_image = song("B", "L2");
    with_image.image_src = Some("https://img.example/b.jpg".to_string());
    list.insert_deduplicated(with_image);
    assert!(list.needs_flush());

    // When: Snapshotting and loading back without flushing first
    let reloaded = MemoryList::load_from(&list.snapshot_for_persist());

    // Then: Same songs, same order, and the reloaded copy is clean
    assert_eq!(reloaded, list);
    assert!(!reloaded.needs_flush());
}

/// WHAT: Records missing required keys are skipped on load
/// WHY: Corrupt settings must not produce half-built songs
#[test]
fn given_record_missing_link_when_loading_then_record_skipped() {
    // Given: One valid record and one without song_link
    let valid = song("A", "L1").to_persisted();
    let mut broken: PersistedSong = song("B", "L2").to_persisted();
    broken.remove("song_link");

    // When: Loading
    let list = MemoryList::load_from(&[broken, valid]);

    // Then: Only the valid record survives
    assert_eq!(links(&list), vec!["L1"]);
}

/// WHAT: Duplicate links on disk keep the first occurrence
/// WHY: The loaded list must still satisfy the uniqueness invariant
#[test]
fn given_duplicate_links_on_disk_when_loading_then_first_kept() {
    // Given: Two records with the same link
    let newer = song("Newer", "L1").to_persisted();
    let older = song("Older", "L1").to_persisted();

    // When: Loading
    let list = MemoryList::load_from(&[newer, older]);

    // Then: The earlier (more recent) record wins
    assert_eq!(list.len(), 1);
    assert_eq!(list.songs()[0].title, "Newer");
}

/// WHAT: Clearing empties the list and marks it for persistence
/// WHY: An explicit clear must be flushed
#[test]
fn given_populated_list_when_clearing_then_empty_and_dirty() {
    // Given: A flushed, populated list
    let mut list = MemoryList::load_from(&[song("A", "L1").to_persisted()]);
    assert!(!list.needs_flush());

    // When: Clearing
    list.clear();

    // Then: Empty and flagged
    assert!(list.is_empty());
    assert!(list.needs_flush());
    assert!(list.snapshot_for_persist().is_empty());
}

/// WHAT: Empty image_src in storage reads as no image
/// WHY: An empty URL must not trigger a cover fetch
#[test]
fn given_empty_image_src_when_loading_then_image_absent() {
    // Given: A record with an empty image_src
    let mut record = song("A", "L1").to_persisted();
    record.insert("image_src".to_string(), String::new());

    // When: Loading
    let list = MemoryList::load_from(&[record]);

    // Then: No image
    assert_eq!(list.songs()[0].image_src, None);
}

/// WHAT: An empty image URL is not persisted and reloads as no image
/// WHY: Empty and absent cover images mean the same thing on both sides
#[test]
fn given_song_with_empty_image_src_when_round_tripping_then_image_absent() {
    // Given: A list holding a song whose image_src is an empty string
    let mut list = MemoryList::new();
    let mut blank_image = song("A", "L1");
    blank_image.image_src = Some(String::new());
    list.insert_deduplicated(blank_image);

    // When: Snapshotting and loading back
    let snapshot = list.snapshot_for_persist();
    let reloaded = MemoryList::load_from(&snapshot);

    // Then: No empty key is stored and the reloaded song reads as no image
    assert!(!snapshot[0].contains_key("image_src"));
    assert_eq!(reloaded.songs()[0].image_src, None);
}
