//! Deduplicated, most-recent-first history of recognized songs.

use crate::{PersistedSong, Song};

use tracing::{debug, warn};

/// Ordered song history.
///
/// Index 0 is the most recently recognized song and no two entries share a
/// `song_link`. The persisted representation keeps the same order.
///
/// Equality compares the songs only; the flush flag is bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct MemoryList {
    songs: Vec<Song>,
    dirty: bool,
}

impl PartialEq for MemoryList {
    fn eq(&self, other: &Self) -> bool {
        self.songs == other.songs
    }
}

impl Eq for MemoryList {}

impl MemoryList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the list from its persisted form, preserving order.
    ///
    /// Records missing a required field are skipped. If the same link appears
    /// twice, the earlier (more recent) record wins.
    pub fn load_from(persisted: &[PersistedSong]) -> Self {
        let mut songs: Vec<Song> = Vec::with_capacity(persisted.len());

        for (index, record) in persisted.iter().enumerate() {
            let Some(song) = Song::from_persisted(record) else {
                warn!(index, "Skipping persisted song with missing fields");
                continue;
            };

            if songs.iter().any(|existing| existing.same_identity(&song)) {
                warn!(index, song_link = %song.song_link, "Skipping duplicate persisted song");
                continue;
            }

            songs.push(song);
        }

        debug!(song_count = songs.len(), "Memory list loaded");

        Self {
            songs,
            dirty: false,
        }
    }

    /// Persisted form of the list, in list order.
    pub fn snapshot_for_persist(&self) -> Vec<PersistedSong> {
        self.songs.iter().map(Song::to_persisted).collect()
    }

    /// Insert `song` at the front, removing any entry with the same link first.
    pub fn insert_deduplicated(&mut self, song: Song) {
        if let Some(index) = self
            .songs
            .iter()
            .position(|existing| existing.same_identity(&song))
        {
            self.songs.remove(index);
            debug!(index, song_link = %song.song_link, "Removed previous entry for song");
        }

        self.songs.insert(0, song);
        self.dirty = true;
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.songs.clear();
        self.dirty = true;
    }

    /// Whether the list has no songs.
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Number of songs.
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// Songs, most recent first.
    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    /// Most recently recognized song.
    pub fn latest(&self) -> Option<&Song> {
        self.songs.first()
    }

    /// Whether the list changed since it was loaded or last flushed.
    pub fn needs_flush(&self) -> bool {
        self.dirty
    }

    /// Record that the current contents have been persisted.
    pub fn mark_flushed(&mut self) {
        self.dirty = false;
    }
}
