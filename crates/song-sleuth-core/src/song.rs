use std::collections::BTreeMap;

/// One persisted song: field name to value.
pub type PersistedSong = BTreeMap<String, String>;

pub(crate) const TITLE_KEY: &str = "title";
pub(crate) const ARTIST_KEY: &str = "artist";
pub(crate) const SONG_LINK_KEY: &str = "song_link";
pub(crate) const AUDIO_SRC_KEY: &str = "audio_src";
pub(crate) const IMAGE_SRC_KEY: &str = "image_src";

/// A recognized song.
///
/// Two songs describe the same history entry when their `song_link` matches;
/// see [`Song::same_identity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    /// Track title.
    pub title: String,
    /// Performing artist.
    pub artist: String,
    /// Stable link to the song page. Identity key.
    pub song_link: String,
    /// Playback preview URL.
    pub audio_src: String,
    /// Cover image URL, if the service returned one.
    pub image_src: Option<String>,
}

impl Song {
    /// Whether `other` refers to the same song.
    pub fn same_identity(&self, other: &Song) -> bool {
        self.song_link == other.song_link
    }

    /// Rebuild a song from its persisted field mapping.
    ///
    /// Returns `None` if any required key is missing. An empty `image_src`
    /// reads as absent.
    pub fn from_persisted(record: &PersistedSong) -> Option<Self> {
        Some(Self {
            title: record.get(TITLE_KEY)?.clone(),
            artist: record.get(ARTIST_KEY)?.clone(),
            song_link: record.get(SONG_LINK_KEY)?.clone(),
            audio_src: record.get(AUDIO_SRC_KEY)?.clone(),
            image_src: record
                .get(IMAGE_SRC_KEY)
                .filter(|src| !src.is_empty())
                .cloned(),
        })
    }

    /// Field mapping stored by the settings store. An empty `image_src` is
    /// left out, matching how it reads back.
    pub fn to_persisted(&self) -> PersistedSong {
        let mut record = PersistedSong::new();
        record.insert(TITLE_KEY.to_string(), self.title.clone());
        record.insert(ARTIST_KEY.to_string(), self.artist.clone());
        record.insert(SONG_LINK_KEY.to_string(), self.song_link.clone());
        record.insert(AUDIO_SRC_KEY.to_string(), self.audio_src.clone());
        if let Some(image_src) = self.image_src.as_ref().filter(|src| !src.is_empty()) {
            record.insert(IMAGE_SRC_KEY.to_string(), image_src.clone());
        }
        record
    }

    /// File name for the cached cover image, derived from title and artist.
    pub fn cover_file_name(&self) -> String {
        let stem: String = format!("{}{}", self.title, self.artist)
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c => c,
            })
            .collect();
        format!("{stem}.jpg")
    }
}
