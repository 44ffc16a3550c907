//! Embedded metadata values

/// Tag keys known to the tag model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKey {
    Artist,
    Date,
    Track,
    Title,
    Duration,
}

/// Metadata as physically stored in one file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredTags {
    pub artist: String,
    pub date: String,
    pub track: String,
    pub title: String,
    /// Read from the audio stream, never from a text frame
    pub duration_seconds: f64,
}

impl StoredTags {
    /// Replace the text values, keeping the stream duration
    pub fn apply(&mut self, values: &TagValues) {
        self.artist = values.artist.clone();
        self.date = values.date.clone();
        self.track = values.track.clone();
        self.title = values.title.clone();
    }
}

/// Values written by a tag save; duration is never persisted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagValues {
    pub artist: String,
    pub date: String,
    pub track: String,
    pub title: String,
}
