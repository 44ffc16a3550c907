//! Stored vs. calculated metadata of one physical file
//!
//! The calculated view is what the file's tags *should* say for a given
//! slot. For the source slot it comes from the file identity (and the
//! stream duration); for a current/previous copy it is rebuilt from the
//! copy's own stored tags, with the raw title recovered by stripping the
//! decorations the title was built with.
//!
//! Title layout: `[marker, date, track, (mm:ss), raw title]` joined by `-`,
//! parts equal to `0000`, `00` or empty left out.

use crate::models::{ArchiveSlot, FileIdentity, StoredTags, TagKey, TagValues};
use rbtag_common::human_time::format_title_duration;
use regex::Regex;

/// Title parts that never make it into a title
const EXCLUDED_TITLE_PARTS: [&str; 3] = ["0000", "00", ""];

/// Each decoration token is removed at most this many times
const STRIP_LIMIT: usize = 2;

/// Format a date to at least four digits; non-numeric dates are kept as is
pub fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    match raw.parse::<u64>() {
        Ok(value) => format!("{:04}", value),
        Err(_) => raw.to_string(),
    }
}

/// Format a track number to at least two digits (`3/12` reads `03`)
pub fn format_track(raw: &str) -> String {
    let number = raw.split('/').next().unwrap_or_default().trim();
    if number.is_empty() {
        return "00".to_string();
    }
    match number.parse::<u64>() {
        Ok(value) => format!("{:02}", value),
        Err(_) => number.to_string(),
    }
}

/// Remove title decorations, in order: duration, date, slot name, slot
/// marker, track
///
/// Each token is used as a regex, as is, case-sensitively, together with
/// one optional surrounding space and a trailing dash. The duration token
/// `(45:12)` is therefore a group: its digits go and the parentheses stay,
/// so a copy titled `C#-20240301-03-(45:12)-Episode` yields `()-Episode`.
/// Existing archives were ordered with this recovered title. Tokens a title
/// would never contain (`0000`, `00`, empty) and tokens that are not valid
/// patterns are skipped.
pub fn strip_decorations(title: &str, stored: &StoredTags, slot: ArchiveSlot) -> String {
    let tokens = [
        format_title_duration(stored.duration_seconds),
        format_date(&stored.date),
        slot.name().to_string(),
        slot.marker().unwrap_or_default().to_string(),
        format_track(&stored.track),
    ];

    let mut raw_title = title.to_string();
    for token in tokens.iter().filter(|t| !EXCLUDED_TITLE_PARTS.contains(&t.as_str())) {
        match Regex::new(&format!(r"\s?{}\s?-?", token)) {
            Ok(re) => raw_title = re.replacen(&raw_title, STRIP_LIMIT, "").into_owned(),
            Err(e) => tracing::debug!(token = %token, "Decoration not stripped: {}", e),
        }
    }
    raw_title
}

/// Values a slot's tags are calculated from
#[derive(Debug, Clone, PartialEq)]
struct CalculatedView {
    artist: String,
    date: String,
    track: String,
    raw_title: String,
    duration_seconds: f64,
    extension: String,
}

/// Metadata of one slot
#[derive(Debug, Clone, PartialEq)]
pub struct TagModel {
    role: ArchiveSlot,
    stored: StoredTags,
    calc: CalculatedView,
}

impl TagModel {
    /// Source slot: calculated from the identity plus the stream duration
    pub fn from_identity(identity: &FileIdentity, stored: StoredTags) -> Self {
        let calc = CalculatedView {
            artist: identity.artist.clone(),
            date: identity.date.clone(),
            track: identity.track.clone(),
            raw_title: identity.raw_title.clone(),
            duration_seconds: stored.duration_seconds,
            extension: identity.extension.clone(),
        };
        Self {
            role: ArchiveSlot::Source,
            stored,
            calc,
        }
    }

    /// Copy slot: calculated from the file's own stored tags
    pub fn from_stored(role: ArchiveSlot, stored: StoredTags, extension: &str) -> Self {
        let calc = CalculatedView {
            artist: stored.artist.clone(),
            date: stored.date.clone(),
            track: stored.track.clone(),
            raw_title: strip_decorations(&stored.title, &stored, role),
            duration_seconds: stored.duration_seconds,
            extension: extension.to_string(),
        };
        Self { role, stored, calc }
    }

    /// Same file seen from another slot
    pub fn with_role(&self, role: ArchiveSlot) -> Self {
        Self {
            role,
            stored: self.stored.clone(),
            calc: self.calc.clone(),
        }
    }

    pub fn role(&self) -> ArchiveSlot {
        self.role
    }

    pub fn raw_title(&self) -> &str {
        &self.calc.raw_title
    }

    /// Calculated value for this model's own slot
    pub fn calculated(&self, key: TagKey) -> String {
        self.calculated_for(key, self.role)
    }

    /// Calculated value as it would read in `role`
    pub fn calculated_for(&self, key: TagKey, role: ArchiveSlot) -> String {
        match key {
            TagKey::Artist => self.calc.artist.clone(),
            TagKey::Date => format_date(&self.calc.date),
            TagKey::Track => format_track(&self.calc.track),
            TagKey::Duration => format_title_duration(self.calc.duration_seconds),
            TagKey::Title => self.title_for(role),
        }
    }

    fn title_for(&self, role: ArchiveSlot) -> String {
        let parts = [
            role.marker().unwrap_or_default().to_string(),
            self.calculated_for(TagKey::Date, role),
            self.calculated_for(TagKey::Track, role),
            self.calculated_for(TagKey::Duration, role),
            self.calc.raw_title.clone(),
        ];
        parts
            .iter()
            .filter(|p| !EXCLUDED_TITLE_PARTS.contains(&p.as_str()))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Value embedded in the file
    pub fn stored(&self, key: TagKey) -> String {
        match key {
            TagKey::Artist => self.stored.artist.clone(),
            TagKey::Date => self.stored.date.clone(),
            TagKey::Track => self.stored.track.clone(),
            TagKey::Title => self.stored.title.clone(),
            TagKey::Duration => format_title_duration(self.stored.duration_seconds),
        }
    }

    /// Calculated (own slot) equals stored
    pub fn compare(&self, key: TagKey) -> bool {
        self.calculated(key) == self.stored(key)
    }

    /// Ordering key: formatted date, formatted track, raw title
    pub fn canonical_id(&self) -> String {
        format!(
            "{}{}{}",
            self.calculated(TagKey::Date),
            self.calculated(TagKey::Track),
            self.calc.raw_title
        )
    }

    /// Values written by a save in `role`
    pub fn values_for(&self, role: ArchiveSlot) -> TagValues {
        TagValues {
            artist: self.calculated_for(TagKey::Artist, role),
            date: self.calculated_for(TagKey::Date, role),
            track: self.calculated_for(TagKey::Track, role),
            title: self.calculated_for(TagKey::Title, role),
        }
    }

    /// Record a successful save
    pub fn mark_saved(&mut self, values: &TagValues) {
        self.stored.apply(values);
    }

    /// Canonical filename in `role`
    ///
    /// Source: non-empty `artist`, `date`, `track`, `raw title` joined by the
    /// separator. Copies: `artist` and slot name.
    pub fn filename_for(&self, role: ArchiveSlot, separator: &str) -> String {
        let stem = match role {
            ArchiveSlot::Source => [
                self.calc.artist.as_str(),
                self.calc.date.as_str(),
                self.calc.track.as_str(),
                self.calc.raw_title.as_str(),
            ]
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(separator),
            _ => format!("{}{}{}", self.calc.artist, separator, role.name()),
        };
        format!("{}.{}", stem, self.calc.extension)
    }
}
