use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Metadata agent id Plex assigns to libraries without a metadata provider.
pub const AGENT_NONE: &str = "com.plexapp.agents.none";

/// Matches a trailing parenthesized year, e.g. `"The Americans (2013)"`.
static TRAILING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d{4}\)$").expect("valid regex"));

/// Kind of media a library section holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Movie,
    Show,
    Other,
}

/// A named grouping of catalog items (one Plex library).
///
/// Immutable once read; owned by the pipeline driver for the duration of
/// a run.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    /// Catalog key used to enumerate items (e.g. `"1"`).
    pub key: String,
    /// Display name (e.g. `"Movies"`).
    pub title: String,
    pub kind: SectionKind,
    /// Metadata agent id, empty when the catalog reports none.
    pub agent: String,
}

impl Section {
    /// True when a real metadata provider backs this section. Sections
    /// without one carry no usable identity data and are excluded from
    /// discovery.
    pub fn has_metadata_agent(&self) -> bool {
        self.agent != AGENT_NONE
    }
}

/// One unit of work: a media item enumerated from a section.
///
/// The `key` is an opaque catalog reference used to fetch the item's
/// full metadata. Consumed exactly once per run.
#[derive(Debug, Clone, Serialize)]
pub struct MediaItem {
    pub key: String,
    /// Listing-level title, if the catalog provided one. Display only;
    /// descriptor resolution uses the full metadata record.
    pub title: Option<String>,
}

impl MediaItem {
    /// Best display label available without a metadata lookup.
    pub fn label(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.key)
    }
}

/// Raw identity fields fetched from the catalog for one item, before
/// descriptor resolution.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ItemMetadata {
    /// Agent-specific global id (e.g. `"com.plexapp.agents.imdb://tt2149175"`).
    pub guid: Option<String>,
    pub title: String,
    pub year: Option<u16>,
}

/// Resolved identity used for the availability check: a primary IMDb id,
/// or a normalized title (+ optional year) fallback.
#[derive(Debug, Clone, Serialize)]
pub struct Descriptor {
    pub imdb: Option<String>,
    pub title: String,
    pub year: Option<u16>,
}

impl Descriptor {
    /// The query text the probe searches with: the IMDb id when present,
    /// otherwise the normalized title.
    pub fn search_key(&self) -> &str {
        self.imdb.as_deref().unwrap_or(&self.title)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({})", self.title, year),
            None => f.write_str(&self.title),
        }
    }
}

/// Why an item was classified `Skipped` before any probe call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// Neither a primary id nor a usable title/year fallback.
    NoIdentity,
    /// The guid uses a non-IMDb identifier scheme and no fallback was
    /// usable.
    ForeignGuid { guid: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoIdentity => f.write_str("no usable identity"),
            SkipReason::ForeignGuid { guid } => {
                write!(f, "unrecognized identifier scheme: {guid}")
            }
        }
    }
}

/// Terminal result of processing one item. Produced exactly once per
/// item, immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Available,
    Unavailable,
    Skipped(SkipReason),
    Failed(String),
}

/// Running count of items seen and items found available.
///
/// A section runner owns its local tally; the pipeline driver owns the
/// global one and folds section tallies in only after each section
/// fully drains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub seen: u64,
    pub available: u64,
}

impl Tally {
    /// Fold another tally into this one.
    pub fn merge(&mut self, other: Tally) {
        self.seen += other.seen;
        self.available += other.available;
    }

    /// Share of seen items found available, in percent (0 when empty).
    pub fn available_percent(&self) -> u64 {
        if self.seen == 0 {
            0
        } else {
            self.available * 100 / self.seen
        }
    }
}

/// Normalize a title for use as a fallback search descriptor.
///
/// Some titles embed the year at the end (`"The Americans (2013)"`);
/// the suffix and stray apostrophes are stripped and the result trimmed.
pub fn normalize_title(title: &str) -> String {
    let stripped = TRAILING_YEAR.replace(title.trim(), "");
    stripped.replace('\'', "").trim().to_string()
}
