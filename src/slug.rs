//! Track file names and the slugs derived from them.

use std::sync::OnceLock;

use regex::Regex;

/// Editor autosave copies carry this marker and are never tracks.
pub const CHECKPOINT_MARKER: &str = "-checkpoint";

fn track_file_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^([0-9]{2})[_-](.+)\.md$").expect("track file pattern is valid"))
}

/// Lowercases the slug and turns underscores into hyphens.
pub fn canonicalize(raw_slug: &str) -> String {
    raw_slug.to_lowercase().replace('_', "-")
}

pub fn is_checkpoint(file_name: &str) -> bool {
    file_name.contains(CHECKPOINT_MARKER)
}

/// Human title for a raw slug: underscores become spaces, and every run of
/// letters starts upper-case with the rest lower-case (`2pac` -> `2Pac`).
pub fn title_case(raw_slug: &str) -> String {
    let spaced = raw_slug.replace('_', " ");
    let mut title = String::with_capacity(spaced.len());
    let mut previous_cased = false;
    for ch in spaced.chars() {
        let cased = ch.is_uppercase() || ch.is_lowercase();
        if cased && previous_cased {
            title.extend(ch.to_lowercase());
        } else if cased {
            title.extend(ch.to_uppercase());
        } else {
            title.push(ch);
        }
        previous_cased = cased;
    }
    title
}

/// An import file name of the form `NN_slug.md` or `NN-slug.md`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFileName {
    pub track_number: String,
    pub number: u32,
    pub raw_slug: String,
}

impl TrackFileName {
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = track_file_re().captures(file_name)?;
        let track_number = caps[1].to_string();
        let number = track_number.parse().ok()?;
        Some(Self {
            track_number,
            number,
            raw_slug: caps[2].to_string(),
        })
    }

    pub fn canonical_slug(&self) -> String {
        canonicalize(&self.raw_slug)
    }

    /// `{NN}_{canonical-slug}`, the folder and file stem used downstream.
    pub fn folder_name(&self) -> String {
        format!("{}_{}", self.track_number, self.canonical_slug())
    }
}
