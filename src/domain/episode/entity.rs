use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to an episode by the content API
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpisodeId(pub String);

impl EpisodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EpisodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EpisodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stream quality variants offered per episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "480p")]
    P480,
    #[serde(rename = "720p")]
    P720,
    #[serde(rename = "1080p")]
    P1080,
}

impl Quality {
    /// Highest first.
    pub const PREFERENCE: [Quality; 3] = [Quality::P1080, Quality::P720, Quality::P480];

    pub fn label(self) -> &'static str {
        match self {
            Quality::P480 => "480p",
            Quality::P720 => "720p",
            Quality::P1080 => "1080p",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Half-open time range `[start, stop)` in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentRange {
    pub start: f64,
    pub stop: f64,
}

impl SegmentRange {
    pub fn new(start: f64, stop: f64) -> Self {
        Self { start, stop }
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.stop
    }
}

/// Which skippable segment a range describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Opening,
    Ending,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentKind::Opening => write!(f, "opening"),
            SegmentKind::Ending => write!(f, "ending"),
        }
    }
}

/// Stream URL per quality
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityVariants {
    #[serde(rename = "480p", default, skip_serializing_if = "Option::is_none")]
    pub p480: Option<String>,
    #[serde(rename = "720p", default, skip_serializing_if = "Option::is_none")]
    pub p720: Option<String>,
    #[serde(rename = "1080p", default, skip_serializing_if = "Option::is_none")]
    pub p1080: Option<String>,
}

impl QualityVariants {
    pub fn url(&self, quality: Quality) -> Option<&str> {
        let url = match quality {
            Quality::P480 => &self.p480,
            Quality::P720 => &self.p720,
            Quality::P1080 => &self.p1080,
        };
        url.as_deref().filter(|u| !u.trim().is_empty())
    }

    pub fn set(&mut self, quality: Quality, url: impl Into<String>) {
        let slot = match quality {
            Quality::P480 => &mut self.p480,
            Quality::P720 => &mut self.p720,
            Quality::P1080 => &mut self.p1080,
        };
        *slot = Some(url.into());
    }

    /// Qualities with a stream, highest first
    pub fn available(&self) -> Vec<Quality> {
        Quality::PREFERENCE
            .into_iter()
            .filter(|q| self.url(*q).is_some())
            .collect()
    }

    pub fn highest(&self) -> Option<Quality> {
        self.available().into_iter().next()
    }
}

/// Episode as delivered by the content API.
/// The playback core only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: EpisodeId,

    /// Position in the series, 1-based
    pub ordinal: u32,

    pub duration_seconds: f64,

    #[serde(default)]
    pub opening_range: Option<SegmentRange>,

    #[serde(default)]
    pub ending_range: Option<SegmentRange>,

    #[serde(default)]
    pub quality_variants: QualityVariants,

    /// Forces playback to begin here regardless of saved progress
    #[serde(default)]
    pub start_time_override: Option<f64>,
}

impl Episode {
    pub fn new(id: impl Into<EpisodeId>, ordinal: u32, duration_seconds: f64) -> Self {
        Self {
            id: id.into(),
            ordinal,
            duration_seconds,
            opening_range: None,
            ending_range: None,
            quality_variants: QualityVariants::default(),
            start_time_override: None,
        }
    }

    pub fn with_opening(mut self, start: f64, stop: f64) -> Self {
        self.opening_range = Some(SegmentRange::new(start, stop));
        self
    }

    pub fn with_ending(mut self, start: f64, stop: f64) -> Self {
        self.ending_range = Some(SegmentRange::new(start, stop));
        self
    }

    pub fn with_variant(mut self, quality: Quality, url: impl Into<String>) -> Self {
        self.quality_variants.set(quality, url);
        self
    }

    pub fn with_start_time_override(mut self, seconds: f64) -> Self {
        self.start_time_override = Some(seconds);
        self
    }

    /// 1080p > 720p > 480p
    pub fn preferred_quality(&self) -> Option<Quality> {
        self.quality_variants.highest()
    }

    pub fn stream_url(&self, quality: Quality) -> Option<&str> {
        self.quality_variants.url(quality)
    }

    pub fn segment(&self, kind: SegmentKind) -> Option<SegmentRange> {
        match kind {
            SegmentKind::Opening => self.opening_range,
            SegmentKind::Ending => self.ending_range,
        }
    }
}

impl From<String> for EpisodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
