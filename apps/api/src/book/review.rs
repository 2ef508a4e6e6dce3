//! Review synthesis. Turns a free-form (or JSON) critique into three scores and a verdict.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::parse_json_object;

/// Score assumed when a criterion cannot be found in the review text.
pub const DEFAULT_SCORE: u32 = 92;
/// Books whose mean score falls below this are flagged for improvement.
pub const IMPROVEMENT_THRESHOLD: f64 = 85.0;
const MAX_SCORE: u32 = 100;

static AUTHENTICITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:authenticité|authenticite|authenticity)[^0-9]*([0-9]+)")
        .expect("authenticity probe must compile")
});
static NARRATIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:narratif|narrative|cohérence|coherence)[^0-9]*([0-9]+)")
        .expect("narrative probe must compile")
});
static OVERALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:global|général|overall|qualité|quality)[^0-9]*([0-9]+)")
        .expect("overall probe must compile")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreKind {
    Authenticity,
    Narrative,
    Overall,
}

impl ScoreKind {
    pub const ALL: [ScoreKind; 3] = [
        ScoreKind::Authenticity,
        ScoreKind::Narrative,
        ScoreKind::Overall,
    ];

    fn pattern(&self) -> &'static Regex {
        match self {
            ScoreKind::Authenticity => &AUTHENTICITY,
            ScoreKind::Narrative => &NARRATIVE,
            ScoreKind::Overall => &OVERALL,
        }
    }

    /// First number following this criterion's context word, clamped to 100.
    pub fn probe(&self, text: &str) -> Option<u32> {
        let caps = self.pattern().captures(text)?;
        caps[1].parse::<u32>().ok().map(|s| s.min(MAX_SCORE))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewSource {
    /// Scores read from a JSON object in the review.
    Json,
    /// Scores read by keyword probes (or defaulted).
    Probes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewReport {
    pub authenticity_score: u32,
    pub narrative_quality: u32,
    pub overall_score: u32,
    /// Unweighted mean of the three scores, rounded to two decimals.
    pub mean_score: f64,
    pub needs_improvement: bool,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    pub source: ReviewSource,
}

impl ReviewReport {
    pub fn score(&self, kind: ScoreKind) -> u32 {
        match kind {
            ScoreKind::Authenticity => self.authenticity_score,
            ScoreKind::Narrative => self.narrative_quality,
            ScoreKind::Overall => self.overall_score,
        }
    }
}

/// Shape the simple generator asks the reviewer to answer with.
#[derive(Debug, Default, Deserialize)]
struct ReviewPayload {
    authenticity_score: Option<f64>,
    narrative_quality: Option<f64>,
    overall_score: Option<f64>,
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weaknesses: Vec<String>,
}

impl ReviewPayload {
    fn score(&self, kind: ScoreKind) -> Option<u32> {
        let raw = match kind {
            ScoreKind::Authenticity => self.authenticity_score,
            ScoreKind::Narrative => self.narrative_quality,
            ScoreKind::Overall => self.overall_score,
        }?;
        (raw.is_finite() && raw >= 0.0).then(|| (raw.round() as u32).min(MAX_SCORE))
    }

    fn has_scores(&self) -> bool {
        ScoreKind::ALL.iter().any(|kind| self.score(*kind).is_some())
    }
}

/// Builds a review report from whatever the reviewer wrote. Never fails.
///
/// A JSON object carrying scores wins; any criterion it lacks is probed in the raw
/// text and finally defaults to [`DEFAULT_SCORE`].
pub fn synthesize_review(text: &str) -> ReviewReport {
    let payload = parse_json_object::<ReviewPayload>(text)
        .ok()
        .filter(ReviewPayload::has_scores);

    let score = |kind: ScoreKind| {
        payload
            .as_ref()
            .and_then(|p| p.score(kind))
            .or_else(|| kind.probe(text))
            .unwrap_or(DEFAULT_SCORE)
    };
    let authenticity_score = score(ScoreKind::Authenticity);
    let narrative_quality = score(ScoreKind::Narrative);
    let overall_score = score(ScoreKind::Overall);

    let mean = f64::from(authenticity_score + narrative_quality + overall_score) / 3.0;
    let source = if payload.is_some() {
        ReviewSource::Json
    } else {
        ReviewSource::Probes
    };
    debug!(
        authenticity_score,
        narrative_quality, overall_score, mean, ?source, "review synthesized"
    );

    let payload = payload.unwrap_or_default();
    ReviewReport {
        authenticity_score,
        narrative_quality,
        overall_score,
        mean_score: (mean * 100.0).round() / 100.0,
        needs_improvement: mean < IMPROVEMENT_THRESHOLD,
        suggestions: payload.suggestions,
        strengths: payload.strengths,
        weaknesses: payload.weaknesses,
        source,
    }
}
