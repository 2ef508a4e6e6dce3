//! Advisory checks run over crew output. Pure and deterministic; they never block a book.
//!
//! Each check scores keyword heuristics in 20-point steps. Reports are attached to the
//! book (format warnings per section, enigma/cultural reports in metadata).

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const CRITERION_POINTS: u32 = 20;
const PASSING_SCORE: u32 = 60;

const MIN_TITLE_CHARS: usize = 5;
const MAX_TITLE_CHARS: usize = 50;
const MIN_CONTENT_CHARS: usize = 1500;
const MAX_CONTENT_CHARS: usize = 3000;

const MIN_ENIGMA_CHARS: usize = 50;
const MAX_ENIGMA_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    SectionFormatter,
    EnigmaValidator,
    CulturalContextValidator,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [
        ToolKind::SectionFormatter,
        ToolKind::EnigmaValidator,
        ToolKind::CulturalContextValidator,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::SectionFormatter => "section_formatter",
            ToolKind::EnigmaValidator => "enigma_validator",
            ToolKind::CulturalContextValidator => "cultural_context_validator",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Section format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatReport {
    pub title_length: usize,
    pub content_length: usize,
    pub warnings: Vec<String>,
}

/// Title 5–50 chars, body 1500–3000 chars. Lengths are in characters.
pub fn check_section_format(title: &str, content: &str) -> FormatReport {
    let title_length = title.trim().trim_matches('*').trim().chars().count();
    let content_length = content.chars().count();
    let mut warnings = Vec::new();

    if title_length < MIN_TITLE_CHARS {
        warnings.push(format!("Titre trop court (< {MIN_TITLE_CHARS} caractères)"));
    } else if title_length > MAX_TITLE_CHARS {
        warnings.push(format!("Titre trop long (> {MAX_TITLE_CHARS} caractères)"));
    }

    if content_length < MIN_CONTENT_CHARS {
        warnings.push(format!(
            "Contenu trop court ({content_length}/2000-2500 caractères)"
        ));
    } else if content_length > MAX_CONTENT_CHARS {
        warnings.push(format!(
            "Contenu trop long ({content_length}/2000-2500 caractères)"
        ));
    }

    FormatReport {
        title_length,
        content_length,
        warnings,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Enigma
// ────────────────────────────────────────────────────────────────────────────

const POETIC_WORDS: &[&str] = &["où", "là", "garde", "secret", "trésor", "mystère"];
const CULTURAL_WORDS: &[&str] = &[
    "temple", "château", "église", "pyramide", "pharaon", "roi", "empereur", "légende",
];
const GEOGRAPHIC_WORDS: &[&str] = &[
    "nord", "sud", "est", "ouest", "soleil", "ombre", "montagne", "rivière", "mer",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnigmaCriteria {
    pub poetic_style: bool,
    pub cultural_references: bool,
    pub word_play: bool,
    pub geographic_clues: bool,
    pub appropriate_length: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnigmaReport {
    pub enigma: String,
    pub score: u32,
    pub criteria: EnigmaCriteria,
    pub is_valid: bool,
    pub suggestions: Vec<String>,
}

pub fn validate_enigma(enigma: &str) -> EnigmaReport {
    let lower = enigma.to_lowercase();
    let length = enigma.chars().count();

    let criteria = EnigmaCriteria {
        poetic_style: contains_any(&lower, POETIC_WORDS),
        cultural_references: contains_any(&lower, CULTURAL_WORDS),
        word_play: enigma.contains("...") || enigma.contains(';') || enigma.contains('\n'),
        geographic_clues: contains_any(&lower, GEOGRAPHIC_WORDS),
        appropriate_length: (MIN_ENIGMA_CHARS..=MAX_ENIGMA_CHARS).contains(&length),
    };
    let score = points(&[
        criteria.poetic_style,
        criteria.cultural_references,
        criteria.word_play,
        criteria.geographic_clues,
        criteria.appropriate_length,
    ]);

    let mut suggestions = Vec::new();
    if !criteria.poetic_style {
        suggestions.push("Ajouter des éléments poétiques (rimes, rythme)".to_string());
    }
    if !criteria.cultural_references {
        suggestions.push("Intégrer des références culturelles/historiques".to_string());
    }
    if !criteria.word_play {
        suggestions.push("Développer les jeux de mots et double sens".to_string());
    }

    EnigmaReport {
        enigma: enigma.to_string(),
        score,
        criteria,
        is_valid: score >= PASSING_SCORE,
        suggestions,
    }
}

static QUOTED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"«\s*([^»]{20,}?)\s*»", r"“([^”]{20,})”", r#""([^"]{20,})""#]
        .into_iter()
        .map(|p| Regex::new(p).expect("quote pattern must compile"))
        .collect()
});

/// First quoted passage of at least 20 characters (guillemets, curly or straight quotes).
pub fn extract_enigma(text: &str) -> Option<String> {
    QUOTED
        .iter()
        .find_map(|re| re.captures(text))
        .map(|caps| caps[1].trim().to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Cultural context
// ────────────────────────────────────────────────────────────────────────────

const PROBLEMATIC_TERMS: &[&str] = &["primitif", "sauvage", "arriéré", "bizarre"];
const HISTORICAL_MARKERS: &[&str] = &["siècle", "époque", "ancien", "tradition", "histoire"];
const RESPECTFUL_TERMS: &[&str] = &["respectueusement", "tradition", "culture", "heritage", "héritage", "local"];
const EDUCATIONAL_TERMS: &[&str] = &["apprendre", "découvrir", "comprendre", "signifie", "représente"];

/// Theme key (accent-folded) and the details expected for it.
const THEME_KEYWORDS: &[(&str, &[&str])] = &[
    ("egypte", &["pharaon", "pyramide", "nil", "hiéroglyphe", "temple"]),
    ("grece", &["temple", "colonne", "mythologie", "oracle", "agora"]),
    ("perou", &["inca", "machu picchu", "andes", "quechua", "llama"]),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CulturalCriteria {
    pub respectful_language: bool,
    pub historical_accuracy: bool,
    pub cultural_sensitivity: bool,
    pub educational_value: bool,
    pub authentic_details: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CulturalReport {
    pub theme: String,
    pub score: u32,
    pub criteria: CulturalCriteria,
    pub is_appropriate: bool,
    pub issues: Vec<String>,
}

pub fn validate_cultural_context(content: &str, theme: &str) -> CulturalReport {
    let lower = content.to_lowercase();
    let folded_theme = fold_accents(&theme.to_lowercase());

    let authentic_details = THEME_KEYWORDS
        .iter()
        .find(|(key, _)| folded_theme.contains(key))
        .is_some_and(|(_, keywords)| contains_any(&lower, keywords));

    let criteria = CulturalCriteria {
        respectful_language: !contains_any(&lower, PROBLEMATIC_TERMS),
        historical_accuracy: contains_any(&lower, HISTORICAL_MARKERS),
        cultural_sensitivity: contains_any(&lower, RESPECTFUL_TERMS),
        educational_value: contains_any(&lower, EDUCATIONAL_TERMS),
        authentic_details,
    };

    let mut issues = Vec::new();
    if !criteria.respectful_language {
        issues.push("Utilisation de termes potentiellement irrespectueux".to_string());
    }
    if !criteria.cultural_sensitivity {
        issues.push("Manque d'expressions de respect culturel".to_string());
    }

    let score = points(&[
        criteria.respectful_language,
        criteria.historical_accuracy,
        criteria.cultural_sensitivity,
        criteria.educational_value,
        criteria.authentic_details,
    ]);

    CulturalReport {
        theme: theme.to_string(),
        score,
        criteria,
        is_appropriate: score >= PASSING_SCORE,
        issues,
    }
}

/// Book-level tool output stored in metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolReports {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enigma: Option<EnigmaReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cultural: Option<CulturalReport>,
    /// Sections carrying at least one format warning.
    #[serde(default)]
    pub sections_with_warnings: Vec<usize>,
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn points(criteria: &[bool]) -> u32 {
    criteria.iter().filter(|c| **c).count() as u32 * CRITERION_POINTS
}

fn fold_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' | 'á' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' | 'í' => 'i',
            'ô' | 'ö' | 'ó' => 'o',
            'ù' | 'û' | 'ü' | 'ú' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_names() {
        let names: Vec<&str> = ToolKind::ALL.iter().map(ToolKind::name).collect();
        assert_eq!(
            names,
            vec![
                "section_formatter",
                "enigma_validator",
                "cultural_context_validator"
            ]
        );
    }

    #[test]
    fn test_format_short_title_and_content() {
        let report = check_section_format("**Nil**", "Court.");
        assert_eq!(report.title_length, 3);
        assert_eq!(report.content_length, 6);
        assert_eq!(
            report.warnings,
            vec![
                "Titre trop court (< 5 caractères)".to_string(),
                "Contenu trop court (6/2000-2500 caractères)".to_string(),
            ]
        );
    }

    #[test]
    fn test_format_within_bounds() {
        let body = "é".repeat(2000);
        let report = check_section_format("La Vallée des Rois", &body);
        assert_eq!(report.content_length, 2000);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_format_long_title_and_content() {
        let report = check_section_format(&"t".repeat(51), &"x".repeat(3001));
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].starts_with("Titre trop long"));
        assert!(report.warnings[1].starts_with("Contenu trop long (3001/"));
    }

    #[test]
    fn test_enigma_full_marks() {
        let enigma = "Là où le soleil épouse la montagne,\nle pharaon garde son secret...";
        let report = validate_enigma(enigma);
        assert_eq!(report.score, 100);
        assert!(report.is_valid);
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_enigma_weak() {
        let report = validate_enigma("Cherchez bien.");
        assert_eq!(report.score, 0);
        assert!(!report.is_valid);
        assert_eq!(report.suggestions.len(), 3);
        assert_eq!(report.criteria, EnigmaCriteria::default());
    }

    #[test]
    fn test_enigma_passes_at_sixty() {
        // poetic + word play + length
        let report = validate_enigma("Deux gardiens veillent; leur secret dort sous la dune immobile");
        assert!(report.criteria.poetic_style);
        assert!(report.criteria.word_play);
        assert!(report.criteria.appropriate_length);
        assert!(!report.criteria.cultural_references);
        assert!(!report.criteria.geographic_clues);
        assert_eq!(report.score, 60);
        assert!(report.is_valid);
    }

    #[test]
    fn test_extract_enigma_prefers_guillemets() {
        let text = "Philippe Gildas lit : « Là où le soleil épouse la montagne » puis \"Un autre passage assez long pour compter\"";
        assert_eq!(
            extract_enigma(text).as_deref(),
            Some("Là où le soleil épouse la montagne")
        );
        assert_eq!(extract_enigma("« court »"), None);
    }

    #[test]
    fn test_extract_enigma_straight_quotes() {
        let text = "L'énigme : \"Trois gardiens de pierre veillent sur le secret\".";
        assert_eq!(
            extract_enigma(text).as_deref(),
            Some("Trois gardiens de pierre veillent sur le secret")
        );
    }

    #[test]
    fn test_cultural_theme_matches_despite_accents() {
        let content = "Au pied de la pyramide, un guide local nous aide à comprendre \
                       cette tradition vieille de quarante siècles.";
        let report = validate_cultural_context(content, "Les Mystères d'Égypte");
        assert!(report.criteria.authentic_details);
        assert_eq!(report.score, 100);
        assert!(report.is_appropriate);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_cultural_flags_disrespectful_language() {
        let report = validate_cultural_context("Un peuple sauvage et bizarre.", "Le Trésor Inca");
        assert!(!report.criteria.respectful_language);
        assert!(!report.criteria.authentic_details);
        assert_eq!(report.score, 0);
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn test_cultural_unknown_theme_gets_no_detail_points() {
        let report = validate_cultural_context("Une tradition ancienne.", "L'Atlantide");
        assert!(!report.criteria.authentic_details);
        assert_eq!(report.score, 60);
    }
}
