// All LLM prompt templates for the generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{ERA_INSTRUCTION, READER_ROLE_INSTRUCTION};

/// Replace `{theme}` before sending.
pub const INTRO_PROMPT_TEMPLATE: &str = r#"Tu rédiges l'introduction de "La Chasse au Trésor" (1981-1984) pour l'aventure : {theme}

ÉLÉMENTS OBLIGATOIRES :
- Philippe Gildas accueille les téléspectateurs ET les candidats (le lecteur)
- Présentation du thème avec son contexte culturel et historique
- Philippe de Dieuleveult déjà prêt sur le terrain, en hélicoptère, contact radio établi
- LECTURE DE L'ÉNIGME PRINCIPALE par Philippe Gildas, entre guillemets « ... »
- Explication du rôle des candidats : résoudre l'énigme, guider Philippe
- Finir par "L'aventure peut commencer !" ou "À vous de jouer !"

ÉNIGME STYLE JACQUES ANTOINE :
- Format poétique, en vers ou en prose élégante
- Références culturelles et historiques subtiles, jeux de mots, indices géographiques cachés
- Exemple : « Là où le soleil épouse la montagne... »

STYLE PHILIPPE GILDAS :
- "Mesdames, messieurs, bonsoir depuis notre studio parisien"
- "Vous, nos candidats, vous allez devoir..."
- "Voyons ce que nous dit l'énigme..."
"#;

/// Replace `{theme}`, `{number}`, `{section_type}`, `{index}`, `{total}` before sending.
pub const SECTION_PROMPT_TEMPLATE: &str = r#"Tu écris une section du livre d'aventure "La Chasse au Trésor" (1981-1984).

AVENTURE : {theme}
SECTION : #{number} ({section_type})
PROGRESSION : Section {index} sur {total}

FORMAT OBLIGATOIRE :
#{number}
**[Titre évocateur de 3 à 8 mots]**

[Texte narratif de 2000 à 2500 caractères (300 à 400 mots)]

STRUCTURE TYPIQUE :
1. Philippe Gildas présente la situation depuis le studio
2. Contact radio avec Philippe de Dieuleveult : "Allô Paris ? Je vous reçois !"
3. Philippe décrit ce qu'il voit : paysage, indices, rencontres
4. Une énigme est présentée aux candidats
5. Les candidats choisissent les instructions à donner à Philippe

ÉLÉMENTS AUTHENTIQUES : studio parisien avec cartes et livres d'histoire, combinaison
rouge, hélicoptère, radio grésillante, "C'est fantastique ! Quelle merveille !"
"#;

/// Replace `{theme}` and `{content}` before sending.
pub const REVIEW_PROMPT_TEMPLATE: &str = r#"Tu es un expert de l'émission "La Chasse au Trésor" (1981-1984). Tu analyses ce livre d'aventure sur le thème : {theme}

CONTENU À RÉVISER :
{content}

CRITÈRES (chacun noté de 0 à 100) :
1. AUTHENTICITÉ : Philippe Gildas en studio, Philippe de Dieuleveult sur le terrain,
   contacts radio, énigme style Jacques Antoine, lecteur = candidats
2. QUALITÉ NARRATIVE : immersion, descriptions culturelles, suspense, cohérence des choix
3. RESPECT DES ANNÉES 80 : technologie d'époque, aucune référence moderne, ton familial

Réponds avec cet objet JSON EXACT :
{
  "overall_score": 0,
  "authenticity_score": 0,
  "narrative_quality": 0,
  "format_compliance": 0,
  "needs_improvement": false,
  "suggestions": ["..."],
  "strengths": ["..."],
  "weaknesses": ["..."]
}
"#;

/// Replace `{theme}`, `{total}`, `{first_third}`, `{second_third}`, `{final_third}`.
pub const CONCEPTION_TASK_TEMPLATE: &str = r#"Conçois l'aventure "La Chasse au Trésor" : {theme}, en {total} sections.

Livrables :
- L'énigme principale, style Jacques Antoine, entre guillemets « ... »
- Le trésor final et sa signification culturelle
- Le découpage en trois actes :
  * sections 1-{first_third} : arrivée et découverte
  * sections {second_third} : exploration et fausses pistes
  * sections {final_third} : résolution et découverte du trésor
- Trois ou quatre lieux authentiques et leurs indices
"#;

/// Replace `{theme}`.
pub const INTRODUCTION_TASK_TEMPLATE: &str = r#"Écris l'introduction en studio de l'aventure : {theme}

Philippe Gildas accueille les candidats depuis le studio parisien, présente le thème,
établit le contact radio avec Philippe de Dieuleveult et LIT l'énigme principale conçue
par Jacques Antoine (reprends-la mot pour mot, entre guillemets « ... »).
Termine par "L'aventure peut commencer !".
"#;

/// Replace `{theme}`, `{total}`, `{first_third}`, `{second_third}`, `{final_third}`.
pub const SECTIONS_TASK_TEMPLATE: &str = r#"Écris les {total} sections numérotées de l'aventure : {theme}

Respecte le découpage : sections 1-{first_third} (arrivée), {second_third} (exploration),
{final_third} (résolution).

FORMAT OBLIGATOIRE pour CHAQUE section, sans rien entre les sections :
#01
**Titre évocateur de 3 à 8 mots**

Texte narratif de 1500 à 2500 caractères : studio, contact radio, description du
terrain, indice ou énigme, décision des candidats.

#02
**...**

Écris toutes les sections de #01 à #{total_padded}, dans l'ordre.
"#;

/// Replace `{theme}`, `{total}`.
pub const REVISION_TASK_TEMPLATE: &str = r#"En tant que réalisateur, révise l'aventure "{theme}" ({total} sections).

Donne une note sur 100 pour chaque critère, sous la forme "critère : note" :
- Authenticité de l'émission
- Cohérence narrative
- Qualité globale
Puis liste les points forts, les faiblesses et tes suggestions.
"#;

/// Where a section sits in the adventure; steers its prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Discovery,
    Exploration,
    Finale,
}

impl SectionKind {
    pub fn for_position(number: usize, total: usize) -> Self {
        if number == 1 {
            SectionKind::Discovery
        } else if number == total {
            SectionKind::Finale
        } else {
            SectionKind::Exploration
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Discovery => "Découverte du lieu",
            SectionKind::Exploration => "Exploration et énigme",
            SectionKind::Finale => "Résolution finale",
        }
    }
}

/// Section boundaries of the three acts, as rendered in crew prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thirds {
    pub first: String,
    pub second: String,
    pub last: String,
}

impl Thirds {
    pub fn of(total: usize) -> Self {
        let first = total / 3;
        let second = 2 * total / 3;
        Self {
            first: first.to_string(),
            second: format!("{}-{second}", first + 1),
            last: format!("{}-{total}", second + 1),
        }
    }
}

pub fn intro_prompt(theme: &str) -> String {
    with_constraints(INTRO_PROMPT_TEMPLATE.replace("{theme}", theme))
}

pub fn section_prompt(theme: &str, number: usize, total: usize) -> String {
    let prompt = SECTION_PROMPT_TEMPLATE
        .replace("{theme}", theme)
        .replace("{number}", &format!("{number:02}"))
        .replace("{section_type}", SectionKind::for_position(number, total).label())
        .replace("{index}", &number.to_string())
        .replace("{total}", &total.to_string());
    with_constraints(prompt)
}

pub fn review_prompt(theme: &str, content: &str) -> String {
    REVIEW_PROMPT_TEMPLATE
        .replace("{theme}", theme)
        .replace("{content}", content)
}

/// Fills the crew templates' shared placeholders.
pub fn fill_crew_template(template: &str, theme: &str, total: usize) -> String {
    let thirds = Thirds::of(total);
    template
        .replace("{theme}", theme)
        .replace("{total_padded}", &format!("{total:02}"))
        .replace("{total}", &total.to_string())
        .replace("{first_third}", &thirds.first)
        .replace("{second_third}", &thirds.second)
        .replace("{final_third}", &thirds.last)
}

pub fn with_constraints(prompt: String) -> String {
    format!("{prompt}\n{READER_ROLE_INSTRUCTION}\n\n{ERA_INSTRUCTION}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_kind_by_position() {
        assert_eq!(SectionKind::for_position(1, 5), SectionKind::Discovery);
        assert_eq!(SectionKind::for_position(3, 5), SectionKind::Exploration);
        assert_eq!(SectionKind::for_position(5, 5), SectionKind::Finale);
        // a one-section book opens on discovery
        assert_eq!(SectionKind::for_position(1, 1), SectionKind::Discovery);
    }

    #[test]
    fn test_thirds() {
        assert_eq!(
            Thirds::of(15),
            Thirds {
                first: "5".into(),
                second: "6-10".into(),
                last: "11-15".into()
            }
        );
        assert_eq!(Thirds::of(4).second, "2-2");
    }

    #[test]
    fn test_section_prompt_fills_every_placeholder() {
        let prompt = section_prompt("Le Trésor Inca", 3, 12);
        assert!(prompt.contains("SECTION : #03 (Exploration et énigme)"));
        assert!(prompt.contains("Section 3 sur 12"));
        assert!(prompt.contains("Le Trésor Inca"));
        assert!(prompt.contains("CANDIDATS EN STUDIO"));
        assert!(!prompt.contains('{'));
    }

    #[test]
    fn test_crew_template_fills_thirds() {
        let prompt = fill_crew_template(SECTIONS_TASK_TEMPLATE, "L'Atlantide", 9);
        assert!(prompt.contains("sections 1-3 (arrivée), 4-6 (exploration)"));
        assert!(prompt.contains("7-9 (résolution)"));
        assert!(prompt.contains("de #01 à #09"));
        assert!(!prompt.contains("{total"));
    }

    #[test]
    fn test_review_prompt_embeds_content() {
        let prompt = review_prompt("Égypte", "INTRODUCTION:\nBonsoir");
        assert!(prompt.contains("INTRODUCTION:\nBonsoir"));
        assert!(prompt.contains("\"authenticity_score\""));
    }
}
