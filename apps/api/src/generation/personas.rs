//! Crew personas and the four tasks they run, in order.
//!
//! Each task is bound to one persona whose role/goal/backstory becomes the system
//! prompt. Tool assignments are informational: tools run after the crew finishes.

use crate::generation::prompts::{
    fill_crew_template, with_constraints, CONCEPTION_TASK_TEMPLATE, INTRODUCTION_TASK_TEMPLATE,
    REVISION_TASK_TEMPLATE, SECTIONS_TASK_TEMPLATE,
};
use crate::generation::tools::ToolKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persona {
    JacquesAntoine,
    PhilippeGildas,
    PhilippeDeDieuleveult,
    RealisateurTv,
}

/// Role, goal and backstory for one persona.
#[derive(Debug, Clone)]
pub struct PersonaProfile {
    pub key: &'static str,
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub tools: &'static [ToolKind],
}

impl Persona {
    pub const ALL: [Persona; 4] = [
        Persona::JacquesAntoine,
        Persona::PhilippeGildas,
        Persona::PhilippeDeDieuleveult,
        Persona::RealisateurTv,
    ];

    pub fn profile(&self) -> PersonaProfile {
        match self {
            Persona::JacquesAntoine => PersonaProfile {
                key: "jacques_antoine",
                role: "Concepteur de l'émission et auteur des énigmes",
                goal: "Concevoir une aventure cohérente et une énigme poétique riche en références culturelles",
                backstory: "Créateur de La Chasse au Trésor, tu écris des énigmes en vers où chaque mot cache un indice géographique ou historique.",
                tools: &[ToolKind::EnigmaValidator, ToolKind::CulturalContextValidator],
            },
            Persona::PhilippeGildas => PersonaProfile {
                key: "philippe_gildas",
                role: "Présentateur en studio",
                goal: "Accueillir les candidats, lire l'énigme et animer le contact radio",
                backstory: "Animateur chaleureux et pédagogue, tu tiens le studio parisien et tu guides les candidats face aux cartes et aux livres d'histoire.",
                tools: &[],
            },
            Persona::PhilippeDeDieuleveult => PersonaProfile {
                key: "philippe_dieuleveult",
                role: "Aventurier sur le terrain",
                goal: "Faire vivre chaque lieu avec enthousiasme et précision",
                backstory: "En combinaison rouge, tu sautes de l'hélicoptère et décris avec émerveillement les paysages et les habitants que tu rencontres.",
                tools: &[ToolKind::SectionFormatter],
            },
            Persona::RealisateurTv => PersonaProfile {
                key: "realisateur_tv",
                role: "Réalisateur de l'émission",
                goal: "Garantir l'authenticité, le rythme et la qualité du livre",
                backstory: "Réalisateur exigeant des années 80, tu relis chaque épisode pour vérifier le ton, le format et la fidélité à l'esprit de l'émission.",
                tools: &[ToolKind::SectionFormatter],
            },
        }
    }

    /// Tools assigned to at least one persona, in [`ToolKind::ALL`] order.
    pub fn crew_tools() -> Vec<ToolKind> {
        ToolKind::ALL
            .into_iter()
            .filter(|tool| {
                Persona::ALL
                    .iter()
                    .any(|persona| persona.profile().tools.contains(tool))
            })
            .collect()
    }

    pub fn system_prompt(&self) -> String {
        let profile = self.profile();
        format!(
            "Tu es {} : {}.\nObjectif : {}\nContexte : {}",
            self.display_name(),
            profile.role,
            profile.goal,
            profile.backstory
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Persona::JacquesAntoine => "Jacques Antoine",
            Persona::PhilippeGildas => "Philippe Gildas",
            Persona::PhilippeDeDieuleveult => "Philippe de Dieuleveult",
            Persona::RealisateurTv => "le réalisateur TV",
        }
    }
}

/// The crew's sequential tasks. Each sees the outputs of those before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrewTask {
    Conception,
    Introduction,
    Sections,
    Revision,
}

impl CrewTask {
    pub const ORDER: [CrewTask; 4] = [
        CrewTask::Conception,
        CrewTask::Introduction,
        CrewTask::Sections,
        CrewTask::Revision,
    ];

    pub fn persona(&self) -> Persona {
        match self {
            CrewTask::Conception => Persona::JacquesAntoine,
            CrewTask::Introduction => Persona::PhilippeGildas,
            CrewTask::Sections => Persona::PhilippeDeDieuleveult,
            CrewTask::Revision => Persona::RealisateurTv,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CrewTask::Conception => "CONCEPTION DE L'AVENTURE",
            CrewTask::Introduction => "INTRODUCTION STUDIO",
            CrewTask::Sections => "SECTIONS TERRAIN",
            CrewTask::Revision => "RÉVISION QUALITÉ",
        }
    }

    /// Task prompt, followed by the earlier tasks' outputs as context.
    pub fn prompt(&self, theme: &str, total: usize, previous: &[(CrewTask, String)]) -> String {
        let template = match self {
            CrewTask::Conception => CONCEPTION_TASK_TEMPLATE,
            CrewTask::Introduction => INTRODUCTION_TASK_TEMPLATE,
            CrewTask::Sections => SECTIONS_TASK_TEMPLATE,
            CrewTask::Revision => REVISION_TASK_TEMPLATE,
        };
        let mut prompt = with_constraints(fill_crew_template(template, theme, total));

        if !previous.is_empty() {
            prompt.push_str("\nCONTEXTE (travaux précédents de l'équipe) :\n");
            for (task, output) in previous {
                prompt.push_str(&format!("\n=== {} ===\n{}\n", task.title(), output.trim()));
            }
        }
        prompt
    }
}
