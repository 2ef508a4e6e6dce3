//! Crew generator: four personas run their tasks in order, each seeing the
//! outputs before it. Advisory tools then annotate the assembled book.

use tracing::{info, warn};

use crate::book::assembler::{assemble, BookDraft};
use crate::book::extractor::{extract, SectionMap};
use crate::book::{Book, GenerationMethod, Section};
use crate::generation::personas::{CrewTask, Persona};
use crate::generation::tools::{
    check_section_format, extract_enigma, validate_cultural_context, validate_enigma,
    FormatReport, ToolReports,
};
use crate::llm_client::{LlmError, TextGenerator};

/// Raw output of each crew task, in execution order.
#[derive(Debug, Clone, Default)]
pub struct CrewOutputs {
    outputs: Vec<(CrewTask, String)>,
}

impl CrewOutputs {
    pub fn get(&self, task: CrewTask) -> &str {
        self.outputs
            .iter()
            .find(|(t, _)| *t == task)
            .map(|(_, output)| output.as_str())
            .unwrap_or_default()
    }
}

pub async fn generate_crew_book(
    llm: &dyn TextGenerator,
    theme: &str,
    total: usize,
) -> Result<Book, LlmError> {
    info!(theme, total, model = llm.model(), "crew generation started");
    let outputs = run_tasks(llm, theme, total).await?;

    let sections = extract(outputs.get(CrewTask::Sections), total);
    let format_reports = format_reports(&sections);
    let cultural_source = cultural_source(outputs.get(CrewTask::Introduction), &sections);

    let draft = BookDraft {
        theme,
        total_sections: total,
        intro_text: outputs.get(CrewTask::Introduction),
        review_text: outputs.get(CrewTask::Revision),
        method: GenerationMethod::Crew,
    };
    let mut book = assemble(&draft, sections);

    let mut reports = ToolReports::default();
    for (number, report) in format_reports {
        if !report.warnings.is_empty() {
            reports.sections_with_warnings.push(number);
        }
        if let Some(entry) = book.section_mut(number) {
            entry.validation = Some(report);
        }
    }
    reports.enigma = extract_enigma(outputs.get(CrewTask::Introduction))
        .or_else(|| extract_enigma(outputs.get(CrewTask::Conception)))
        .map(|enigma| validate_enigma(&enigma));
    reports.cultural = Some(validate_cultural_context(&cultural_source, theme));

    info!(
        sections_with_warnings = reports.sections_with_warnings.len(),
        enigma_score = reports.enigma.as_ref().map(|r| r.score),
        cultural_score = reports.cultural.as_ref().map(|r| r.score),
        "advisory tools ran"
    );

    book.metadata.agents_used = Persona::ALL
        .iter()
        .map(|p| p.profile().key.to_string())
        .collect();
    book.metadata.tools_used = Persona::crew_tools()
        .iter()
        .map(|t| t.name().to_string())
        .collect();
    book.metadata.tool_reports = Some(reports);

    Ok(book)
}

/// Runs the four tasks sequentially. The sections task is retried once when
/// nothing in its output parses as a section.
async fn run_tasks(
    llm: &dyn TextGenerator,
    theme: &str,
    total: usize,
) -> Result<CrewOutputs, LlmError> {
    let mut outputs = CrewOutputs::default();

    for task in CrewTask::ORDER {
        let system = task.persona().system_prompt();
        let prompt = task.prompt(theme, total, &outputs.outputs);

        let mut output = llm.generate(&system, &prompt).await?;
        if task == CrewTask::Sections && !has_parsed_section(&output, total) {
            warn!("Sections task output had no parseable section; retrying once");
            output = llm.generate(&system, &prompt).await?;
        }

        info!(task = ?task, chars = output.len(), "crew task finished");
        outputs.outputs.push((task, output));
    }

    Ok(outputs)
}

fn has_parsed_section(output: &str, total: usize) -> bool {
    extract(output, total).values().any(Section::is_parsed)
}

/// Format checks for every section that holds generated content.
fn format_reports(sections: &SectionMap) -> Vec<(usize, FormatReport)> {
    sections
        .values()
        .filter(|s| s.is_parsed())
        .map(|s| (s.number, check_section_format(&s.title, &s.body)))
        .collect()
}

fn cultural_source(intro: &str, sections: &SectionMap) -> String {
    std::iter::once(intro)
        .chain(sections.values().map(|s| s.body.as_str()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
