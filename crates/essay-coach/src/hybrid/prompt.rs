use std::fmt::Write;

use crate::essay::Essay;
use crate::rubric::{RUBRIC, TOTAL_OUT_OF};

const ROLE: &str = "You are an experienced NSW Selective School writing assessor marking work \
by students aged 9 to 11. Judge the essay against the official marking criteria, point to \
specific passages with character positions, and give before/after examples for improvements. \
Highlights are green for strengths, amber for improvements and blue for suggestions.";

const BANDS: &str = "SCORING BANDS (1-6):
- Band 6 (Outstanding): sophisticated vocabulary, complex sentences, excellent structure, engaging content
- Band 5 (High): strong vocabulary, varied sentences, clear structure, interesting ideas
- Band 4 (Sound): good vocabulary, some variety, organised structure, clear ideas
- Band 3 (Basic): simple vocabulary, basic sentences, basic structure, simple ideas
- Band 2 (Limited): very basic vocabulary, repetitive sentences, weak structure
- Band 1 (Minimal): insufficient or copied content";

const SCHEMA: &str = r#"Return ONLY a JSON object of this shape:
{
  "overallBand": number (1-6),
  "bandDescription": string,
  "criteriaScores": {
    "ideasContent": {"score": number, "outOf": 12, "band": number},
    "structureOrganization": {"score": number, "outOf": 6, "band": number},
    "languageVocab": {"score": number, "outOf": 7.5, "band": number},
    "spellingGrammar": {"score": number, "outOf": 4.5, "band": number}
  },
  "highlights": [
    {
      "type": "strength|improvement|suggestion",
      "color": "green|amber|blue",
      "text": "exact text from the essay",
      "startIndex": number,
      "endIndex": number,
      "title": string,
      "explanation": string,
      "beforeAfter": {"before": string, "after": string}
    }
  ],
  "detailedFeedback": {"strengths": [string], "areasToImprove": [string], "nextSteps": [string]},
  "vocabularyEnhancements": [
    {"original": string, "suggestion": string, "explanation": string, "position": {"start": number, "end": number}}
  ],
  "narrativeStructure": {
    "hasOrientation": boolean,
    "hasComplication": boolean,
    "hasClimax": boolean,
    "hasResolution": boolean,
    "structureNotes": string
  }
}"#;

const NO_GRAMMAR: &str =
    "Do NOT include \"grammarCorrections\"; spelling and grammar corrections come from a separate checker.";

/// Weighting lines rendered from the rubric table, e.g.
/// `- Ideas & Content: 40% of the total (12 points out of 30)`.
pub fn weighting_table() -> String {
    RUBRIC.iter().fold(String::new(), |mut table, row| {
        let _ = writeln!(
            table,
            "- {}: {}% of the total ({} points out of {})",
            row.criterion.label(),
            row.weight_percent,
            row.out_of,
            TOTAL_OUT_OF
        );
        table
    })
}

/// Fixed instruction sent as the system message on every evaluation.
pub fn system_instruction() -> String {
    format!(
        "{ROLE}\n\nOFFICIAL RUBRIC WEIGHTING (follow exactly):\n{}\n{BANDS}\n\n{NO_GRAMMAR}\n\n{SCHEMA}",
        weighting_table()
    )
}

/// User message embedding the essay, the task prompt and the text type.
pub fn user_message(essay: &Essay) -> String {
    let prompt = if essay.prompt.trim().is_empty() {
        "(no prompt supplied)"
    } else {
        essay.prompt.trim()
    };

    format!(
        "Evaluate this {text_type} writing for the NSW Selective writing test.\n\n\
         PROMPT GIVEN TO THE STUDENT:\n\"{prompt}\"\n\n\
         STUDENT'S WRITING:\n\"\"\"\n{text}\n\"\"\"\n\n\
         Word count: {words}\n\n\
         Score every criterion against these exact maxima; the total cannot exceed {total} points:\n\
         {table}\n\
         Character positions count Unicode characters from the start of the writing above.\n\
         {NO_GRAMMAR}\n\
         Return ONLY valid JSON matching the specified format.",
        text_type = essay.text_type,
        text = essay.text,
        words = essay.word_count(),
        total = TOTAL_OUT_OF,
        table = weighting_table(),
    )
}
