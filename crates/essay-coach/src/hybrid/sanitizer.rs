//! Span repair for generator output.
//!
//! Every position-bearing item is checked against the essay length in
//! characters. Invalid spans are zeroed in place; the item itself always
//! survives so its explanation stays visible.

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::domain::{GrammarCorrection, TextSpan};

/// Top-level collections whose items carry a span.
const SPAN_COLLECTIONS: [&str; 3] = ["highlights", "grammarCorrections", "vocabularyEnhancements"];
/// Nested collections inside each `feedbackCategories` entry.
const CATEGORY_COLLECTIONS: [&str; 2] = ["strengths", "areasForImprovement"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanRepairs {
    pub inspected: usize,
    pub zeroed: usize,
}

/// Validate and repair spans across every known collection of `report`.
/// Unknown or absent keys are left untouched.
pub fn sanitize_spans(report: &mut Value, essay_text: &str) -> SpanRepairs {
    let text_len = essay_text.chars().count();
    let mut repairs = SpanRepairs::default();

    let Some(object) = report.as_object_mut() else {
        return repairs;
    };

    for key in SPAN_COLLECTIONS {
        if let Some(Value::Array(items)) = object.get_mut(key) {
            repair_items(key, items, text_len, &mut repairs);
        }
    }

    if let Some(Value::Array(categories)) = object.get_mut("feedbackCategories") {
        for category in categories.iter_mut() {
            for key in CATEGORY_COLLECTIONS {
                if let Some(Value::Array(items)) = category.get_mut(key) {
                    repair_items(key, items, text_len, &mut repairs);
                }
            }
        }
    }

    if repairs.zeroed > 0 {
        warn!(
            inspected = repairs.inspected,
            zeroed = repairs.zeroed,
            text_len,
            "generator returned out-of-bounds spans; zeroed in place"
        );
    }
    repairs
}

/// Clamp typed corrections the same way; used for grammar-checker output.
pub fn sanitize_corrections(corrections: &mut [GrammarCorrection], text_len: usize) -> usize {
    let mut zeroed = 0;
    for correction in corrections.iter_mut() {
        if !correction.position.is_within(text_len) {
            correction.position = TextSpan::EMPTY;
            zeroed += 1;
        }
    }
    zeroed
}

fn repair_items(collection: &str, items: &mut [Value], text_len: usize, repairs: &mut SpanRepairs) {
    for item in items.iter_mut() {
        let Some(fields) = item.as_object_mut() else {
            continue;
        };

        // Nested `position` and flat indices are checked independently.
        let mut repaired = fields
            .get_mut("position")
            .and_then(Value::as_object_mut)
            .map(|position| repair_pair(position, "start", "end", text_len));
        if fields.contains_key("startIndex") || fields.contains_key("endIndex") {
            let valid = repair_pair(fields, "startIndex", "endIndex", text_len);
            repaired = Some(repaired.unwrap_or(true) && valid);
        }

        if let Some(valid) = repaired {
            repairs.inspected += 1;
            if !valid {
                repairs.zeroed += 1;
                debug!(collection, "span zeroed");
            }
        }
    }
}

/// Returns whether the pair was already valid; otherwise both keys are set to 0.
fn repair_pair(fields: &mut Map<String, Value>, start_key: &str, end_key: &str, text_len: usize) -> bool {
    let start = fields.get(start_key).and_then(as_index);
    let end = fields.get(end_key).and_then(as_index);

    match (start, end) {
        (Some(start), Some(end)) if TextSpan::new(start, end).is_within(text_len) => {
            fields.insert(start_key.to_string(), json!(start));
            fields.insert(end_key.to_string(), json!(end));
            true
        }
        _ => {
            fields.insert(start_key.to_string(), json!(0));
            fields.insert(end_key.to_string(), json!(0));
            false
        }
    }
}

/// Non-negative whole numbers only; `3.0` counts, `3.5`, `-1` and `"3"` do not.
fn as_index(value: &Value) -> Option<usize> {
    if let Some(index) = value.as_u64() {
        return usize::try_from(index).ok();
    }
    value
        .as_f64()
        .filter(|number| number.is_finite() && *number >= 0.0 && number.fract() == 0.0)
        .map(|number| number as usize)
}
