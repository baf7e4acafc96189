//! Record-mutation directives embedded in judge completions.
//!
//! A directive is a fenced block tagged `json_update` holding one JSON object:
//!
//! ````text
//! ```json_update
//! {"field": "Relief_Granted.Primary_Relief.Amount", "value": 7500, "reason": "revised"}
//! ```
//! ````
//!
//! Blocks are removed from the text whether or not they parse. Valid ones are
//! applied left to right, each seeing the effect of the ones before it.

use serde_json::Value;
use tracing::{debug, warn};

use crate::{record::CaseRecord, types::Mutation};

pub const DIRECTIVE_TAG: &str = "json_update";

const FENCE: &str = "```";
const NO_REASON: &str = "No reason provided";

/// Result of [`apply_directives`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DirectiveOutcome {
    /// The input with every directive block removed, trimmed.
    pub clean_text: String,
    /// Applied mutations, in order of appearance.
    pub mutations: Vec<Mutation>,
    /// Blocks that were stripped but not applied.
    pub skipped: usize,
}

/// One fenced block located in a completion.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveBlock<'a> {
    /// Byte range of the whole block, fences included.
    pub span: std::ops::Range<usize>,
    /// Trimmed text between the tag and the closing fence.
    pub body: &'a str,
}

/// Locate every `json_update` block. An unterminated block ends the scan and
/// is left in place.
pub fn find_blocks(text: &str) -> Vec<DirectiveBlock<'_>> {
    let opener = format!("{FENCE}{DIRECTIVE_TAG}");
    let mut blocks = Vec::new();
    let mut pos = 0;

    while let Some(rel) = text[pos..].find(&opener) {
        let start = pos + rel;
        let after_tag = start + opener.len();
        // `json_updates` or similar is a different tag.
        let tag_ends = text[after_tag..]
            .chars()
            .next()
            .is_some_and(|c| c.is_whitespace() || c == '{');
        if !tag_ends {
            pos = after_tag;
            continue;
        }
        let Some(close) = closing_fence(text, after_tag) else {
            break;
        };
        blocks.push(DirectiveBlock {
            span: start..close + FENCE.len(),
            body: text[after_tag..close].trim(),
        });
        pos = close + FENCE.len();
    }

    blocks
}

/// Byte offset of the fence that closes a block whose body starts at `from`.
///
/// Values may themselves contain fences, so the first fence directly after a
/// `}` whose body parses as JSON wins. Failing that, the first fence after a
/// `}`, then the first fence at all, so malformed blocks are still stripped.
fn closing_fence(text: &str, from: usize) -> Option<usize> {
    let mut first_fence = None;
    let mut first_after_brace = None;
    let mut search = from;

    while let Some(rel) = text[search..].find(FENCE) {
        let at = search + rel;
        first_fence.get_or_insert(at);
        let body = text[from..at].trim();
        if body.ends_with('}') {
            first_after_brace.get_or_insert(at);
            if serde_json::from_str::<Value>(body).is_ok() {
                return Some(at);
            }
        }
        search = at + FENCE.len();
    }

    first_after_brace.or(first_fence)
}

/// Parse a block body into a mutation. `None` when the body is malformed or
/// names no field or a null value.
pub fn parse_block(body: &str) -> Option<Mutation> {
    let parsed: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, body_len = body.len(), "skipping malformed directive block");
            return None;
        },
    };
    let Value::Object(mut obj) = parsed else {
        warn!("skipping malformed directive block: not a JSON object");
        return None;
    };

    let field = match obj.get("field") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => {
            debug!("ignoring directive without a field");
            return None;
        },
    };
    let value = match obj.remove("value") {
        Some(v) if !v.is_null() => v,
        _ => {
            debug!(field = %field, "ignoring directive with null value");
            return None;
        },
    };
    let reason = match obj.get("reason") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::Null) | None => NO_REASON.to_string(),
        Some(other) => other.to_string(),
    };

    Some(Mutation { field, value, reason })
}

/// Strip every directive block from `text` and apply the valid ones to
/// `record` in order of appearance.
pub fn apply_directives(text: &str, record: &mut CaseRecord) -> DirectiveOutcome {
    let blocks = find_blocks(text);
    let mut outcome = DirectiveOutcome::default();
    let mut clean = String::with_capacity(text.len());
    let mut cursor = 0;

    for block in &blocks {
        clean.push_str(&text[cursor..block.span.start]);
        cursor = block.span.end;

        let Some(mutation) = parse_block(block.body) else {
            outcome.skipped += 1;
            continue;
        };
        match record.set(&mutation.field, mutation.value.clone()) {
            Ok(_) => {
                debug!(field = %mutation.field, "applied record directive");
                outcome.mutations.push(mutation);
            },
            Err(e) => {
                warn!(field = %mutation.field, "rejecting directive: {e:#}");
                outcome.skipped += 1;
            },
        }
    }
    clean.push_str(&text[cursor..]);

    outcome.clean_text = clean.trim().to_string();
    outcome
}
