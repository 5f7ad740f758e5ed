//! Source patch-back.
//!
//! Re-derives the BC3 record stream from the original lines and the repaired
//! forest, so the file on disk describes the same tree as memory: re-parsing
//! the patched lines yields the repaired structure without another repair.
//! Codes longer than [`MAX_CODE_LEN`](crate::constants::MAX_CODE_LEN) are
//! shortened to their prefix in every written record.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

use crate::constants::{FIELD_SEPARATOR, SUBFIELD_SEPARATOR, tags, type_codes};
use crate::models::Node;
use crate::normalize::shorten_codes;
use crate::reader::RecordTag;
use crate::repair::has_synthetic_child;
use crate::sanitize::clean_text;

/// Index of the fields rewritten in a `~C` record (after the tag)
mod fields {
    pub const CODE: usize = 0;
    pub const DESCRIPTION: usize = 2;
    pub const PRICE: usize = 3;
    pub const DATE: usize = 4;
    pub const TYPE: usize = 5;
}

/// Rewrite `original_lines` so promoted nodes and their clones are persisted
pub fn patch<S: AsRef<str>>(original_lines: &[S], forest: &[Node]) -> Vec<String> {
    let promoted = promoted_clones(forest);
    if promoted.is_empty() {
        return shorten_codes(original_lines);
    }

    let mut output = Vec::with_capacity(original_lines.len() + promoted.len() * 2);
    let mut emitted: HashSet<&str> = HashSet::new();

    for line in original_lines {
        let line = line.as_ref();
        let Some((head, mut parts)) = promoted_concept(line, &promoted) else {
            output.push(line.to_string());
            continue;
        };

        let code = parts[fields::CODE].clone();
        let clone_code = promoted[code.as_str()];

        parts[fields::TYPE] = type_codes::LINE_ITEM.to_string();
        parts[fields::DESCRIPTION] = clean_text(&parts[fields::DESCRIPTION]);
        output.push(join_record(head, &parts));

        if emitted.insert(clone_code) {
            let mut clone_parts = parts;
            clone_parts[fields::CODE] = clone_code.to_string();
            clone_parts[fields::PRICE] = "1".to_string();
            clone_parts[fields::DATE] = "1".to_string();
            clone_parts[fields::TYPE] = type_codes::MATERIAL.to_string();
            output.push(join_record(head, &clone_parts));
            output.push(unit_edge(&code, clone_code));
            debug!("Persisted clone {} under {}", clone_code, code);
        }
    }

    info!(
        "Patched {} promoted concepts into {} lines",
        emitted.len(),
        output.len()
    );
    shorten_codes(&output)
}

/// Map of promoted code -> synthetic clone code across the forest
fn promoted_clones(forest: &[Node]) -> HashMap<&str, &str> {
    let mut promoted = HashMap::new();
    for root in forest {
        root.walk(0, &mut |node, _| {
            if has_synthetic_child(node) {
                promoted.insert(node.code.as_str(), node.children[0].code.as_str());
            }
        });
    }
    promoted
}

/// Split a `~C` line defining one of the promoted codes into tag and fields
fn promoted_concept<'a>(
    line: &'a str,
    promoted: &HashMap<&str, &str>,
) -> Option<(&'a str, Vec<String>)> {
    if RecordTag::of(line) != RecordTag::Concept {
        return None;
    }
    let (head, rest) = line.split_once(FIELD_SEPARATOR)?;
    let parts: Vec<String> = rest.split(FIELD_SEPARATOR).map(str::to_string).collect();
    if parts.len() <= fields::TYPE || !promoted.contains_key(parts[fields::CODE].as_str()) {
        return None;
    }
    Some((head, parts))
}

fn join_record(head: &str, parts: &[String]) -> String {
    format!(
        "{}{}{}",
        head,
        FIELD_SEPARATOR,
        parts.join(&FIELD_SEPARATOR.to_string())
    )
}

/// `~D|parent|clone\1\1\|`
fn unit_edge(parent: &str, clone: &str) -> String {
    format!(
        "{tag}{sep}{parent}{sep}{clone}{sub}1{sub}1{sub}{sep}",
        tag = tags::DECOMPOSITION,
        sep = FIELD_SEPARATOR,
        sub = SUBFIELD_SEPARATOR,
    )
}
