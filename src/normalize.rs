//! Normalization pre-pass ("material conversion").
//!
//! Produces a cleaned copy of a BC3 record stream before the tree is built:
//! - codes longer than [`MAX_CODE_LEN`] are shortened everywhere they appear
//! - labor, machinery and material breakdowns collapse to material
//! - every descendant of a real line item is forced to material
//! - priced concepts with an empty unit get [`DEFAULT_UNIT`]
//! - descriptions and finally whole lines go through the sanitizer

use std::collections::{HashMap, HashSet};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::constants::{
    DEFAULT_UNIT, FIELD_SEPARATOR, MAX_CODE_LEN, SUBFIELD_SEPARATOR, SUBGROUP_MARKER, type_codes,
};
use crate::reader::RecordTag;
use crate::sanitize::clean_text;

/// Normalized lines with the counters of what changed
#[derive(Debug, Clone)]
pub struct NormalizeResult {
    pub lines: Vec<String>,
    pub stats: NormalizeStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Distinct codes shortened to [`MAX_CODE_LEN`]
    pub codes_shortened: usize,
    /// Shortened codes that share a prefix with another shortened code
    pub collisions: usize,
    /// `~C` records whose type was rewritten to material
    pub forced_material: usize,
    /// `~C` records that received the default unit
    pub units_filled: usize,
}

/// Information gathered in the first pass over the records
#[derive(Debug, Default)]
struct CollectedInfo {
    /// long code -> shortened code
    code_map: HashMap<String, String>,
    /// code -> type field of its last definition
    type_map: HashMap<String, String>,
    /// parent code -> child codes in declaration order
    children_map: HashMap<String, Vec<String>>,
}

/// Normalize a full BC3 record stream
pub fn normalize<S: AsRef<str>>(lines: &[S]) -> NormalizeResult {
    let info = collect_info(lines);
    let force_material = compute_force_material(&info.type_map, &info.children_map);
    let substitution = code_substitution(&info.code_map);

    let mut stats = NormalizeStats {
        codes_shortened: info.code_map.len(),
        collisions: count_collisions(&info.code_map),
        ..Default::default()
    };

    let lines = lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            let rewritten = match RecordTag::of(line) {
                RecordTag::Concept => rewrite_concept(line, &info, &force_material, &mut stats)
                    .unwrap_or_else(|| line.to_string()),
                _ => match &substitution {
                    Some(pattern) => substitute_codes(line, pattern, &info.code_map),
                    None => line.to_string(),
                },
            };
            clean_text(&rewritten)
        })
        .collect();

    info!(
        "Normalized records: {} codes shortened, {} forced to material, {} units filled",
        stats.codes_shortened, stats.forced_material, stats.units_filled
    );
    NormalizeResult { lines, stats }
}

/// Shorten a code to the maximum identifier length
pub fn shorten_code(code: &str) -> String {
    code.chars().take(MAX_CODE_LEN).collect()
}

/// Shorten every code longer than [`MAX_CODE_LEN`] wherever it appears,
/// leaving the rest of each record untouched
pub fn shorten_codes<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let info = collect_info(lines);
    let Some(pattern) = code_substitution(&info.code_map) else {
        return lines.iter().map(|l| l.as_ref().to_string()).collect();
    };
    count_collisions(&info.code_map);
    debug!("Shortening {} long codes", info.code_map.len());

    lines
        .iter()
        .map(|line| {
            let line = line.as_ref();
            match RecordTag::of(line) {
                RecordTag::Concept => shorten_concept_code(line, &info.code_map)
                    .unwrap_or_else(|| line.to_string()),
                _ => substitute_codes(line, &pattern, &info.code_map),
            }
        })
        .collect()
}

/// Replace the code field of a `~C` record, if it is a long code
fn shorten_concept_code(line: &str, code_map: &HashMap<String, String>) -> Option<String> {
    let (head, rest) = line.split_once(FIELD_SEPARATOR)?;
    let (code, tail) = rest.split_once(FIELD_SEPARATOR)?;
    let short = code_map.get(code)?;
    Some(format!(
        "{head}{sep}{short}{sep}{tail}",
        sep = FIELD_SEPARATOR
    ))
}

fn collect_info<S: AsRef<str>>(lines: &[S]) -> CollectedInfo {
    let mut info = CollectedInfo::default();

    for line in lines {
        let line = line.as_ref();
        match RecordTag::of(line) {
            RecordTag::Concept => {
                let Some(parts) = concept_fields(line) else {
                    continue;
                };
                let code = parts[0];
                info.type_map.insert(code.to_string(), parts[5].to_string());
                if code.chars().count() > MAX_CODE_LEN {
                    info.code_map.insert(code.to_string(), shorten_code(code));
                }
            }
            RecordTag::Decomposition => {
                let parsed = line
                    .split_once(FIELD_SEPARATOR)
                    .and_then(|(_, rest)| rest.split_once(FIELD_SEPARATOR));
                let Some((parent, child_part)) = parsed else {
                    continue;
                };
                let chunks: Vec<&str> = child_part
                    .trim_end_matches(FIELD_SEPARATOR)
                    .split(SUBFIELD_SEPARATOR)
                    .collect();
                let children = info.children_map.entry(parent.to_string()).or_default();
                children.extend(
                    chunks
                        .chunks(3)
                        .map(|triple| triple[0].trim())
                        .filter(|code| !code.is_empty())
                        .map(str::to_string),
                );
            }
            _ => {}
        }
    }

    debug!(
        "Collected {} concept types, {} parents, {} long codes",
        info.type_map.len(),
        info.children_map.len(),
        info.code_map.len()
    );
    info
}

/// Every descendant, at any depth, of a line item outside the chapter tree
fn compute_force_material(
    type_map: &HashMap<String, String>,
    children_map: &HashMap<String, Vec<String>>,
) -> HashSet<String> {
    let mut forced = HashSet::new();

    let line_items = type_map
        .iter()
        .filter(|(code, kind)| kind.as_str() == type_codes::LINE_ITEM && !code.contains(SUBGROUP_MARKER))
        .map(|(code, _)| code.as_str());

    for line_item in line_items {
        let mut stack = vec![line_item];
        while let Some(code) = stack.pop() {
            for child in children_map.get(code).into_iter().flatten() {
                if forced.insert(child.clone()) {
                    stack.push(child.as_str());
                }
            }
        }
    }
    forced
}

fn rewrite_concept(
    line: &str,
    info: &CollectedInfo,
    force_material: &HashSet<String>,
    stats: &mut NormalizeStats,
) -> Option<String> {
    let (head, rest) = line.split_once(FIELD_SEPARATOR)?;
    let mut parts: Vec<String> = rest.split(FIELD_SEPARATOR).map(str::to_string).collect();
    if parts.len() < 6 {
        return None;
    }

    let original_code = parts[0].clone();
    if let Some(short) = info.code_map.get(&original_code) {
        parts[0] = short.clone();
    }

    let original_type = parts[5].clone();
    if type_codes::BREAKDOWNS.contains(&parts[5].as_str()) || force_material.contains(&original_code) {
        parts[5] = type_codes::MATERIAL.to_string();
    }
    if parts[5] != original_type {
        stats.forced_material += 1;
    }

    if type_codes::PRICED.contains(&parts[5].as_str()) && parts[1].trim().is_empty() {
        parts[1] = DEFAULT_UNIT.to_string();
        stats.units_filled += 1;
    }

    parts[2] = clean_text(&parts[2]);

    Some(format!(
        "{}{}{}",
        head,
        FIELD_SEPARATOR,
        parts.join(&FIELD_SEPARATOR.to_string())
    ))
}

/// Regex matching any long code followed by a field or sub-field separator
fn code_substitution(code_map: &HashMap<String, String>) -> Option<Regex> {
    if code_map.is_empty() {
        return None;
    }

    let mut codes: Vec<&str> = code_map.keys().map(String::as_str).collect();
    // Longest first so a code never matches as the prefix of a longer one
    codes.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alternation = codes
        .iter()
        .map(|c| regex::escape(c))
        .collect::<Vec<_>>()
        .join("|");

    match Regex::new(&format!(r"({})([\\|])", alternation)) {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            warn!("Could not build code substitution pattern: {}", e);
            None
        }
    }
}

fn substitute_codes(line: &str, pattern: &Regex, code_map: &HashMap<String, String>) -> String {
    pattern
        .replace_all(line, |caps: &regex::Captures<'_>| {
            let short = code_map
                .get(&caps[1])
                .map(String::as_str)
                .unwrap_or(&caps[1]);
            format!("{}{}", short, &caps[2])
        })
        .into_owned()
}

fn count_collisions(code_map: &HashMap<String, String>) -> usize {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut collisions = 0;
    for (long, short) in code_map {
        if let Some(other) = seen.insert(short.as_str(), long.as_str()) {
            warn!(
                "Codes {} and {} both shorten to {}",
                other, long, short
            );
            collisions += 1;
        }
    }
    collisions
}

/// Fields of a `~C` record when it carries at least six of them
fn concept_fields(line: &str) -> Option<Vec<&str>> {
    let (_, rest) = line.split_once(FIELD_SEPARATOR)?;
    let parts: Vec<&str> = rest.split(FIELD_SEPARATOR).collect();
    (parts.len() >= 6).then_some(parts)
}
