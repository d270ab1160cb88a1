//! Script Formatting
//!
//! Turns the raw LLM script into the line-per-sentence form the rest of the
//! pipeline consumes, and derives one image prompt per line.

use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::CoreResult;

/// Tag suffix appended to every image prompt
const PROMPT_SUFFIX: &str = "cinematic shot, 8k resolution, highly detailed textures, \
     masterpiece, sharp focus, dramatic lighting, photorealistic style";

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("static regex"))
}

fn parenthetical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(.*?\)").expect("static regex"))
}

fn clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r",\s+|\s+(?:and|but|or|so|while|when|where)\s+").expect("static regex")
    })
}

/// Strips markdown bold markers and stage-direction parentheticals.
fn clean_script(text: &str) -> String {
    let text = bold_re().replace_all(text, "$1");
    parenthetical_re().replace_all(&text, "").into_owned()
}

/// Splits text into sentences on `.`/`!`/`?` boundaries, keeping the
/// terminator with the sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Formats a raw script into one line per sentence.
///
/// A script that arrives as a single run-on sentence is split on commas and
/// common conjunctions instead, so downstream stages still get usable chunks.
pub fn format_script(text: &str) -> Vec<String> {
    let cleaned = clean_script(text);
    let sentences = split_sentences(&cleaned);

    if sentences.len() > 1 {
        return sentences;
    }

    clause_re()
        .split(&cleaned)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Formats the script and persists it, one line per sentence.
pub fn save_formatted_script(text: &str, path: &Path) -> CoreResult<Vec<String>> {
    let lines = format_script(text);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, lines.join("\n"))?;
    Ok(lines)
}

/// Loads a previously formatted script as a list of non-empty lines.
pub fn load_script_lines(path: &Path) -> CoreResult<Vec<String>> {
    let raw = fs::read_to_string(path)?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Builds one image prompt per script line by appending the fixed tag suffix.
pub fn image_prompts(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .map(|line| format!("{}, {}", line.trim(), PROMPT_SUFFIX))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_script_strips_markdown_and_parentheticals() {
        let raw = "This is **bold** text (dramatic pause) and more.";
        assert_eq!(clean_script(raw), "This is bold text  and more.");
    }

    #[test]
    fn test_format_script_splits_sentences() {
        let raw = "First sentence. Second one! Third?";
        let lines = format_script(raw);
        assert_eq!(lines, vec!["First sentence.", "Second one!", "Third?"]);
    }

    #[test]
    fn test_format_script_keeps_trailing_fragment() {
        let raw = "Complete sentence. Trailing fragment without period";
        let lines = format_script(raw);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "Trailing fragment without period");
    }

    #[test]
    fn test_format_script_falls_back_to_clause_split() {
        let raw = "one long breathless thought, it keeps going and going further";
        let lines = format_script(raw);
        assert!(lines.len() > 1, "expected clause split, got {:?}", lines);
        assert_eq!(lines[0], "one long breathless thought");
    }

    #[test]
    fn test_format_script_empty_input() {
        assert!(format_script("").is_empty());
        assert!(format_script("   \n  ").is_empty());
    }

    #[test]
    fn test_image_prompts_append_suffix() {
        let lines = vec!["A fox jumps.".to_string()];
        let prompts = image_prompts(&lines);
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("A fox jumps.,"));
        assert!(prompts[0].contains("cinematic shot"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.txt");

        let saved = save_formatted_script("One. Two. Three.", &path).unwrap();
        let loaded = load_script_lines(&path).unwrap();

        assert_eq!(saved, loaded);
        assert_eq!(loaded, vec!["One.", "Two.", "Three."]);
    }
}
