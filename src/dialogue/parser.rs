//! Parser for the `**Name:** *"line"*` reveal markup.

use std::sync::LazyLock;

use regex::Regex;

use super::DialogueLine;

// **[Character]:** *"line"*, brackets optional.
static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\*\*\[?([^\]:]+)\]?:\*\*\s*\*"([^"]+)"\*"#)
        .expect("dialogue pattern compiles")
});

/// Extract every `(character, dialogue)` pair in order; unmatched text is ignored.
pub fn parse_dialogue(text: &str) -> Vec<DialogueLine> {
    LINE_PATTERN
        .captures_iter(text)
        .map(|captures| {
            let character = captures.get(1).map_or("", |m| m.as_str()).trim();
            let dialogue = captures.get(2).map_or("", |m| m.as_str()).trim();
            DialogueLine::new(character, dialogue)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bracketed_and_bare_headers() {
        let text = r#"**[Morpheus]:** *"What if I told you..."*
**Trinity:** *"The question isn't how."*"#;

        let lines = parse_dialogue(text);
        assert_eq!(
            lines,
            vec![
                DialogueLine::new("Morpheus", "What if I told you..."),
                DialogueLine::new("Trinity", "The question isn't how."),
            ]
        );
    }

    #[test]
    fn trims_character_and_dialogue() {
        let lines = parse_dialogue(r#"**[ Agent Smith ]:**   *" Mister Anderson. "*"#);
        assert_eq!(lines, vec![DialogueLine::new("Agent Smith", "Mister Anderson.")]);
    }

    #[test]
    fn ignores_narration_and_malformed_lines() {
        let text = r#"Here is your scene!
**Vincent:** *"Royale with cheese."*
(Jules glares)
Jules: *"no bold header"*
**Mia:** *"Don't be a square."*"#;

        let characters = parse_dialogue(text)
            .into_iter()
            .map(|line| line.character)
            .collect::<Vec<_>>();
        assert_eq!(characters, ["Vincent", "Mia"]);
    }

    #[test]
    fn empty_input_yields_no_lines() {
        assert!(parse_dialogue("").is_empty());
        assert!(parse_dialogue("no markup at all").is_empty());
    }
}
