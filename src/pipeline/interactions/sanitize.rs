// Label text is third-party content that ends up inside the reasoning prompt.
// Strip characters and lines that could steer the engine, and bound its size.

/// Maximum characters of one label section sent to the reasoning engine.
pub const MAX_SECTION_CHARS: usize = 4_000;

/// Clean one label section for inclusion in a prompt.
///
/// Removes invisible and control characters, drops lines that look like
/// role markers or instruction overrides, collapses whitespace to single
/// spaces and truncates at a word boundary.
pub fn sanitize_label_text(raw: &str) -> String {
    let visible = remove_invisible_chars(raw);

    let mut dropped = 0usize;
    let kept: Vec<&str> = visible
        .lines()
        .filter(|line| {
            let lower = line.trim().to_lowercase();
            let suspicious = is_role_marker(&lower) || is_override_attempt(&lower);
            if suspicious {
                dropped += 1;
            }
            !suspicious
        })
        .collect();

    if dropped > 0 {
        tracing::warn!(dropped_lines = dropped, "Instruction-like lines removed from label text");
    }

    let collapsed = kept
        .iter()
        .flat_map(|line| line.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");

    truncate_at_word(&collapsed, MAX_SECTION_CHARS)
}

fn remove_invisible_chars(text: &str) -> String {
    text.chars()
        .filter(|c| {
            if matches!(*c, ' ' | '\n' | '\t' | '\r') {
                return true;
            }
            let zero_width_or_bidi = matches!(
                *c,
                '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}'
            );
            !zero_width_or_bidi && !c.is_control()
        })
        .collect()
}

fn is_role_marker(lower: &str) -> bool {
    ["system:", "assistant:", "user:", "[system]", "[inst]", "[/inst]", "<<sys>>", "<system", "</system"]
        .iter()
        .any(|marker| lower.starts_with(marker))
}

fn is_override_attempt(lower: &str) -> bool {
    [
        "ignore previous instructions",
        "ignore all instructions",
        "ignore the above",
        "disregard your instructions",
        "disregard all instructions",
        "forget your instructions",
        "new instructions:",
    ]
    .iter()
    .any(|phrase| lower.contains(phrase))
}

/// Truncate to at most `max_chars` characters, preferring a word boundary.
fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) if idx > max_chars / 2 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{trimmed} …")
}
