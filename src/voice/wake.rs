/// Wake phrases, longest first so "hey mirror" is not read as "hey" + junk.
/// Matched as whole words, not bare prefixes: "mirrored ..." stays asleep.
pub const WAKE_PHRASES: [&str; 5] = [
    "hey narcissus",
    "smart mirror",
    "hey mirror",
    "narcissus",
    "mirror",
];

const STRIP_CHARS: [char; 5] = ['.', ',', '-', '!', ' '];

fn strip_leading(text: &str) -> &str {
    text.trim_start_matches(&STRIP_CHARS[..])
}

/// Return the command following a wake phrase, or `None` if the utterance was
/// not addressed to the mirror (or carried nothing after the phrase).
///
/// The phrase must end on a word boundary: "mirrored" does not wake.
pub fn extract_command(utterance: &str) -> Option<String> {
    let lowered = utterance.trim().to_lowercase();
    let clean = strip_leading(&lowered);
    let rest = WAKE_PHRASES.iter().find_map(|phrase| {
        let rest = clean.strip_prefix(phrase)?;
        match rest.chars().next() {
            Some(next) if next.is_alphanumeric() => None,
            _ => Some(rest),
        }
    })?;
    let command = strip_leading(rest.trim());
    if command.is_empty() {
        None
    } else {
        Some(command.to_string())
    }
}
