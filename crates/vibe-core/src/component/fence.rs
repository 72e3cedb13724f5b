//! Markdown fence removal.

/// Blank out every line that opens or closes a markdown code fence, and cut
/// a closing fence glued to the end of a code line.
///
/// Lines are blanked rather than dropped so line numbers in later
/// diagnostics still point into the caller's original text.
pub fn strip_fences(source: &str) -> String {
    source
        .lines()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                ""
            } else {
                line.trim_end().strip_suffix("```").unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
