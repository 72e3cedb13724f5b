//! Program extraction from free-form model replies.

/// Pull the program out of `reply`: the first fenced block tagged
/// `vibecode`, else the first fenced block of any kind, else the whole
/// reply. An unclosed fence runs to the end of the reply.
pub fn extract_program(reply: &str) -> String {
    let blocks = fenced_blocks(reply);
    let chosen = blocks
        .iter()
        .find(|b| b.tag.eq_ignore_ascii_case("vibecode"))
        .or_else(|| blocks.first());
    match chosen {
        Some(block) => block.body.trim().to_string(),
        None => reply.trim().to_string(),
    }
}

struct Fenced {
    tag: String,
    body: String,
}

fn fenced_blocks(text: &str) -> Vec<Fenced> {
    let mut blocks = Vec::new();
    let mut open: Option<Fenced> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if open.is_none() {
            if let Some(rest) = trimmed.strip_prefix("```") {
                open = Some(Fenced {
                    tag: rest.trim().to_string(),
                    body: String::new(),
                });
            }
        } else if trimmed.trim_end() == "```" {
            blocks.extend(open.take());
        } else if let Some(mut block) = open.take() {
            match line.trim_end().strip_suffix("```") {
                Some(code) => {
                    block.body.push_str(code);
                    blocks.push(block);
                }
                None => {
                    block.body.push_str(line);
                    block.body.push('\n');
                    open = Some(block);
                }
            }
        }
    }
    blocks.extend(open);
    blocks
}
