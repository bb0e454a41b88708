//! Minimal Markdown-to-blocks formatter for narrative prose.
//!
//! Only what the report view renders: headings, bullet items, numbered items
//! and paragraphs. Inline emphasis markers are stripped.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    Bullet { text: String },
    Numbered { number: u32, text: String },
    Paragraph { text: String },
}

pub fn to_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for raw in markdown.lines() {
        let line = raw.trim();

        if line.is_empty() {
            flush_paragraph(&mut paragraph, &mut blocks);
            continue;
        }

        if let Some(block) = parse_line(line) {
            flush_paragraph(&mut paragraph, &mut blocks);
            blocks.push(block);
        } else {
            paragraph.push(line);
        }
    }

    flush_paragraph(&mut paragraph, &mut blocks);
    blocks
}

fn parse_line(line: &str) -> Option<Block> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) && line[hashes..].starts_with(' ') {
        return Some(Block::Heading {
            level: hashes as u8,
            text: strip_inline(&line[hashes..]),
        });
    }

    for marker in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some(Block::Bullet { text: strip_inline(rest) });
        }
    }

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(". ") {
            let number = line[..digits].parse().ok()?;
            return Some(Block::Numbered { number, text: strip_inline(rest) });
        }
    }

    None
}

fn flush_paragraph(lines: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if lines.is_empty() {
        return;
    }
    blocks.push(Block::Paragraph { text: strip_inline(&lines.join(" ")) });
    lines.clear();
}

fn strip_inline(text: &str) -> String {
    text.replace("**", "").replace("__", "").replace('`', "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headings_and_lists() {
        let md = "## Threat Assessment\n\nThe **stream** shows drift.\nVariance is high.\n\n- Poisoning via injection\n* Evasion\n1. Isolate partition\n2. Re-train";
        let blocks = to_blocks(md);

        assert_eq!(
            blocks,
            vec![
                Block::Heading { level: 2, text: "Threat Assessment".to_string() },
                Block::Paragraph { text: "The stream shows drift. Variance is high.".to_string() },
                Block::Bullet { text: "Poisoning via injection".to_string() },
                Block::Bullet { text: "Evasion".to_string() },
                Block::Numbered { number: 1, text: "Isolate partition".to_string() },
                Block::Numbered { number: 2, text: "Re-train".to_string() },
            ]
        );
    }

    #[test]
    fn test_hash_without_space_is_text() {
        let blocks = to_blocks("#hashtag line");
        assert_eq!(blocks, vec![Block::Paragraph { text: "#hashtag line".to_string() }]);
    }

    #[test]
    fn test_plain_fallback_text() {
        let blocks = to_blocks(crate::logic::narrative::FALLBACK_NARRATIVE);
        assert_eq!(blocks.len(), 1);
        assert!(matches!(blocks[0], Block::Paragraph { .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!(to_blocks("").is_empty());
        assert!(to_blocks("\n\n  \n").is_empty());
    }
}
