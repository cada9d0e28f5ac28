//! Splits message text into paragraph and fenced-code blocks.
//!
//! Line scanner with two states (text, in-code). A fence is a line holding three
//! backticks, an optional word-character language tag and trailing whitespace
//! only. Every text line is its own paragraph, blank ones included. An unclosed
//! fence still yields its buffered lines as a final code block.

use regex::Regex;
use std::sync::OnceLock;

/// One display unit of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(String),
    Code { language: String, code: String },
}

impl Block {
    pub fn is_code(&self) -> bool {
        matches!(self, Block::Code { .. })
    }
}

fn fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"^```([A-Za-z0-9_]+)?\s*$").expect("fence pattern is valid")
    })
}

enum State {
    Text,
    Code { language: String, lines: Vec<String> },
}

/// Render `text` into blocks, in input order.
pub fn render_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut state = State::Text;

    for line in text.split('\n') {
        let fence_tag = fence()
            .captures(line)
            .map(|c| c.get(1).map(|m| m.as_str().to_string()).unwrap_or_default());

        state = match (state, fence_tag) {
            (State::Text, Some(language)) => State::Code {
                language,
                lines: Vec::new(),
            },
            (State::Text, None) => {
                blocks.push(Block::Paragraph(line.to_string()));
                State::Text
            }
            (State::Code { language, lines }, Some(_)) => {
                blocks.push(Block::Code {
                    language,
                    code: lines.join("\n"),
                });
                State::Text
            }
            (State::Code { language, mut lines }, None) => {
                lines.push(line.to_string());
                State::Code { language, lines }
            }
        };
    }

    if let State::Code { language, lines } = state {
        blocks.push(Block::Code {
            language,
            code: lines.join("\n"),
        });
    }
    blocks
}

/// Lay blocks out for a terminal: paragraphs verbatim, code framed by rules.
pub fn to_terminal(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Paragraph(line) => {
                out.push_str(line);
                out.push('\n');
            }
            Block::Code { language, code } => {
                if language.is_empty() {
                    out.push_str("----\n");
                } else {
                    out.push_str(&format!("---- {} ----\n", language));
                }
                for line in code.split('\n') {
                    out.push_str("  ");
                    out.push_str(line);
                    out.push('\n');
                }
                out.push_str("----\n");
            }
        }
    }
    out
}
