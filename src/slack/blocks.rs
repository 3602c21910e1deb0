//! Slack Block Kit rendering
//!
//! A listing renders as header + divider + one section per item; anything
//! without a header renders one section per item. Output stays within Slack's
//! block count and text length limits.

use serde::Serialize;

use super::interpreter::ResponseDescriptor;

/// Block Kit text object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: String },
}

/// The subset of Block Kit blocks Dolt sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: Text },
    Divider,
    Section { text: Text },
}

impl Block {
    pub fn header(text: impl Into<String>) -> Self {
        Block::Header {
            text: Text::PlainText {
                text: text.into(),
                emoji: true,
            },
        }
    }

    pub fn section(text: impl Into<String>) -> Self {
        Block::Section {
            text: Text::Mrkdwn { text: text.into() },
        }
    }
}

/// Slash-command reply body.
#[derive(Debug, Clone, Serialize)]
pub struct SlackMessage {
    /// `ephemeral`: only the invoking user sees the reply
    pub response_type: &'static str,
    /// Notification fallback
    pub text: String,
    pub blocks: Vec<Block>,
}

/// Slack rejects messages with more blocks than this.
pub const MAX_BLOCKS: usize = 50;
/// Section text limit.
pub const MAX_SECTION_TEXT: usize = 3000;
/// Header text limit.
pub const MAX_HEADER_TEXT: usize = 150;

/// Escape the three characters Slack treats as control sequences.
pub fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Reverse Slack's escaping of slash-command text; `&amp;` goes last so
/// `&amp;lt;` stays a literal `&lt;`.
pub fn unescape_mrkdwn(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Cut `text` to at most `max` characters, marking the cut with `…`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max - 1).collect();
    cut.push('…');
    cut
}

/// Turn a descriptor into Block Kit blocks.
///
/// Listings longer than the block limit end with an "…and N more" section.
pub fn render_blocks(descriptor: &ResponseDescriptor) -> Vec<Block> {
    let Some(header) = &descriptor.header else {
        return descriptor
            .items
            .iter()
            .take(MAX_BLOCKS)
            .map(|item| Block::section(truncate(item, MAX_SECTION_TEXT)))
            .collect();
    };

    // header + divider
    let room = MAX_BLOCKS - 2;
    let shown = if descriptor.items.len() > room {
        room - 1
    } else {
        descriptor.items.len()
    };

    let mut blocks = Vec::with_capacity(shown + 3);
    blocks.push(Block::header(truncate(header, MAX_HEADER_TEXT)));
    blocks.push(Block::Divider);
    blocks.extend(
        descriptor.items[..shown]
            .iter()
            .map(|item| Block::section(truncate(&escape_mrkdwn(item), MAX_SECTION_TEXT))),
    );
    let hidden = descriptor.items.len() - shown;
    if hidden > 0 {
        blocks.push(Block::section(format!("…and {} more", hidden)));
    }
    blocks
}

/// Full reply payload for a slash command.
pub fn render_message(descriptor: &ResponseDescriptor) -> SlackMessage {
    let text = descriptor
        .header
        .clone()
        .or_else(|| descriptor.items.first().cloned())
        .unwrap_or_default();

    SlackMessage {
        response_type: "ephemeral",
        text,
        blocks: render_blocks(descriptor),
    }
}
