//! The line pass: turns markup source into a flat list of blocks.
//!
//! The pass is a small state machine. [`State`] tracks which block is open
//! and is independent of whether a code fence is open; a fence only changes
//! how content lines are recorded.

use crate::markup::highlight::CodeLang;

/// Which block the next content line is appended to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Nothing is open: a content line opens a paragraph (or is raw).
    Idle,
    Paragraph,
    /// A list with an open item.
    ListItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Prose, rendered with inline macros.
    Text(String),
    /// A highlighted line from a code fence, already HTML.
    Code(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: usize, text: String },
    /// `code` paragraphs were opened inside a fence.
    Paragraph { code: bool, lines: Vec<Line> },
    List { items: Vec<Vec<Line>> },
    /// A line that already looks like HTML or display math, outside any block.
    Raw(Line),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub blocks: Vec<Block>,
    /// Set if the input ended inside a code fence.
    pub unterminated_fence: Option<CodeLang>,
}

#[derive(Debug)]
pub struct BlockParser {
    blocks: Vec<Block>,
    state: State,
    fence: Option<CodeLang>,
}

impl Default for BlockParser {
    fn default() -> Self {
        BlockParser { blocks: vec![], state: State::Idle, fence: None }
    }
}

impl BlockParser {
    pub fn new() -> Self {
        BlockParser::default()
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn fence(&self) -> Option<CodeLang> {
        self.fence
    }

    pub fn push_line(&mut self, line: &str) {
        if line.starts_with('#') {
            self.state = State::Idle;
            let text = line.trim_start_matches('#');
            let level = line.len() - text.len();
            self.blocks.push(Block::Heading { level, text: text.trim().to_string() });
        } else if let Some(item) = line.strip_prefix("* ") {
            if self.state != State::ListItem {
                self.blocks.push(Block::List { items: vec![] });
            }

            self.state = State::ListItem;
            if let Some(Block::List { items }) = self.blocks.last_mut() {
                items.push(vec![Line::Text(item.trim().to_string())]);
            }
        } else if line.is_empty() {
            self.state = State::Idle;
        } else if let Some(lang) = CodeLang::from_fence(line) {
            self.fence = match self.fence {
                Some(_) => None,
                None => Some(lang),
            };
        } else {
            self.push_content(line);
        }
    }

    fn push_content(&mut self, line: &str) {
        let is_raw = line.starts_with('<') || line.starts_with("\\[");
        if self.state == State::Idle && !is_raw {
            let code = self.fence.is_some();
            self.blocks.push(Block::Paragraph { code, lines: vec![] });
            self.state = State::Paragraph;
        }

        let line = match self.fence {
            Some(lang) => Line::Code(lang.highlight(line)),
            None => Line::Text(line.to_string()),
        };

        match (self.state, self.blocks.last_mut()) {
            (State::Paragraph, Some(Block::Paragraph { lines, .. })) => lines.push(line),
            (State::ListItem, Some(Block::List { items })) => match items.last_mut() {
                Some(item) => item.push(line),
                None => items.push(vec![line]),
            },
            _ => self.blocks.push(Block::Raw(line)),
        }
    }

    pub fn finish(self) -> Document {
        Document { blocks: self.blocks, unterminated_fence: self.fence }
    }
}

/// Runs the line pass over all of `input`.
pub fn parse(input: &str) -> Document {
    let mut parser = BlockParser::new();
    input.split('\n').for_each(|line| parser.push_line(line));
    parser.finish()
}
