//! Narrative log: template lexer, rendered lines and bounded history.

use crate::visual::Skin;
use std::collections::VecDeque;

/// Entries kept in the log view.
pub const MAX_LOG: usize = 20;

/// Lexed piece of a log template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogToken {
    Text(String),
    /// A `*<digit>*` back-reference to a player.
    Reference(u8),
}

/// Split a template into text and `*<digit>*` reference tokens.
///
/// Only a single ASCII digit between two asterisks is a reference; any
/// other asterisk is plain text. Empty text is never emitted.
pub fn tokenize(template: &str) -> Vec<LogToken> {
    let bytes = template.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let [b'*', digit @ b'0'..=b'9', b'*', ..] = &bytes[i..] {
            if text_start < i {
                tokens.push(LogToken::Text(template[text_start..i].to_string()));
            }
            tokens.push(LogToken::Reference(digit - b'0'));
            i += 3;
            text_start = i;
        } else {
            i += 1;
        }
    }
    if text_start < bytes.len() {
        tokens.push(LogToken::Text(template[text_start..].to_string()));
    }
    tokens
}

/// Rendered piece of a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSegment {
    Skin(Skin),
    Text(String),
}

impl LogSegment {
    fn from_token(token: LogToken) -> Self {
        match token {
            LogToken::Text(text) => LogSegment::Text(text),
            LogToken::Reference(digit) => match Skin::new(i64::from(digit)) {
                Some(skin) => LogSegment::Skin(skin),
                None => LogSegment::Text(format!("*{digit}*")),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub speaker: LogSegment,
    pub segments: Vec<LogSegment>,
    /// Spoken by our own player.
    pub from_self: bool,
}

impl LogLine {
    /// Render one `{speaker: template}` entry. The speaker key is a skin
    /// ordinal; anything else is shown verbatim.
    pub fn render(speaker: &str, template: &str) -> Self {
        let speaker = match Skin::parse(speaker) {
            Some(skin) => LogSegment::Skin(skin),
            None => LogSegment::Text(speaker.to_string()),
        };
        Self {
            speaker,
            segments: tokenize(template).into_iter().map(LogSegment::from_token).collect(),
            from_self: false,
        }
    }

    pub fn speaker_skin(&self) -> Option<Skin> {
        match self.speaker {
            LogSegment::Skin(skin) => Some(skin),
            LogSegment::Text(_) => None,
        }
    }

    /// Single-line text form, with skins as `[P<n>]`.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for segment in std::iter::once(&self.speaker).chain(&self.segments) {
            match segment {
                LogSegment::Skin(skin) => {
                    if !out.is_empty() && !out.ends_with(' ') {
                        out.push(' ');
                    }
                    out.push_str(&format!("[P{skin}]"));
                }
                LogSegment::Text(text) => {
                    if !out.is_empty() && !out.ends_with(' ') && !text.starts_with(' ') {
                        out.push(' ');
                    }
                    out.push_str(text);
                }
            }
        }
        out.trim_end().to_string()
    }
}

/// Most recent log lines, oldest first.
#[derive(Debug, Clone)]
pub struct LogHistory {
    entries: VecDeque<LogLine>,
    capacity: usize,
}

impl Default for LogHistory {
    fn default() -> Self {
        Self::with_capacity(MAX_LOG)
    }
}

impl LogHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a line, evicting the oldest first while the history is full.
    /// Returns the number of evicted lines.
    pub fn push(&mut self, line: LogLine) -> usize {
        let mut evicted = 0;
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
            evicted += 1;
        }
        self.entries.push_back(line);
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&LogLine> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogLine> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
