//! Block-skip filter for composable layout templates
//!
//! Templates mark named regions with `{{#block "name"}} ... {{/block}}`.
//! Before a template is compiled its source is split into tokens and passed
//! through [`SkipBlockFilter`], which drops every token belonging to a block
//! named in the [`SkipBlocks`] set (including anything nested inside it) and
//! passes everything else through untouched. Child layers use this to strip
//! the page scaffolding from the shared layout and keep only their layer
//! script.
//!
//! The lexer is lossless: concatenating the token texts reproduces the
//! source byte for byte, so an empty skip set is an exact no-op.

use std::collections::BTreeSet;

use thiserror::Error;

/// Layout blocks removed when a visualization renders as a child layer
pub const MAIN_BLOCKS: [&str; 3] = ["upper_main_block", "middle_main_block", "lower_main_block"];

const BLOCK_OPEN: &str = "#block";
const BLOCK_CLOSE: &str = "/block";

/// Names of blocks to suppress during a single render call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipBlocks(BTreeSet<String>);

impl SkipBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The set used when rendering a child layer
    pub fn main_blocks() -> Self {
        MAIN_BLOCKS.iter().copied().collect()
    }

    pub fn insert<S: Into<String>>(&mut self, name: S) -> bool {
        self.0.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for SkipBlocks {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        SkipBlocks(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Literal text, including handlebars comments
    Data,
    /// `{{` or `{{{`
    TagBegin,
    /// A whitespace-free run inside a tag (`#block`, `"name"`, `/if`, ...)
    Name,
    Whitespace,
    /// `}}` or `}}}`
    TagEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, text: &'a str) -> Self {
        Token { kind, text }
    }

    /// Tag word with whitespace-control markers and quotes removed
    fn word(&self) -> &'a str {
        self.text.trim_matches('~').trim_matches(|c| c == '"' || c == '\'')
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at byte {offset}")]
pub struct LexError {
    pub offset: usize,
    pub message: &'static str,
}

/// Split template source into tokens
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, LexError> {
    let mut tokens = Vec::new();
    let mut offset = 0;

    while let Some(found) = source[offset..].find("{{") {
        let start = offset + found;

        // `\{{` is a literal brace pair; `\\{{` is a literal backslash before a live tag
        let preceding = &source[..start];
        let escaped = preceding.ends_with('\\') && !preceding.ends_with("\\\\");
        if escaped {
            tokens.push(Token::new(TokenKind::Data, &source[offset..start + 2]));
            offset = start + 2;
            continue;
        }

        if start > offset {
            tokens.push(Token::new(TokenKind::Data, &source[offset..start]));
        }
        let tag = &source[start..];

        // Comments pass through as data so block markers inside them are inert
        let comment_end = if tag.starts_with("{{!--") {
            Some(("--}}", "unterminated comment"))
        } else if tag.starts_with("{{!") {
            Some(("}}", "unterminated comment"))
        } else {
            None
        };
        if let Some((close, message)) = comment_end {
            let len = tag
                .find(close)
                .map(|i| i + close.len())
                .ok_or(LexError { offset: start, message })?;
            tokens.push(Token::new(TokenKind::Data, &tag[..len]));
            offset = start + len;
            continue;
        }

        let (open, close) = if tag.starts_with("{{{") {
            ("{{{", "}}}")
        } else {
            ("{{", "}}")
        };
        let body_len = tag[open.len()..].find(close).ok_or(LexError {
            offset: start,
            message: "unterminated tag",
        })?;
        let body_end = open.len() + body_len;

        tokens.push(Token::new(TokenKind::TagBegin, &tag[..open.len()]));
        lex_tag_body(&tag[open.len()..body_end], &mut tokens);
        tokens.push(Token::new(TokenKind::TagEnd, &tag[body_end..body_end + close.len()]));

        offset = start + body_end + close.len();
    }

    if offset < source.len() {
        tokens.push(Token::new(TokenKind::Data, &source[offset..]));
    }
    Ok(tokens)
}

fn lex_tag_body<'a>(body: &'a str, tokens: &mut Vec<Token<'a>>) {
    let kind = |space: bool| if space { TokenKind::Whitespace } else { TokenKind::Name };
    let mut run_start = 0;
    let mut run_is_space = None;

    for (i, c) in body.char_indices() {
        let space = c.is_whitespace();
        if let Some(prev) = run_is_space {
            if prev != space {
                tokens.push(Token::new(kind(prev), &body[run_start..i]));
                run_start = i;
            }
        }
        run_is_space = Some(space);
    }
    if let Some(space) = run_is_space {
        tokens.push(Token::new(kind(space), &body[run_start..]));
    }
}

/// Streaming filter dropping the tokens of skipped blocks
///
/// `block_level` tracks block nesting depth. `skip_level` records the depth
/// at which suppression started (0 when not suppressing); a skip-listed name
/// only starts suppression when none is active, so nested matches cannot
/// move the marker.
pub struct SkipBlockFilter<'t, 'a, 's> {
    tokens: &'t [Token<'a>],
    pos: usize,
    skip: &'s SkipBlocks,
    block_level: usize,
    skip_level: usize,
    in_endblock: bool,
}

impl<'t, 'a, 's> SkipBlockFilter<'t, 'a, 's> {
    pub fn new(tokens: &'t [Token<'a>], skip: &'s SkipBlocks) -> Self {
        SkipBlockFilter {
            tokens,
            pos: 0,
            skip,
            block_level: 0,
            skip_level: 0,
            in_endblock: false,
        }
    }

    /// Block name if the tag just opened is a block opener
    fn block_open_name(&self) -> Option<&'a str> {
        let mut words = self.tokens[self.pos..]
            .iter()
            .take_while(|t| t.kind != TokenKind::TagEnd)
            .filter(|t| t.kind == TokenKind::Name)
            .map(|t| t.word());
        match words.next() {
            Some(BLOCK_OPEN) => Some(words.next().unwrap_or("")),
            _ => None,
        }
    }
}

impl<'t, 'a, 's> Iterator for SkipBlockFilter<'t, 'a, 's> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        loop {
            let token = *self.tokens.get(self.pos)?;
            self.pos += 1;

            match token.kind {
                TokenKind::TagBegin => {
                    if let Some(name) = self.block_open_name() {
                        self.block_level += 1;
                        if self.skip_level == 0 && self.skip.contains(name) {
                            log::debug!("skipping block '{}' at depth {}", name, self.block_level);
                            self.skip_level = self.block_level;
                        }
                    }
                }
                TokenKind::Name if token.word() == BLOCK_CLOSE => self.in_endblock = true,
                _ => {}
            }

            let emit = self.skip_level == 0;

            if token.kind == TokenKind::TagEnd && self.in_endblock {
                self.in_endblock = false;
                self.block_level = self.block_level.saturating_sub(1);
                if self.skip_level == self.block_level + 1 {
                    self.skip_level = 0;
                }
            }

            if emit {
                return Some(token);
            }
        }
    }
}

/// Remove skipped blocks from template source
pub fn filter_source(source: &str, skip: &SkipBlocks) -> Result<String, LexError> {
    let tokens = tokenize(source)?;
    Ok(SkipBlockFilter::new(&tokens, skip).map(|t| t.text).collect())
}
