//! Token buffer for the formula currently being composed.
//!
//! DESIGN
//! ======
//! A formula is an ordered list of tokens (numbers, operators, parentheses,
//! cell references). The buffer is append-only apart from `pop` and `clear`.
//! Formula text that arrives from a remote peer is re-tokenized with
//! [`tokenize`] so it can be edited token-by-token afterwards.

#[cfg(test)]
#[path = "tokens_test.rs"]
mod tokens_test;

/// Classification of a single formula token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Number,
    CellRef,
    Operator,
    LeftParen,
    RightParen,
}

#[must_use]
pub fn classify(token: &str) -> Option<TokenKind> {
    let first = token.chars().next()?;
    match first {
        '(' if token.len() == 1 => Some(TokenKind::LeftParen),
        ')' if token.len() == 1 => Some(TokenKind::RightParen),
        '+' | '-' | '*' | '/' if token.len() == 1 => Some(TokenKind::Operator),
        c if c.is_ascii_digit() || c == '.' => token
            .chars()
            .all(|c| c.is_ascii_digit() || c == '.')
            .then_some(TokenKind::Number),
        c if c.is_ascii_alphabetic() => {
            let digits = token.trim_start_matches(|c: char| c.is_ascii_alphabetic());
            (!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())).then_some(TokenKind::CellRef)
        }
        _ => None,
    }
}

/// Split formula text into tokens. Whitespace is dropped, cell references
/// are upper-cased, unknown characters become single-character tokens.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            tokens.push(chars[start..i].iter().collect());
        } else if c.is_ascii_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_alphabetic() {
                i += 1;
            }
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            tokens.push(chars[start..i].iter().collect::<String>().to_ascii_uppercase());
        } else {
            tokens.push(c.to_string());
            i += 1;
        }
    }

    tokens
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenBuffer {
    tokens: Vec<String>,
}

impl TokenBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_formula(text: &str) -> Self {
        Self { tokens: tokenize(text) }
    }

    pub fn push(&mut self, token: impl Into<String>) {
        let token = token.into();
        if !token.is_empty() {
            self.tokens.push(token);
        }
    }

    /// Remove the last token. Returns `None` on an empty buffer.
    pub fn pop(&mut self) -> Option<String> {
        self.tokens.pop()
    }

    pub fn clear(&mut self) {
        self.tokens.clear();
    }

    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Single display string for the formula bar.
    #[must_use]
    pub fn render(&self) -> String {
        self.tokens.concat()
    }
}
