use super::*;

// =============================================================
// tokenize
// =============================================================

#[test]
fn tokenize_splits_numbers_operators_and_refs() {
    assert_eq!(tokenize("3+b2*(10.5-A1)"), vec!["3", "+", "B2", "*", "(", "10.5", "-", "A1", ")"]);
}

#[test]
fn tokenize_drops_whitespace() {
    assert_eq!(tokenize(" 6 * 4 "), vec!["6", "*", "4"]);
}

#[test]
fn tokenize_empty_is_empty() {
    assert!(tokenize("").is_empty());
}

// =============================================================
// classify
// =============================================================

#[test]
fn classify_recognizes_each_kind() {
    assert_eq!(classify("12"), Some(TokenKind::Number));
    assert_eq!(classify("B7"), Some(TokenKind::CellRef));
    assert_eq!(classify("*"), Some(TokenKind::Operator));
    assert_eq!(classify("("), Some(TokenKind::LeftParen));
    assert_eq!(classify(")"), Some(TokenKind::RightParen));
}

#[test]
fn classify_rejects_malformed_tokens() {
    assert_eq!(classify(""), None);
    assert_eq!(classify("B"), None);
    assert_eq!(classify("B7x"), None);
    assert_eq!(classify("**"), None);
}

// =============================================================
// TokenBuffer
// =============================================================

#[test]
fn buffer_renders_concatenated_tokens() {
    let mut buffer = TokenBuffer::new();
    buffer.push("3");
    buffer.push("+");
    buffer.push("B2");
    assert_eq!(buffer.render(), "3+B2");
    assert_eq!(buffer.len(), 3);
}

#[test]
fn buffer_ignores_empty_tokens() {
    let mut buffer = TokenBuffer::new();
    buffer.push("");
    assert!(buffer.is_empty());
}

#[test]
fn pop_on_empty_buffer_is_noop() {
    let mut buffer = TokenBuffer::new();
    assert_eq!(buffer.pop(), None);
    assert_eq!(buffer.len(), 0);
}

#[test]
fn clear_always_yields_empty_buffer() {
    let mut buffer = TokenBuffer::from_formula("1+2*(3-4)");
    assert_eq!(buffer.len(), 9);
    buffer.pop();
    buffer.clear();
    assert_eq!(buffer.len(), 0);
    assert_eq!(buffer.render(), "");
}

#[test]
fn mixed_sequences_never_underflow() {
    let mut buffer = TokenBuffer::new();
    for step in 0..50 {
        match step % 5 {
            0 | 1 => buffer.push("7"),
            2 | 3 => {
                buffer.pop();
            }
            _ => buffer.clear(),
        }
        assert!(buffer.render().len() >= buffer.len());
    }
    buffer.clear();
    assert!(buffer.is_empty());
}
