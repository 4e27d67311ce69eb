//! Arithmetic evaluation over formula tokens.
//!
//! Grammar (recursive descent):
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := factor (('*' | '/') factor)*
//! factor := '-' factor | NUMBER | CELLREF | '(' expr ')'
//! ```
//!
//! Parentheses, unary minus, and cell references each take one nesting
//! level. Formula text can arrive from remote peers, so nesting is capped at
//! [`MAX_NESTING`] and referenced cells are evaluated against the same budget.

use super::cell::CellAddress;

#[cfg(test)]
#[path = "eval_test.rs"]
mod eval_test;

/// Deepest nesting accepted in one evaluation, across referenced cells.
pub const MAX_NESTING: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    #[error("syntax error in formula")]
    Syntax,
    #[error("formula nested deeper than {MAX_NESTING} levels")]
    TooDeep,
    #[error("division by zero")]
    DivideByZero,
    #[error("invalid reference: {0}")]
    BadReference(String),
    #[error("circular reference: {0}")]
    Circular(String),
}

impl EvalError {
    /// Short marker shown in the cell grid and result bar.
    #[must_use]
    pub fn display_code(&self) -> &'static str {
        match self {
            Self::Syntax | Self::TooDeep => "#ERR",
            Self::DivideByZero => "#DIV/0!",
            Self::BadReference(_) => "#REF!",
            Self::Circular(_) => "#CIRC!",
        }
    }
}

/// Evaluate `tokens` at the top level. See [`evaluate_at`].
///
/// # Errors
///
/// As [`evaluate_at`].
pub fn evaluate<F>(tokens: &[String], lookup: F) -> Result<f64, EvalError>
where
    F: Fn(CellAddress, usize) -> Result<f64, EvalError>,
{
    evaluate_at(tokens, 0, lookup)
}

/// Evaluate `tokens` starting at nesting `depth`, resolving cell references
/// through `lookup`. `lookup` receives the depth of the reference so a
/// referenced cell continues with the remaining budget.
///
/// # Errors
///
/// Returns an [`EvalError`] for malformed formulas, division by zero,
/// nesting past [`MAX_NESTING`], or a reference that `lookup` rejects.
pub fn evaluate_at<F>(tokens: &[String], depth: usize, lookup: F) -> Result<f64, EvalError>
where
    F: Fn(CellAddress, usize) -> Result<f64, EvalError>,
{
    let mut parser = Parser { tokens, pos: 0, depth, lookup: &lookup };
    let value = parser.expr()?;
    if parser.pos != tokens.len() {
        return Err(EvalError::Syntax);
    }
    Ok(value)
}

/// Format a number the way the grid shows it: integers without a decimal
/// point, everything else trimmed of trailing zeros.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.6}");
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

struct Parser<'a, F> {
    tokens: &'a [String],
    pos: usize,
    depth: usize,
    lookup: &'a F,
}

impl<'a, F> Parser<'a, F>
where
    F: Fn(CellAddress, usize) -> Result<f64, EvalError>,
{
    fn peek(&self) -> Option<&'a str> {
        let tokens: &'a [String] = self.tokens;
        tokens.get(self.pos).map(String::as_str)
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn descend(&self) -> Result<usize, EvalError> {
        if self.depth >= MAX_NESTING {
            return Err(EvalError::TooDeep);
        }
        Ok(self.depth + 1)
    }

    fn nested(&mut self, inner: fn(&mut Self) -> Result<f64, EvalError>) -> Result<f64, EvalError> {
        let outer = self.depth;
        self.depth = self.descend()?;
        let value = inner(self);
        self.depth = outer;
        value
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut value = self.term()?;
        while let Some(op @ ("+" | "-")) = self.peek() {
            let add = op == "+";
            self.pos += 1;
            let rhs = self.term()?;
            value = if add { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut value = self.factor()?;
        while let Some(op @ ("*" | "/")) = self.peek() {
            let mul = op == "*";
            self.pos += 1;
            let rhs = self.factor()?;
            if mul {
                value *= rhs;
            } else if rhs == 0.0 {
                return Err(EvalError::DivideByZero);
            } else {
                value /= rhs;
            }
        }
        Ok(value)
    }

    fn factor(&mut self) -> Result<f64, EvalError> {
        let lookup = self.lookup;
        match self.next() {
            Some("-") => Ok(-self.nested(Self::factor)?),
            Some("(") => {
                let value = self.nested(Self::expr)?;
                match self.next() {
                    Some(")") => Ok(value),
                    _ => Err(EvalError::Syntax),
                }
            }
            Some(token) if token.starts_with(|c: char| c.is_ascii_digit() || c == '.') => {
                token.parse::<f64>().map_err(|_| EvalError::Syntax)
            }
            Some(token) if token.starts_with(|c: char| c.is_ascii_alphabetic()) => {
                let addr = token
                    .parse::<CellAddress>()
                    .map_err(|_| EvalError::BadReference(token.to_string()))?;
                lookup(addr, self.descend()?)
            }
            _ => Err(EvalError::Syntax),
        }
    }
}
