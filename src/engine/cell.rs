//! Cell labels such as `"B7"`, and their zero-based grid coordinates.

use std::fmt;
use std::str::FromStr;

#[cfg(test)]
#[path = "cell_test.rs"]
mod cell_test;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid cell label: {0:?}")]
pub struct LabelError(pub String);

/// Zero-based column/row position of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub col: usize,
    pub row: usize,
}

impl CellAddress {
    #[must_use]
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    #[must_use]
    pub fn label(self) -> String {
        format!("{}{}", column_name(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for CellAddress {
    type Err = LabelError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let letters_len = label.chars().take_while(char::is_ascii_alphabetic).count();
        let (letters, digits) = label.split_at(letters_len);
        if letters.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(LabelError(label.to_string()));
        }

        let mut col = 0usize;
        for c in letters.chars() {
            let value = (c.to_ascii_uppercase() as usize) - ('A' as usize) + 1;
            col = col
                .checked_mul(26)
                .and_then(|v| v.checked_add(value))
                .ok_or_else(|| LabelError(label.to_string()))?;
        }

        let row: usize = digits.parse().map_err(|_| LabelError(label.to_string()))?;
        if row == 0 {
            return Err(LabelError(label.to_string()));
        }

        Ok(Self { col: col - 1, row: row - 1 })
    }
}

/// Spreadsheet column name for a zero-based index: 0 → `A`, 26 → `AA`.
#[must_use]
pub fn column_name(mut col: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + u8::try_from(col % 26).unwrap_or(0));
        if col < 26 {
            break;
        }
        col = col / 26 - 1;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}
