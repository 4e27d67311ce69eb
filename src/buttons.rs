//! Command button vocabulary.
//!
//! Numerals, operators, and parentheses are not commands; they go through
//! the token path as literal text.

use std::fmt;
use std::str::FromStr;

#[cfg(test)]
#[path = "buttons_test.rs"]
mod buttons_test;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command button: {0}")]
pub struct UnknownCommand(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    EditToggle,
    Clear,
    AllClear,
    ActivateGameMode,
    DeactivateGameMode,
}

impl Command {
    pub const ALL: [Self; 5] =
        [Self::EditToggle, Self::Clear, Self::AllClear, Self::ActivateGameMode, Self::DeactivateGameMode];

    /// Button name as used by the rendering layer.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EditToggle => "edit_toggle",
            Self::Clear => "clear",
            Self::AllClear => "allClear",
            Self::ActivateGameMode => "activateGameMode",
            Self::DeactivateGameMode => "deactivateGameMode",
        }
    }

    /// Whether only the game host may issue this command.
    #[must_use]
    pub fn host_only(self) -> bool {
        matches!(self, Self::ActivateGameMode | Self::DeactivateGameMode)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|cmd| cmd.as_str() == s)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}
