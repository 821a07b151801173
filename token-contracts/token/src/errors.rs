use core::fmt;

use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum TokenError {
    NotEnoughTokens = 1, // Sender balance is below the requested amount
    NegativeAmount = 2,  // Transfer amount is below zero
}

impl TokenError {
    /// Revert reason shown to callers.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::NotEnoughTokens => "Not enough tokens",
            TokenError::NegativeAmount => "Amount must not be negative",
        }
    }
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}
