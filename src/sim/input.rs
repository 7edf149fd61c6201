//! Player intent, sampled once per tick

use serde::{Deserialize, Serialize};

/// Level-triggered intent queries consumed by the simulation.
///
/// Implementations report what is held *right now*; the simulation samples
/// each query once per tick and never asks for edges.
pub trait InputState {
    fn is_left(&self) -> bool;
    fn is_right(&self) -> bool;
    fn is_jump(&self) -> bool;
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl TickInput {
    pub const NONE: Self = Self {
        left: false,
        right: false,
        jump: false,
    };

    pub fn left() -> Self {
        Self {
            left: true,
            ..Self::NONE
        }
    }

    pub fn right() -> Self {
        Self {
            right: true,
            ..Self::NONE
        }
    }

    pub fn jump() -> Self {
        Self {
            jump: true,
            ..Self::NONE
        }
    }

    /// Take a snapshot of any input source
    pub fn sample(input: &dyn InputState) -> Self {
        Self {
            left: input.is_left(),
            right: input.is_right(),
            jump: input.is_jump(),
        }
    }

    /// Parse a compact intent token: any mix of `L`, `R`, `J`; `.` for none
    pub fn parse(token: &str) -> Option<Self> {
        let mut input = Self::NONE;
        for c in token.trim().chars() {
            match c.to_ascii_uppercase() {
                'L' => input.left = true,
                'R' => input.right = true,
                'J' => input.jump = true,
                '.' => {}
                _ => return None,
            }
        }
        Some(input)
    }
}

impl InputState for TickInput {
    fn is_left(&self) -> bool {
        self.left
    }

    fn is_right(&self) -> bool {
        self.right
    }

    fn is_jump(&self) -> bool {
        self.jump
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tokens() {
        assert_eq!(TickInput::parse("."), Some(TickInput::NONE));
        assert_eq!(TickInput::parse("r"), Some(TickInput::right()));
        assert_eq!(
            TickInput::parse("RJ"),
            Some(TickInput {
                right: true,
                jump: true,
                left: false
            })
        );
        assert_eq!(TickInput::parse("X"), None);
    }

    #[test]
    fn test_sample_copies_queries() {
        let held = TickInput {
            left: true,
            right: true,
            jump: false,
        };
        assert_eq!(TickInput::sample(&held), held);
    }
}
