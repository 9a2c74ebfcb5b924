use crate::util::{MountError, MountResult};
use serde::{Deserialize, Serialize};

/// How many times a scan path is run
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum Repeat {
    /// Forward only, no reversal
    Once,
    /// Forward then reversed, `cycles` times, then forward once more when
    /// `trailing_forward` is set
    Count { cycles: u32, trailing_forward: bool },
    /// Forward and reversed until stopped
    Indefinite,
}

impl Repeat {
    /// Forward and back `cycles` times, ending where the path started
    pub fn cycles(cycles: u32) -> Self {
        Repeat::Count {
            cycles,
            trailing_forward: false,
        }
    }

    /// Reads the historical numeric form. Anything up to 0.5 is one direction only,
    /// a whole number counts forward and back cycles and a further half adds a final
    /// forward pass. Every other fraction is refused.
    pub fn from_cycles(cycles: f64) -> MountResult<Self> {
        let invalid = || {
            MountError::InvalidValue(format!(
                "Repeat count of {} must be a whole or half number",
                cycles
            ))
        };
        if !cycles.is_finite() || cycles <= 0. {
            return Err(invalid());
        }
        if cycles <= 0.5 {
            return Ok(Repeat::Once);
        }

        let whole = cycles.trunc();
        let fraction = cycles - whole;
        let trailing_forward = if fraction == 0. {
            false
        } else if fraction == 0.5 {
            true
        } else {
            return Err(invalid());
        };
        if whole > u32::MAX as f64 {
            return Err(invalid());
        }

        Ok(Repeat::Count {
            cycles: whole as u32,
            trailing_forward,
        })
    }

    pub(crate) fn validate(&self) -> MountResult<()> {
        match self {
            Repeat::Count { cycles: 0, .. } => Err(MountError::InvalidValue(
                "Repeat count must be at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
