use serde::{Deserialize, Serialize};

use crate::session::BrewError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ActionResult {
    Success,
    /// Applied, but not exactly as asked (a dial clamped, the grinder full).
    SuccessWithWarning(String),
    Error(BrewError),
}

impl ActionResult {
    /// Returns `true` for both `Success` and `SuccessWithWarning`.
    pub fn is_success(&self) -> bool {
        matches!(self, ActionResult::Success | ActionResult::SuccessWithWarning(_))
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            ActionResult::SuccessWithWarning(w) => Some(w.as_str()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&BrewError> {
        match self {
            ActionResult::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Result<(), BrewError>> for ActionResult {
    fn from(result: Result<(), BrewError>) -> Self {
        match result {
            Ok(()) => ActionResult::Success,
            Err(e) => ActionResult::Error(e),
        }
    }
}
