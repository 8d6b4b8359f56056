//! Session data of an imaging device.
//!
//! A [`Session`] holds everything that lives between the start and the end
//! of one operation: the requested [`Action`], the [`AcquireState`], the
//! pending result, enrollment progress and the acquisition buffer.
//!
//! Natural state changes go through [`Session::transition_to`] and are
//! validated against [`AcquireState::can_transition_to`]. Stop and abort
//! move the session regardless of where it is and use
//! [`Session::force_state`]. Both are recorded in a bounded history.
//!
//! # Examples
//!
//! ```
//! use fprint_core::{AcquireState, Action};
//! use fprint_imgdev::Session;
//!
//! let mut session = Session::new();
//! session.begin(Action::Capture).unwrap();
//! assert_eq!(session.state(), AcquireState::Activating);
//!
//! session.transition_to(AcquireState::AwaitFingerOn).unwrap();
//! assert!(session.transition_to(AcquireState::Idle).is_err());
//! assert_eq!(session.history().len(), 2);
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use fprint_biometric::PrintData;
use fprint_core::{AcquireState, Action, ActionResult, Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::acquire::AcquisitionBuffer;
use crate::policy;

/// Maximum number of state transitions kept per session.
const MAX_HISTORY_SIZE: usize = 64;

/// A single state change with timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: AcquireState,
    pub to: AcquireState,

    /// Not serialized; set to the time of deserialization.
    #[serde(skip, default = "Instant::now")]
    pub timestamp: Instant,
}

impl StateTransition {
    pub fn new(from: AcquireState, to: AcquireState) -> Self {
        Self {
            from,
            to,
            timestamp: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.timestamp.elapsed()
    }
}

/// State of one imaging operation.
#[derive(Debug)]
pub struct Session {
    action: Action,
    state: AcquireState,
    pub(crate) result: Option<ActionResult>,
    pub(crate) enroll_stage: u8,
    pub(crate) enroll_data: Option<PrintData>,
    /// The pending result counts an enroll stage the caller has not seen.
    pub(crate) stage_unreported: bool,
    pub(crate) acquire: AcquisitionBuffer,
    pub(crate) identify_match_offset: Option<usize>,
    history: VecDeque<StateTransition>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create an idle session with no action.
    pub fn new() -> Self {
        Self {
            action: Action::None,
            state: AcquireState::Idle,
            result: None,
            enroll_stage: 0,
            enroll_data: None,
            stage_unreported: false,
            acquire: AcquisitionBuffer::new(),
            identify_match_offset: None,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn state(&self) -> AcquireState {
        self.state
    }

    /// Result awaiting delivery, if any.
    pub fn result(&self) -> Option<&ActionResult> {
        self.result.as_ref()
    }

    /// Number of enrollment stages completed so far.
    pub fn enroll_stage(&self) -> u8 {
        self.enroll_stage
    }

    /// Gallery index of the last identify match.
    pub fn identify_match_offset(&self) -> Option<usize> {
        self.identify_match_offset
    }

    pub fn acquisition(&self) -> &AcquisitionBuffer {
        &self.acquire
    }

    /// Recent state transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Claim the session for an action and move to `Activating`.
    ///
    /// Per-operation data is reset so nothing leaks from an earlier run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Busy`] if another action is in progress.
    pub fn begin(&mut self, action: Action) -> Result<()> {
        if self.action != Action::None {
            return Err(Error::Busy {
                current: self.action,
            });
        }

        self.discard();
        self.enroll_stage = 0;
        self.identify_match_offset = None;
        self.action = action;
        self.transition_to(AcquireState::Activating)?;
        Ok(())
    }

    /// Release the action and return to `Idle`, dropping all session data.
    pub fn end(&mut self) {
        self.discard();
        self.enroll_stage = 0;
        self.identify_match_offset = None;
        self.action = Action::None;
        if self.state != AcquireState::Idle {
            self.force_state(AcquireState::Idle);
        }
    }

    /// Release the acquisition buffer, the enrollment template and the
    /// pending result.
    pub fn discard(&mut self) {
        self.acquire.clear();
        if let Some(mut template) = self.enroll_data.take() {
            template.clear();
        }
        self.result = None;
        self.stage_unreported = false;
    }

    /// Drop the pending result without delivering it.
    ///
    /// An enroll stage already folded into the template for that result is
    /// rolled back, so the stage counter only reflects delivered stages.
    pub fn drop_result(&mut self) -> Option<ActionResult> {
        if self.stage_unreported {
            policy::enroll_rollback(&mut self.enroll_data, &mut self.enroll_stage);
            self.stage_unreported = false;
        }
        self.result.take()
    }

    /// Move to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStateTransition`] if the transition is not
    /// allowed from the current state.
    pub fn transition_to(&mut self, new_state: AcquireState) -> Result<StateTransition> {
        if !self.state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.state.to_string(),
                to: new_state.to_string(),
            });
        }
        Ok(self.record(new_state))
    }

    /// Move to a new state without validation.
    pub fn force_state(&mut self, new_state: AcquireState) -> StateTransition {
        self.record(new_state)
    }

    fn record(&mut self, new_state: AcquireState) -> StateTransition {
        let transition = StateTransition::new(self.state, new_state);
        debug!(action = %self.action, from = %self.state, to = %new_state, "acquire state change");

        self.state = new_state;
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(transition.clone());
        transition
    }
}
