//! Per-run diagnostics.

use serde::{Deserialize, Serialize};
use shakedown_transport::{HandshakeState, Role};

/// Why a run stopped. Every variant is a benign outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunExit {
    /// The input held no payload after the selector; nothing was built.
    InputTooShort,
    /// The payload ran out before either side completed.
    Exhausted,
    /// One side reached the terminal state.
    Completed,
    /// One side's engine aborted the handshake.
    Fatal { role: Role, reason: String },
}

impl RunExit {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunExit::Completed)
    }
}

/// Counters for one side of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideReport {
    pub steps: u64,
    pub progress: u64,
    pub would_blocks: u64,
    /// Iterations in which this side wrote payload instead of stepping.
    pub injections: u64,
    pub injected_bytes: usize,
    pub final_state: Option<HandshakeState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub exit: RunExit,
    pub input_len: usize,
    /// Raw decoded selector; absent when the input was too short.
    pub selector: Option<i32>,
    pub selector_in_range: bool,
    pub injection_owner: Option<Role>,
    pub iterations: u64,
    /// Bytes taken from the input, selector included.
    pub consumed_bytes: usize,
    pub client: SideReport,
    pub server: SideReport,
}

impl RunReport {
    pub fn input_too_short(input_len: usize) -> Self {
        Self {
            exit: RunExit::InputTooShort,
            input_len,
            selector: None,
            selector_in_range: false,
            injection_owner: None,
            iterations: 0,
            consumed_bytes: 0,
            client: SideReport::default(),
            server: SideReport::default(),
        }
    }

    pub fn injected_bytes(&self) -> usize {
        self.client.injected_bytes + self.server.injected_bytes
    }

    pub fn side(&self, role: Role) -> &SideReport {
        match role {
            Role::Client => &self.client,
            Role::Server => &self.server,
        }
    }
}
