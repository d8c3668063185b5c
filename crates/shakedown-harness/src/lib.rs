//! Shakedown harness: drives a TLS client and server through a handshake in
//! lock-step and injects fuzz payload at a selected handshake state.

pub mod config;
pub mod cursor;
pub mod error;
pub mod harness;
pub mod report;
pub mod scheduler;

pub use config::HarnessConfig;
pub use cursor::{InputCursor, SELECTOR_WIDTH};
pub use error::{HarnessError, Result};
pub use harness::{fuzz_one_input, run_input, Harness};
pub use report::{RunExit, RunReport, SideReport};
pub use scheduler::{FuzzScheduler, Selector};
