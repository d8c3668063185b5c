//! Per-input entry points.

use std::sync::OnceLock;

use shakedown_transport::{EndpointFactory, TlsEndpointFactory, Wire};
use tracing::{debug, error};

use crate::config::HarnessConfig;
use crate::cursor::InputCursor;
use crate::error::Result;
use crate::report::RunReport;
use crate::scheduler::FuzzScheduler;

/// Runs one fuzz input against endpoints built by `factory`.
///
/// Inputs that hold no payload after the selector return without touching
/// the factory. An invalid `config` is rejected before anything else.
pub fn run_input<F: EndpointFactory>(
    factory: &F,
    config: &HarnessConfig,
    data: &[u8],
) -> Result<RunReport> {
    config.validate()?;
    let mut cursor = InputCursor::new(data);
    let raw_selector = match cursor.read_selector() {
        Some(raw) if !cursor.is_exhausted() => raw,
        _ => {
            debug!(len = data.len(), "input too short");
            return Ok(RunReport::input_too_short(data.len()));
        }
    };

    let (client, server) = factory.build()?;
    let wire = Wire::new(config.channel_capacity);
    Ok(FuzzScheduler::new(client, server, wire, raw_selector, cursor).run())
}

/// A validated config paired with the TLS factory built from it.
#[derive(Debug)]
pub struct Harness {
    config: HarnessConfig,
    factory: TlsEndpointFactory,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Result<Self> {
        config.validate()?;
        let factory = TlsEndpointFactory::new(&config.tls)?;
        Ok(Self { config, factory })
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn run(&self, data: &[u8]) -> Result<RunReport> {
        run_input(&self.factory, &self.config, data)
    }
}

fn shared_harness() -> Option<&'static Harness> {
    static SHARED: OnceLock<Option<Harness>> = OnceLock::new();
    SHARED
        .get_or_init(|| match Harness::new(HarnessConfig::default()) {
            Ok(harness) => Some(harness),
            Err(e) => {
                error!(error = %e, "harness setup failed");
                None
            }
        })
        .as_ref()
}

/// libFuzzer-style entry point.
///
/// Returns 0 for every run that ends without a detected violation and a
/// negative value only if the harness itself could not be set up.
pub fn fuzz_one_input(data: &[u8]) -> i32 {
    let Some(harness) = shared_harness() else {
        return -1;
    };
    match harness.run(data) {
        Ok(_) => 0,
        Err(e) => {
            error!(error = %e, "run setup failed");
            -1
        }
    }
}
