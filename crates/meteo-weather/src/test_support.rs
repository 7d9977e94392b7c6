//! Fixtures shared by the unit tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::error::{FetchCause, FetchError};
use crate::provider::{parse_snapshot, Fetcher};
use crate::types::Snapshot;

/// The recorded Open-Meteo response used across the workspace tests.
pub const FORECAST_FIXTURE: &str = include_str!("../tests/fixtures/forecast.json");

/// The fixture with its current temperature set to `temperature`.
pub fn forecast_json(temperature: f64) -> serde_json::Value {
    let mut doc: serde_json::Value = match serde_json::from_str(FORECAST_FIXTURE) {
        Ok(doc) => doc,
        Err(e) => panic!("fixture must be valid JSON: {}", e),
    };
    doc["current"]["temperature_2m"] = serde_json::json!(temperature);
    doc["current"]["apparent_temperature"] = serde_json::json!(temperature - 1.5);
    doc
}

pub fn snapshot(temperature: f64) -> Snapshot {
    match parse_snapshot(forecast_json(temperature).to_string().as_bytes()) {
        Ok(snapshot) => snapshot,
        Err(e) => panic!("fixture must parse: {}", e),
    }
}

pub fn upstream_error(status: u16) -> FetchError {
    FetchCause::UpstreamStatus {
        status,
        body: "upstream unavailable".into(),
    }
    .into()
}

/// Fetcher that replays scripted outcomes and counts calls.
///
/// When gated, each fetch waits for [`ScriptedFetcher::release`] before
/// returning, so tests can pile up concurrent callers behind it.
#[derive(Clone)]
pub struct ScriptedFetcher {
    outcomes: Arc<Mutex<VecDeque<Result<Snapshot, FetchError>>>>,
    calls: Arc<AtomicUsize>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedFetcher {
    pub fn new(outcomes: Vec<Result<Snapshot, FetchError>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
        }
    }

    pub fn gated(outcomes: Vec<Result<Snapshot, FetchError>>) -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new(outcomes)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }
}

impl Fetcher for ScriptedFetcher {
    fn fetch(&self) -> impl Future<Output = Result<Snapshot, FetchError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(upstream_error(599)));
        let gate = self.gate.clone();

        async move {
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            outcome
        }
    }
}
