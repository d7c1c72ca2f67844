use super::{Transport, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::time::Instant;

/// One scripted outcome of `StubTransport::send`.
#[derive(Debug, Clone)]
pub enum StubStep {
    Respond(HttpResponse),
    Fail(TransportError),
    /// Never completes; only a timeout gets the caller out.
    Hang,
}

/// Replays scripted outcomes in order and records every request it sees.
#[derive(Debug, Default)]
pub struct StubTransport {
    steps: Mutex<VecDeque<StubStep>>,
    requests: Mutex<Vec<(Instant, HttpRequest)>>,
}

impl StubTransport {
    pub fn new(steps: impl IntoIterator<Item = StubStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            requests: Default::default(),
        }
    }

    pub fn respond(status: u16, body: &str) -> StubStep {
        StubStep::Respond(HttpResponse::new(status, body))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(_, request)| request.clone())
            .collect()
    }

    /// Instants at which each request was received.
    pub fn instants(&self) -> Vec<Instant> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(instant, _)| *instant)
            .collect()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let step = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .expect("stub step");
        self.requests.lock().unwrap().push((Instant::now(), request));

        match step {
            StubStep::Respond(response) => Ok(response),
            StubStep::Fail(error) => Err(error),
            StubStep::Hang => std::future::pending().await,
        }
    }
}
