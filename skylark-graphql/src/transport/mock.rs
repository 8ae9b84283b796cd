//! An in-memory [`Transport`](super::Transport) for tests.
//!
//! The mock never interprets documents. It records every request it is given and answers with
//! responses queued up front, in order. Clones share the same queue and log, so a test can keep one
//! handle while a [`Client`](super::Client) owns another.
#![cfg(any(test, feature = "mocks"))]

use super::{Error, Request, Response, Transport};
use async_std::sync::{Arc, Mutex};
use async_trait::async_trait;
use std::collections::VecDeque;

#[derive(Debug, Default)]
struct State {
    requests: Vec<Request>,
    replies: VecDeque<Result<Response, Error>>,
}

/// A transport which replays queued responses.
#[derive(Clone, Debug, Default)]
pub struct MockTransport(Arc<Mutex<State>>);

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response for the next unanswered request.
    pub async fn reply(&self, response: Response) {
        self.0.lock().await.replies.push_back(Ok(response));
    }

    /// Fail the next unanswered request.
    pub async fn fail(&self, error: Error) {
        self.0.lock().await.replies.push_back(Err(error));
    }

    /// Every request executed so far, oldest first.
    pub async fn requests(&self) -> Vec<Request> {
        self.0.lock().await.requests.clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: Request) -> Result<Response, Error> {
        let mut state = self.0.lock().await;
        let name = request.document().name().to_string();
        state.requests.push(request);
        match state.replies.pop_front() {
            Some(reply) => reply,
            None => Err(Error::network(format!("no reply queued for {name}"))),
        }
    }
}
