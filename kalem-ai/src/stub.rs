//! Deterministic stand-in for a real model, for tests and offline runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use kalem_common::Error;

use crate::models::AnalysisRequest;
use crate::traits::ModelProvider;

#[derive(Debug, Clone)]
enum StubReply {
    Text(String),
    ServiceError(String),
    FormatError(String),
}

/// Replies with canned text. With several replies queued, each call takes the
/// next one and the last keeps repeating.
pub struct StubProvider {
    replies: Mutex<VecDeque<StubReply>>,
    calls: AtomicUsize,
    last_request: Mutex<Option<AnalysisRequest>>,
}

impl StubProvider {
    fn from_replies(replies: Vec<StubReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_reply(text: impl Into<String>) -> Self {
        Self::from_replies(vec![StubReply::Text(text.into())])
    }

    pub fn with_replies<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_replies(texts.into_iter().map(|t| StubReply::Text(t.into())).collect())
    }

    /// Every call fails as if the service were down.
    pub fn failing_service(message: impl Into<String>) -> Self {
        Self::from_replies(vec![StubReply::ServiceError(message.into())])
    }

    /// Every call fails as if the body had no text.
    pub fn failing_format(message: impl Into<String>) -> Self {
        Self::from_replies(vec![StubReply::FormatError(message.into())])
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn last_request(&self) -> Option<AnalysisRequest> {
        self.last_request.lock().await.clone()
    }
}

#[async_trait]
impl ModelProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn complete(&self, request: &AnalysisRequest) -> Result<String, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().await = Some(request.clone());

        let reply = {
            let mut replies = self.replies.lock().await;
            if replies.len() > 1 {
                replies.pop_front()
            } else {
                replies.front().cloned()
            }
        };

        match reply {
            Some(StubReply::Text(text)) => Ok(text),
            Some(StubReply::ServiceError(msg)) => Err(Error::AnalysisService(msg)),
            Some(StubReply::FormatError(msg)) => Err(Error::AnalysisFormat(msg)),
            None => Err(Error::AnalysisService("stub has no reply configured".to_string())),
        }
    }
}
