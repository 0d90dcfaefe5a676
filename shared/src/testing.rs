//! Test doubles shared by the endpoint tests.

use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::auth::AuthenticatedUser;
use crate::inference::InferenceGateway;
use crate::prompt::Prompt;
use crate::trace::TraceId;
use crate::{Error, Result};

pub fn caller() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: "coach-1".to_string(),
    }
}

/// Gateway that returns a fixed reply (or a one-shot failure) and records
/// every prompt it receives.
pub struct ScriptedGateway {
    configured: bool,
    reply: String,
    failure: Mutex<Option<Error>>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<Prompt>>,
}

impl ScriptedGateway {
    pub fn reply(raw: &str) -> Self {
        Self {
            configured: true,
            reply: raw.to_string(),
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn failing(err: Error) -> Self {
        let gateway = Self::reply("");
        *gateway.failure.lock().unwrap() = Some(err);
        gateway
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::reply("")
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceGateway for ScriptedGateway {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn complete(&self, prompt: &Prompt, _trace_id: &TraceId) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.clone());
        if let Some(err) = self.failure.lock().unwrap().take() {
            return Err(err);
        }
        Ok(self.reply.clone())
    }
}

/// Run a future to completion on a fresh current-thread runtime.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

/// Run `f` with a JSON subscriber installed on this thread and return
/// everything it logged, one JSON object per line.
pub fn capture_logs<F: FnOnce()>(f: F) -> String {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&buffer);
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || LogSink(Arc::clone(&sink)))
        .finish();
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.lock().unwrap().clone();
    String::from_utf8(bytes).unwrap()
}

struct LogSink(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
