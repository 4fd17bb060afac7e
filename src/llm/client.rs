//! Generative client with background initialization
//!
//! Loading a backend can be slow (model download, network handshake), so it
//! happens once on a worker thread. Callers never block on it for longer
//! than the wait they ask for: [`GenerativeClient::is_available`] waits on a
//! condition variable with a deadline, and every completion call is bounded
//! by a per-call timeout. All failures surface as `None`.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::backend::{CompletionRequest, GenerationKind, GenerativeBackend, HttpBackend};
use crate::core::error::{Result, VaultError};

/// Backend initialization state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InitStatus {
    NotStarted,
    Pending,
    Ready,
    Failed,
}

type Loader = Box<dyn FnOnce() -> Result<Arc<dyn GenerativeBackend>> + Send>;

struct ClientState {
    status: InitStatus,
    backend: Option<Arc<dyn GenerativeBackend>>,
    loader: Option<Loader>,
}

struct Shared {
    state: Mutex<ClientState>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ClientState> {
        // Every write replaces the status whole, so a poisoned lock is still consistent
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct GenerativeClient {
    shared: Arc<Shared>,
    call_timeout: Duration,
}

impl GenerativeClient {
    /// Client whose backend is produced by `loader` on first initialization
    pub fn new<F>(loader: F, call_timeout: Duration) -> Self
    where
        F: FnOnce() -> Result<Arc<dyn GenerativeBackend>> + Send + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ClientState {
                    status: InitStatus::NotStarted,
                    backend: None,
                    loader: Some(Box::new(loader)),
                }),
                changed: Condvar::new(),
            }),
            call_timeout,
        }
    }

    /// Client around an already-built backend
    pub fn with_backend(backend: Arc<dyn GenerativeBackend>, call_timeout: Duration) -> Self {
        Self::new(move || Ok(backend), call_timeout)
    }

    /// Client with no backend; reports Failed once initialized
    pub fn disabled() -> Self {
        Self::new(
            || Err(VaultError::Backend("no generative backend configured".into())),
            Duration::from_secs(1),
        )
    }

    /// HTTP backend configured from LLM_* environment variables
    pub fn from_env(call_timeout: Duration) -> Self {
        Self::new(
            move || {
                let backend = HttpBackend::from_env()?.with_request_timeout(call_timeout);
                Ok(Arc::new(backend) as Arc<dyn GenerativeBackend>)
            },
            call_timeout,
        )
    }

    /// Start loading the backend on a worker thread. Later calls are no-ops.
    pub fn initialize(&self) {
        let loader = {
            let mut state = self.shared.lock();
            if state.status != InitStatus::NotStarted {
                return;
            }
            state.status = InitStatus::Pending;
            state.loader.take()
        };

        let Some(loader) = loader else {
            self.finish(Err(VaultError::Backend("loader already consumed".into())));
            return;
        };

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("generative-init".into())
            .spawn(move || {
                // A panicking loader settles as Failed instead of leaving callers waiting
                let outcome = panic::catch_unwind(AssertUnwindSafe(loader))
                    .unwrap_or_else(|_| Err(VaultError::Backend("backend loader panicked".into())));
                finish_init(&shared, outcome);
            });

        if let Err(e) = spawned {
            self.finish(Err(VaultError::Io(e)));
        }
    }

    fn finish(&self, outcome: Result<Arc<dyn GenerativeBackend>>) {
        finish_init(&self.shared, outcome);
    }

    /// Non-blocking status poll
    pub fn status(&self) -> InitStatus {
        self.shared.lock().status
    }

    /// Whether the backend is ready, waiting at most `wait` while it loads
    pub fn is_available(&self, wait: Duration) -> bool {
        let state = self.shared.lock();
        let status = state.status;
        match status {
            InitStatus::Ready => true,
            InitStatus::NotStarted | InitStatus::Failed => false,
            InitStatus::Pending => {
                let (state, _) = self
                    .shared
                    .changed
                    .wait_timeout_while(state, wait, |s| s.status == InitStatus::Pending)
                    .unwrap_or_else(|e| e.into_inner());
                state.status == InitStatus::Ready
            }
        }
    }

    /// One completion, or `None` if the backend is unavailable, errors,
    /// times out or returns nothing
    pub fn generate(&self, prompt: &str, max_tokens: u32, kind: GenerationKind) -> Option<String> {
        let backend = {
            let state = self.shared.lock();
            match (&state.status, &state.backend) {
                (InitStatus::Ready, Some(backend)) => Arc::clone(backend),
                _ => return None,
            }
        };

        let request = CompletionRequest::new(kind, prompt, max_tokens);
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("generative-call".into())
            .spawn(move || {
                // Receiver may be gone after a timeout
                let _ = tx.send(backend.complete(&request));
            });
        if let Err(e) = spawned {
            warn!("Could not spawn generation thread: {}", e);
            return None;
        }

        match rx.recv_timeout(self.call_timeout) {
            Ok(Ok(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    debug!("Backend returned empty {:?} completion", kind);
                    None
                } else {
                    debug!("Generated {} chars for {:?}", text.len(), kind);
                    Some(text.to_string())
                }
            }
            Ok(Err(e)) => {
                warn!("Generation failed: {}", e);
                None
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!("{}", VaultError::GenerationTimeout(self.call_timeout));
                None
            }
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Generation thread exited without a result");
                None
            }
        }
    }
}

fn finish_init(shared: &Shared, outcome: Result<Arc<dyn GenerativeBackend>>) {
    let mut state = shared.lock();
    match outcome {
        Ok(backend) => {
            info!("Generative backend ready: {}", backend.name());
            state.backend = Some(backend);
            state.status = InitStatus::Ready;
        }
        Err(e) => {
            info!("Generative backend unavailable, using fallbacks: {}", e);
            state.status = InitStatus::Failed;
        }
    }
    shared.changed.notify_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::backend::ScriptedBackend;
    use std::time::Instant;

    fn scripted(reply: &str) -> (Arc<ScriptedBackend>, GenerativeClient) {
        let backend = Arc::new(ScriptedBackend::repeating(reply));
        let client = GenerativeClient::with_backend(backend.clone(), Duration::from_secs(2));
        (backend, client)
    }

    #[test]
    fn test_not_started_is_unavailable_without_waiting() {
        let (_, client) = scripted("x");
        let start = Instant::now();
        assert!(!client.is_available(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(client.status(), InitStatus::NotStarted);
    }

    #[test]
    fn test_initialize_then_generate() {
        let (backend, client) = scripted("hello");
        client.initialize();
        assert!(client.is_available(Duration::from_secs(2)));
        assert_eq!(client.status(), InitStatus::Ready);
        assert_eq!(
            client.generate("p", 10, GenerationKind::Quiz).as_deref(),
            Some("hello")
        );
        assert_eq!(backend.calls(), 1);
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (_, client) = scripted("x");
        client.initialize();
        client.initialize();
        assert!(client.is_available(Duration::from_secs(2)));
    }

    #[test]
    fn test_disabled_reports_failed() {
        let client = GenerativeClient::disabled();
        client.initialize();
        assert!(!client.is_available(Duration::from_secs(2)));
        assert_eq!(client.status(), InitStatus::Failed);
        assert!(client.generate("p", 10, GenerationKind::Enemy).is_none());
    }

    #[test]
    fn test_pending_wait_is_bounded() {
        let client = GenerativeClient::new(
            || {
                thread::sleep(Duration::from_millis(500));
                Ok(Arc::new(ScriptedBackend::repeating("x")) as Arc<dyn GenerativeBackend>)
            },
            Duration::from_secs(1),
        );
        client.initialize();

        let start = Instant::now();
        assert!(!client.is_available(Duration::from_millis(50)));
        assert!(start.elapsed() < Duration::from_millis(400));
        assert!(client.is_available(Duration::from_secs(5)));
    }

    #[test]
    fn test_panicking_loader_settles_failed() {
        let client = GenerativeClient::new(
            || -> Result<Arc<dyn GenerativeBackend>> { panic!("loader blew up") },
            Duration::from_secs(1),
        );
        client.initialize();

        let start = Instant::now();
        assert!(!client.is_available(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(client.status(), InitStatus::Failed);
        assert!(!client.is_available(Duration::from_secs(5)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_call_timeout_yields_none() {
        let backend =
            Arc::new(ScriptedBackend::repeating("late").with_delay(Duration::from_millis(500)));
        let client = GenerativeClient::with_backend(backend, Duration::from_millis(50));
        client.initialize();
        assert!(client.is_available(Duration::from_secs(1)));

        let start = Instant::now();
        assert!(client.generate("p", 10, GenerationKind::Quiz).is_none());
        assert!(start.elapsed() < Duration::from_millis(400));
    }

    #[test]
    fn test_empty_and_failed_output_yield_none() {
        let (_, client) = scripted("   ");
        client.initialize();
        assert!(client.is_available(Duration::from_secs(1)));
        assert!(client.generate("p", 10, GenerationKind::Quiz).is_none());

        let failing = GenerativeClient::with_backend(
            Arc::new(ScriptedBackend::failing()),
            Duration::from_secs(1),
        );
        failing.initialize();
        assert!(failing.is_available(Duration::from_secs(1)));
        assert!(failing.generate("p", 10, GenerationKind::Quiz).is_none());
    }
}
