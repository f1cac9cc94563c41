use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Default)]
struct PacerState {
    last_finished: Option<Instant>,
    calls: usize,
}

/// Serialized call queue with a mandatory gap between calls.
///
/// Invariant: a call starts no earlier than `delay` after the previous call
/// finished, whatever its outcome. The first call starts immediately.
/// Callers queue on the internal lock, so calls never overlap.
#[derive(Debug)]
pub struct CallPacer {
    delay: Duration,
    state: Mutex<PacerState>,
}

impl CallPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: Mutex::new(PacerState::default()),
        }
    }

    pub async fn run<F, T>(&self, call: F) -> T
    where
        F: Future<Output = T>,
    {
        let mut state = self.state.lock().await;
        if let Some(prev) = state.last_finished {
            let ready_at = prev + self.delay;
            if ready_at > Instant::now() {
                debug!("Pacing model call for {:?}", ready_at - Instant::now());
                tokio::time::sleep_until(ready_at).await;
            }
        }

        let output = call.await;
        state.last_finished = Some(Instant::now());
        state.calls += 1;
        output
    }

    /// Calls completed so far.
    pub async fn calls(&self) -> usize {
        self.state.lock().await.calls
    }
}
