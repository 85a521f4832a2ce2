//! SubmissionDispatcher: runs pipeline submissions off the UI loop.
//!
//! Each submission runs in its own tokio task. When it finishes, the outcome is sent
//! as a [`PipelineEvent`] through an unbounded mpsc channel, which the TUI main loop
//! polls with tokio::select!. Starting a new submission aborts the previous task; the
//! session's ticket check drops anything that was already on its way.

use ragscope_core::{PipelineClient, RequestPayload, Submission, Ticket};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Events sent from submission tasks to the TUI event loop.
#[derive(Debug)]
pub enum PipelineEvent {
    /// A submission finished, successfully or not.
    Completed {
        ticket: Ticket,
        outcome: ragscope_core::Result<Submission>,
    },
}

/// Spawns submission tasks and forwards their outcomes to the TUI.
pub struct SubmissionDispatcher {
    tx: mpsc::UnboundedSender<PipelineEvent>,
    in_flight: Option<JoinHandle<()>>,
}

impl SubmissionDispatcher {
    /// Create a new dispatcher and its corresponding receiver.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                in_flight: None,
            },
            rx,
        )
    }

    /// Start `payload` for `ticket`, aborting the task of any earlier submission.
    pub fn dispatch(&mut self, client: &PipelineClient, ticket: Ticket, payload: RequestPayload) {
        self.abort();
        let client = client.clone();
        let tx = self.tx.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let outcome = client.submit(&payload).await;
            let _ = tx.send(PipelineEvent::Completed { ticket, outcome });
        }));
    }

    /// Abort the running submission task, if any.
    pub fn abort(&mut self) {
        if let Some(handle) = self.in_flight.take()
            && !handle.is_finished()
        {
            tracing::debug!("Aborting superseded submission task");
            handle.abort();
        }
    }
}

impl Drop for SubmissionDispatcher {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragscope_core::{MockBackend, Parameters, PipelineResult, Protocol, Session};
    use std::sync::Arc;
    use std::time::Duration;

    fn answer(text: &str) -> PipelineResult {
        PipelineResult {
            answer: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_dispatch_sends_completed() {
        let backend = Arc::new(MockBackend::new());
        backend.queue(Ok(answer("X is Y.")));
        let client = PipelineClient::new(backend, Protocol::SinglePhase);
        let mut session = Session::new();
        let (ticket, payload) = session.begin(&Parameters::new("q", 120, 30, 5)).unwrap();

        let (mut dispatcher, mut rx) = SubmissionDispatcher::new();
        dispatcher.dispatch(&client, ticket, payload);

        match rx.recv().await.unwrap() {
            PipelineEvent::Completed { ticket: t, outcome } => {
                assert_eq!(t, ticket);
                assert_eq!(outcome.unwrap().answer.display_text(), "X is Y.");
            }
        }
    }

    #[tokio::test]
    async fn test_redispatch_aborts_previous_task() {
        let backend = Arc::new(MockBackend::new());
        backend.queue_delayed(Duration::from_secs(5), Ok(answer("slow")));
        backend.queue(Ok(answer("fast")));
        let client = PipelineClient::new(backend, Protocol::SinglePhase);
        let mut session = Session::new();

        let (mut dispatcher, mut rx) = SubmissionDispatcher::new();
        let (t1, p1) = session.begin(&Parameters::new("first", 120, 30, 5)).unwrap();
        dispatcher.dispatch(&client, t1, p1);
        tokio::time::sleep(Duration::from_millis(50)).await;
        let (t2, p2) = session.begin(&Parameters::new("second", 120, 30, 5)).unwrap();
        dispatcher.dispatch(&client, t2, p2);

        let PipelineEvent::Completed { ticket, outcome } = rx.recv().await.unwrap();
        assert_eq!(ticket, t2);
        assert!(session.complete(ticket, outcome));
        assert_eq!(session.answer().unwrap().display_text(), "fast");

        // The aborted task never reports back.
        drop(dispatcher);
        assert!(rx.recv().await.is_none());
    }
}
