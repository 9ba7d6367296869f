//! Driving a merge while its progress events are handled on the same task.

use std::future::Future;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Duration, Instant};

/// Upper bound on waiting for senders to go away once the task is done.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `task` to completion, passing every event from `events` to
/// `on_event`. Events still queued when the task finishes are drained
/// before the result is returned.
///
/// The task should own the sender (e.g. through the merger it runs) so the
/// channel closes when the task completes.
pub async fn run_with_events<F, E, R>(
    task: F,
    mut events: UnboundedReceiver<E>,
    mut on_event: impl FnMut(E),
) -> R
where
    F: Future<Output = R>,
{
    tokio::pin!(task);
    let mut received: u64 = 0;

    let result = loop {
        tokio::select! {
            r = &mut task => break Some(r),
            event = events.recv() => match event {
                Some(e) => {
                    received += 1;
                    on_event(e);
                }
                None => break None,
            },
        }
    };

    let Some(result) = result else {
        log::debug!("event channel closed after {} events, awaiting task", received);
        return task.await;
    };

    let deadline = Instant::now() + DRAIN_TIMEOUT;
    loop {
        match tokio::time::timeout_at(deadline, events.recv()).await {
            Ok(Some(e)) => {
                received += 1;
                on_event(e);
            }
            Ok(None) => break,
            Err(_) => {
                log::warn!(
                    "Gave up waiting for progress events after {}s",
                    DRAIN_TIMEOUT.as_secs()
                );
                break;
            }
        }
    }
    log::debug!("task finished, {} events handled", received);

    result
}
