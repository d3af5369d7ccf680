use futures::stream::Stream;
use sessionlog_types::DiagnosticEvent;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

/// Fan-out of "new event appended" notifications
#[derive(Debug, Default)]
pub(crate) struct Observers {
    senders: Vec<UnboundedSender<Arc<DiagnosticEvent>>>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self) -> LiveStream {
        let (tx, rx) = unbounded_channel();
        self.senders.push(tx);
        LiveStream { receiver: rx }
    }

    /// Deliver to every subscriber, dropping the ones that went away.
    pub(crate) fn notify(&mut self, event: &Arc<DiagnosticEvent>) {
        self.senders.retain(|tx| tx.send(Arc::clone(event)).is_ok());
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}

/// Live stream of events appended to the log after subscription
pub struct LiveStream {
    receiver: UnboundedReceiver<Arc<DiagnosticEvent>>,
}

impl LiveStream {
    /// Poll for the next event (non-blocking).
    ///
    /// Returns `None` if no event is available immediately.
    pub fn try_next(&mut self) -> Option<Arc<DiagnosticEvent>> {
        self.receiver.try_recv().ok()
    }
}

impl Stream for LiveStream {
    type Item = Arc<DiagnosticEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
