use tokio::sync::mpsc;

/// User-facing notification emitted by the cart store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toast {
    Success(String),
    Error(String),
}

/// Fire-and-forget toast channel. Dropping the receiver silently discards
/// further toasts.
#[derive(Debug, Clone)]
pub struct ToastSink {
    tx: mpsc::UnboundedSender<Toast>,
}

impl ToastSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn success(&self, message: impl Into<String>) {
        let _ = self.tx.send(Toast::Success(message.into()));
    }

    pub fn error(&self, message: impl Into<String>) {
        let _ = self.tx.send(Toast::Error(message.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_toasts_in_order() {
        let (sink, mut rx) = ToastSink::channel();
        sink.success("added");
        sink.error("failed");
        assert_eq!(rx.recv().await, Some(Toast::Success("added".into())));
        assert_eq!(rx.recv().await, Some(Toast::Error("failed".into())));
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (sink, rx) = ToastSink::channel();
        drop(rx);
        sink.success("nobody listening");
    }
}
