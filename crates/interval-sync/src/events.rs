use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::trace;

use crate::model::{Notice, Progress, SyncReport, WidgetOutcome};
use crate::ports::EventsPort;

#[derive(Clone, Debug, PartialEq)]
pub enum SyncEvent {
    Progress(Progress),
    Notice(Notice),
    Eligibility { eligible: bool },
    WidgetFinished(WidgetOutcome),
    RunFinished(SyncReport),
}

/// In-process fan-out of sync events over a broadcast channel.
pub struct BroadcastEvents {
    sender: broadcast::Sender<SyncEvent>,
}

impl BroadcastEvents {
    pub fn new(capacity: usize) -> Arc<Self> {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self { sender })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }
}

impl EventsPort for BroadcastEvents {
    fn publish(&self, event: SyncEvent) {
        // No subscribers is a normal state while the panel is closed.
        if self.sender.send(event).is_err() {
            trace!("sync event dropped: no subscribers");
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct NullEvents;

impl EventsPort for NullEvents {
    fn publish(&self, _event: SyncEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoticeLevel;

    #[test]
    fn subscribers_receive_published_events() {
        let events = BroadcastEvents::new(8);
        let mut rx = events.subscribe();
        events.publish(SyncEvent::Notice(Notice::new(NoticeLevel::Info, "hello")));
        match tokio_test::block_on(rx.recv()).unwrap() {
            SyncEvent::Notice(notice) => assert_eq!(notice.message, "hello"),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn publishing_without_subscribers_is_silent() {
        let events = BroadcastEvents::new(1);
        events.publish(SyncEvent::Eligibility { eligible: true });
    }
}
