//! Journal - ExpiryEvent を組み立てて EventSink に送る

use std::sync::Arc;

use crate::domain::{ExpiryEvent, ExpiryEventKind, ItemId};
use crate::ports::{Clock, EventSink, IdGenerator};

#[derive(Clone)]
pub struct Journal {
    sink: Arc<dyn EventSink>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl Journal {
    pub fn new(sink: Arc<dyn EventSink>, ids: Arc<dyn IdGenerator>, clock: Arc<dyn Clock>) -> Self {
        Self { sink, ids, clock }
    }

    pub async fn record(&self, item: ItemId, kind: ExpiryEventKind) {
        let event = ExpiryEvent::new(self.ids.generate_event_id(), item, self.clock.now(), kind);
        self.sink.emit(event).await;
    }
}
