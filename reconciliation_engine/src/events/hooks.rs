use std::{future::Future, pin::Pin, sync::Arc};

use crate::events::{CheckoutCompletedEvent, EventHandler, EventProducer, Handler};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub checkout_completed_producer: Vec<EventProducer<CheckoutCompletedEvent>>,
}

pub struct EventHandlers {
    pub on_checkout_completed: Option<EventHandler<CheckoutCompletedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_checkout_completed = hooks.on_checkout_completed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_checkout_completed }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_checkout_completed {
            result.checkout_completed_producer.push(handler.subscribe());
        }
        result
    }

    pub async fn start_handlers(self) {
        if let Some(handler) = self.on_checkout_completed {
            tokio::spawn(async move {
                handler.start_handler().await;
            });
        }
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_checkout_completed: Option<Handler<CheckoutCompletedEvent>>,
}

impl EventHooks {
    pub fn on_checkout_completed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(CheckoutCompletedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_checkout_completed = Some(Arc::new(f));
        self
    }
}
