use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::schedule::RepeatingTask;

#[derive(Clone, Debug)]
pub enum Event {
    Key(KeyEvent),
    MetricsTick,
    TableTick,
    Resize,
}

/// Timer ticks for both cadences, each from its own `RepeatingTask`.
pub struct Ticker {
    _metrics: RepeatingTask,
    _table: RepeatingTask,
}

impl Ticker {
    pub fn spawn(
        tx: mpsc::UnboundedSender<Event>,
        metrics_every: Duration,
        table_every: Duration,
    ) -> Self {
        let metrics_tx = tx.clone();
        let metrics = RepeatingTask::spawn(metrics_every, move || {
            metrics_tx.send(Event::MetricsTick).is_ok()
        });
        let table = RepeatingTask::spawn(table_every, move || tx.send(Event::TableTick).is_ok());
        Ticker {
            _metrics: metrics,
            _table: table,
        }
    }
}

pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _ticker: Ticker,
    input: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    pub fn new(metrics_every: Duration, table_every: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<Event>();
        let ticker = Ticker::spawn(tx.clone(), metrics_every, table_every);

        let input = tokio::spawn(async move {
            let mut reader = event::EventStream::new();
            while let Some(Ok(evt)) = reader.next().await {
                let mapped = match evt {
                    CrosstermEvent::Key(key) => Some(Event::Key(key)),
                    CrosstermEvent::Resize(_, _) => Some(Event::Resize),
                    _ => None,
                };
                if let Some(e) = mapped
                    && tx.send(e).is_err()
                {
                    break;
                }
            }
        });

        Self {
            rx,
            _ticker: ticker,
            input,
        }
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.input.abort();
    }
}
