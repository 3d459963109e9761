//! Keyboard and resize events from the terminal.
//!
//! A background task reads crossterm's event stream and forwards key presses
//! and resizes into the loop's channel.

use crossterm::event::{Event as TermEvent, EventStream, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::warn;

use super::event::Event;

pub struct InputReader {
    task: Option<JoinHandle<()>>,
}

impl InputReader {
    pub fn spawn(events: UnboundedSender<Event>) -> Self {
        let task = tokio::spawn(read_loop(EventStream::new(), events));
        Self { task: Some(task) }
    }

    /// Stop delivering events.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for InputReader {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn read_loop(mut stream: EventStream, events: UnboundedSender<Event>) {
    while let Some(received) = stream.next().await {
        let event = match received {
            Ok(TermEvent::Key(key)) if key.kind == KeyEventKind::Press => Event::Key(key),
            Ok(TermEvent::Resize(width, height)) => Event::Resize(width, height),
            Ok(_) => continue,
            Err(err) => {
                warn!(error = %err, "terminal read failed");
                break;
            }
        };
        if events.send(event).is_err() {
            break;
        }
    }
}
