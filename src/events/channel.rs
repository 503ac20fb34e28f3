//! Crossbeam channel carrying pipeline events to whoever renders progress.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sending half, cloned into every rayon worker that reports progress.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event; discarded once the receiver is gone.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half, drained by the CLI progress thread.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Iterate until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Unbounded event channel between the pipeline and a UI.
pub struct EventChannel;

impl EventChannel {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// Sender whose receiver is already dropped, for runs without progress.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{PipelineEvent, SliceEvent, SliceProgress};
    use rayon::prelude::*;
    use std::path::PathBuf;

    #[test]
    fn progress_from_workers_reaches_the_receiver() {
        let (sender, receiver) = EventChannel::new();

        (0..25usize).into_par_iter().for_each(|i| {
            sender.send(Event::Slice(SliceEvent::Progress(SliceProgress {
                completed: i + 1,
                total: 25,
                current_path: PathBuf::from(format!("shot-{}.png", i)),
            })));
        });
        drop(sender);

        let mut completed: Vec<usize> = receiver
            .iter()
            .filter_map(|event| match event {
                Event::Slice(SliceEvent::Progress(p)) => Some(p.completed),
                _ => None,
            })
            .collect();
        completed.sort_unstable();

        assert_eq!(completed, (1..=25).collect::<Vec<_>>());
    }

    #[test]
    fn null_sender_discards_events() {
        let sender = null_sender();
        sender.send(Event::Pipeline(PipelineEvent::Started));
        sender.clone().send(Event::Pipeline(PipelineEvent::Cancelled));
    }
}
