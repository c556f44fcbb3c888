use super::command::Command;
use super::timer::TimerEntry;
use crate::error::Error;
use crate::runtime::executor::injector::{Injector, Runnable};

use std::collections::BinaryHeap;
use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// The reactor thread state.
pub(crate) struct Reactor {
    receiver: Receiver<Command>,

    /// Pending timers, earliest deadline on top.
    timers: BinaryHeap<TimerEntry>,

    /// Worker pool that settles expired timers.
    injector: Arc<Injector>,
}

/// Owner-side handle to a running reactor thread.
pub(crate) struct ReactorHandle {
    sender: Sender<Command>,
    thread: Option<JoinHandle<()>>,
}

impl Reactor {
    /// Spawns the reactor thread.
    pub(crate) fn start(injector: Arc<Injector>, name: String) -> io::Result<ReactorHandle> {
        let (sender, receiver) = mpsc::channel();

        let mut reactor = Self {
            receiver,
            timers: BinaryHeap::new(),
            injector,
        };

        let thread = thread::Builder::new()
            .name(name)
            .spawn(move || reactor.run())?;

        Ok(ReactorHandle {
            sender,
            thread: Some(thread),
        })
    }

    /// Runs until a shutdown command arrives or every sender is gone.
    fn run(&mut self) {
        loop {
            self.fire_expired(Instant::now());

            let command = match self.timers.peek() {
                Some(next) => {
                    let wait = next.deadline.saturating_duration_since(Instant::now());

                    match self.receiver.recv_timeout(wait) {
                        Ok(command) => command,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match self.receiver.recv() {
                    Ok(command) => command,
                    Err(_) => break,
                },
            };

            if !self.handle(command) {
                break;
            }
        }

        self.abandon_pending();
    }

    /// Applies one command. Returns `false` once the reactor should stop.
    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::SetTimer {
                deadline,
                promise,
                cancelled,
            } => {
                tracing::trace!(pending = self.timers.len() + 1, "timer registered");
                self.timers.push(TimerEntry {
                    deadline,
                    promise,
                    cancelled,
                });
            }
            Command::CancelTimer => {
                let before = self.timers.len();
                self.timers.retain(|timer| !timer.is_cancelled());
                tracing::trace!(
                    released = before - self.timers.len(),
                    pending = self.timers.len(),
                    "cancelled timers released"
                );
            }
            Command::Shutdown => return false,
        }

        true
    }

    /// Dispatches every timer whose deadline is not after `now`.
    fn fire_expired(&mut self, now: Instant) {
        while let Some(timer) = self.timers.peek() {
            if timer.deadline > now {
                break;
            }

            let Some(timer) = self.timers.pop() else {
                break;
            };

            if timer.is_cancelled() {
                continue;
            }

            tracing::trace!("timer fired");
            self.injector.push(Box::new(Fire(timer)));
        }
    }

    /// Fails every timer still waiting at shutdown.
    fn abandon_pending(&mut self) {
        for timer in self.timers.drain() {
            let _ = timer.promise.set_error(Error::Shutdown);
        }
    }
}

impl ReactorHandle {
    pub(crate) fn sender(&self) -> Sender<Command> {
        self.sender.clone()
    }

    /// Sends the shutdown command and joins the reactor thread.
    pub(crate) fn shutdown(&mut self) {
        let _ = self.sender.send(Command::Shutdown);

        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Settles an expired timer on a worker thread.
struct Fire(TimerEntry);

impl Runnable for Fire {
    fn run(self: Box<Self>) {
        let _ = self.0.promise.set_value(());
    }

    fn abandon(self: Box<Self>) {
        let _ = self.0.promise.set_error(Error::Shutdown);
    }
}
