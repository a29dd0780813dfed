use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;

use tracing::{debug, warn};

use crate::error::WriteError;
use crate::manifest::Manifest;
use crate::output::fs::SharedFileSystem;
use crate::output::writer::{OutputWriter, WriteOutcome};

type Completion = Box<dyn FnOnce(Result<WriteOutcome, WriteError>) + Send + 'static>;

/// Newest manifest waiting for the in-flight write to finish, plus everyone it answers.
struct PendingWrite {
  fs: SharedFileSystem,
  manifest: Manifest,
  waiters: Vec<Completion>,
}

#[derive(Default)]
struct QueueState {
  in_flight: bool,
  pending: Option<PendingWrite>,
}

struct Shared {
  writer: OutputWriter,
  state: Mutex<QueueState>,
  idle: Condvar,
}

/// Serializes manifest writes against one output target.
///
/// At most one write runs at a time. Requests arriving meanwhile collapse into a single
/// pending slot holding the newest manifest; when that write completes every request it
/// absorbed is notified with its result.
#[derive(Clone)]
pub struct QueuedWriter {
  shared: Arc<Shared>,
}

/// Handle for awaiting one enqueued write.
#[derive(Debug)]
pub struct WriteTicket {
  receiver: mpsc::Receiver<Result<WriteOutcome, WriteError>>,
}

impl WriteTicket {
  /// Block until the write covering this request has finished.
  pub fn wait(self) -> Result<WriteOutcome, WriteError> {
    self.receiver.recv().unwrap_or(Err(WriteError::Disconnected))
  }
}

impl QueuedWriter {
  /// Queue in front of `writer`.
  pub fn new(writer: OutputWriter) -> Self {
    Self {
      shared: Arc::new(Shared {
        writer,
        state: Mutex::new(QueueState::default()),
        idle: Condvar::new(),
      }),
    }
  }

  /// Underlying writer.
  pub fn writer(&self) -> &OutputWriter {
    &self.shared.writer
  }

  /// Enqueue `manifest` and return a ticket that resolves once it (or a newer manifest) is written.
  pub fn enqueue(&self, fs: SharedFileSystem, manifest: Manifest) -> WriteTicket {
    let (sender, receiver) = mpsc::channel();
    self.enqueue_with(fs, manifest, move |result| {
      let _ = sender.send(result);
    });
    WriteTicket { receiver }
  }

  /// Enqueue `manifest`, invoking `on_complete` exactly once with the covering write's result.
  pub fn enqueue_with<F>(&self, fs: SharedFileSystem, manifest: Manifest, on_complete: F)
  where
    F: FnOnce(Result<WriteOutcome, WriteError>) + Send + 'static,
  {
    let start_worker = {
      let mut state = self.lock_state();
      match state.pending.as_mut() {
        Some(pending) => {
          debug!(waiters = pending.waiters.len() + 1, "superseding pending manifest write");
          pending.fs = fs;
          pending.manifest = manifest;
          pending.waiters.push(Box::new(on_complete));
        }
        None => {
          state.pending = Some(PendingWrite {
            fs,
            manifest,
            waiters: vec![Box::new(on_complete)],
          });
        }
      }

      let idle = !state.in_flight;
      state.in_flight = true;
      idle
    };

    if start_worker {
      let shared = Arc::clone(&self.shared);
      let spawned = thread::Builder::new()
        .name("manifest-writer".into())
        .spawn(move || drain(&shared));
      if let Err(err) = spawned {
        warn!(error = %err, "could not start manifest writer thread, writing inline");
        drain(&self.shared);
      }
    }
  }

  /// Block until no write is in flight or pending.
  pub fn wait_idle(&self) {
    let mut state = self.lock_state();
    while state.in_flight {
      state = self
        .shared
        .idle
        .wait(state)
        .unwrap_or_else(PoisonError::into_inner);
    }
  }

  fn lock_state(&self) -> std::sync::MutexGuard<'_, QueueState> {
    self
      .shared
      .state
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
  }
}

/// Run pending writes until the slot is empty, then mark the queue idle.
fn drain(shared: &Shared) {
  loop {
    let next = {
      let mut state = shared.state.lock().unwrap_or_else(PoisonError::into_inner);
      match state.pending.take() {
        Some(next) => next,
        None => {
          state.in_flight = false;
          shared.idle.notify_all();
          return;
        }
      }
    };

    let PendingWrite {
      fs,
      manifest,
      waiters,
    } = next;
    let result = shared.writer.write(fs.as_ref(), &manifest);
    if let Err(err) = &result {
      warn!(error = %err, "manifest write failed");
    }
    for waiter in waiters {
      waiter(result.clone());
    }
  }
}
