use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{CyclerError, CyclerSnapshot, TextCycler};

/// Runs a [`TextCycler`] on the tokio timer and publishes every frame.
///
/// Mount with [`start`](Self::start), unmount with [`stop`](Self::stop) or by
/// dropping the driver. A stopped driver cannot be restarted; build a new one.
///
/// ```
/// use folio_typewriter::{CyclerTimings, TextCycler, Typewriter};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let cycler = TextCycler::new(["Hello"], CyclerTimings::default()).unwrap();
/// let mut typewriter = Typewriter::new(cycler);
/// let mut frames = typewriter.subscribe();
///
/// typewriter.start().unwrap();
/// frames.changed().await.unwrap();
/// assert_eq!(frames.borrow().displayed, "H");
/// typewriter.stop();
/// # }
/// ```
pub struct Typewriter {
    cycler: Option<TextCycler>,
    tx: Arc<watch::Sender<CyclerSnapshot>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Typewriter {
    pub fn new(cycler: TextCycler) -> Self {
        let (tx, _) = watch::channel(cycler.snapshot());
        Self {
            cycler: Some(cycler),
            tx: Arc::new(tx),
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Receive the current frame and every later one.
    pub fn subscribe(&self) -> watch::Receiver<CyclerSnapshot> {
        self.tx.subscribe()
    }

    /// Latest published frame.
    pub fn current(&self) -> CyclerSnapshot {
        self.tx.borrow().clone()
    }

    /// Spawn the tick loop on the ambient tokio runtime.
    pub fn start(&mut self) -> Result<(), CyclerError> {
        if self.cancel.is_cancelled() {
            return Err(CyclerError::Stopped);
        }
        let handle = tokio::runtime::Handle::try_current().map_err(|_| CyclerError::NoRuntime)?;
        let cycler = self.cycler.take().ok_or(CyclerError::AlreadyStarted)?;

        tracing::debug!(phrases = cycler.phrases().len(), "typewriter.start");
        self.task = Some(handle.spawn(run(cycler, self.tx.clone(), self.cancel.clone())));
        Ok(())
    }

    /// Cancel the pending tick. No frame is published once this returns.
    pub fn stop(&mut self) {
        if self.cancel.is_cancelled() {
            return;
        }
        // Cancelling under the channel's write lock orders us after any
        // in-flight publish on another worker thread.
        self.tx.send_if_modified(|_| {
            self.cancel.cancel();
            false
        });
        if let Some(task) = self.task.take() {
            task.abort();
        }
        tracing::debug!("typewriter.stop");
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some() && !self.cancel.is_cancelled()
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run(
    mut cycler: TextCycler,
    tx: Arc<watch::Sender<CyclerSnapshot>>,
    cancel: CancellationToken,
) {
    let mut delay = cycler.initial_delay();
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = sleep(delay) => {}
        }
        delay = cycler.tick();
        let frame = cycler.snapshot();
        let published = tx.send_if_modified(|slot| {
            if cancel.is_cancelled() {
                return false;
            }
            *slot = frame;
            true
        });
        if !published && cancel.is_cancelled() {
            break;
        }
    }
}
