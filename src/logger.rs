//! Asynchronous match logger.
//!
//! The agent loop runs at 50 Hz and must never wait on disk, so log calls
//! only append a formatted line to an in-memory buffer under a short-held
//! mutex. A background writer thread swaps that buffer for an empty one and
//! writes the batch with the mutex released. Producers therefore contend
//! only on the enqueue lock, never on I/O, and lines land in the file in
//! enqueue-lock order.
//!
//! This is the team-facing match log (a product artifact with a fixed line
//! format), not developer diagnostics; internals of the runtime use
//! `tracing` for the latter.
//!
//! The logger is constructed once at process startup and shared by every
//! agent via `Arc`. The log file and the writer thread are created lazily on
//! the first call, so a run that never logs leaves no file behind. If the
//! log directory or file cannot be created, calls keep succeeding and
//! messages are silently dropped; logging is never allowed to take an agent
//! down.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

use tracing::debug;

const INFO_PREFIX: &str = "[INFO]  ";
const WARN_PREFIX: &str = "[WARN]  ";
const ERROR_PREFIX: &str = "[ERROR] ";

/// Thread-safe, non-blocking line logger. See the module docs.
pub struct AsyncLogger {
    shared: Arc<Shared>,
    dir: PathBuf,
}

struct Shared {
    state: Mutex<State>,
    has_lines: Condvar,
    running: AtomicBool,
}

struct State {
    current: Vec<String>,
    worker: Option<JoinHandle<()>>,
}

impl AsyncLogger {
    /// Create a logger that will write under `dir` once first used.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State { current: Vec::with_capacity(32), worker: None }),
                has_lines: Condvar::new(),
                running: AtomicBool::new(true),
            }),
            dir: dir.into(),
        }
    }

    /// Log an informational line.
    pub fn info(&self, msg: impl Into<String>) {
        self.enqueue(INFO_PREFIX, msg.into());
    }

    /// Log a warning line.
    pub fn warn(&self, msg: impl Into<String>) {
        self.enqueue(WARN_PREFIX, msg.into());
    }

    /// Log an error line.
    pub fn error(&self, msg: impl Into<String>) {
        self.enqueue(ERROR_PREFIX, msg.into());
    }

    fn enqueue(&self, prefix: &str, msg: String) {
        let stamp = chrono::Local::now().format("[%Y-%m-%d %H:%M:%S] ");
        let line = format!("{stamp}{prefix}{msg}");

        {
            let mut state = self.shared.state.lock().expect("logger mutex poisoned");
            state.current.push(line);
            if state.worker.is_none() {
                let sink = self.open_sink();
                let shared = Arc::clone(&self.shared);
                let spawned = std::thread::Builder::new()
                    .name("touchline-log".to_string())
                    .spawn(move || writer_loop(shared, sink));
                match spawned {
                    Ok(handle) => state.worker = Some(handle),
                    Err(e) => {
                        // No writer: drop what we have rather than grow
                        // without bound; the spawn is retried on the next
                        // call.
                        debug!("log writer thread unavailable: {e}");
                        state.current.clear();
                    }
                }
            }
        }

        self.shared.has_lines.notify_one();
    }

    /// Create the log directory and file. `None` on any failure: the writer
    /// thread then drains buffers without touching disk.
    fn open_sink(&self) -> Option<BufWriter<File>> {
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            debug!("log directory {:?} unavailable, dropping log lines: {e}", self.dir);
            return None;
        }
        let name = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S.log").to_string();
        let path = self.dir.join(name);
        match File::create(&path) {
            Ok(file) => Some(BufWriter::new(file)),
            Err(e) => {
                debug!("log file {path:?} could not be created, dropping log lines: {e}");
                None
            }
        }
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.has_lines.notify_all();

        let worker = {
            let mut state = self.shared.state.lock().expect("logger mutex poisoned");
            state.worker.take()
        };
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}

/// Background loop: wait for lines, swap buffers, write the batch outside
/// the lock, repeat until shut down and drained.
fn writer_loop(shared: Arc<Shared>, mut sink: Option<BufWriter<File>>) {
    let mut batch: Vec<String> = Vec::with_capacity(32);

    loop {
        {
            let mut state = shared.state.lock().expect("logger mutex poisoned");
            while state.current.is_empty() && shared.running.load(Ordering::SeqCst) {
                state = shared.has_lines.wait(state).expect("logger mutex poisoned");
            }
            if state.current.is_empty() {
                // Shut down and nothing left to drain.
                break;
            }
            std::mem::swap(&mut state.current, &mut batch);
        }

        if let Some(file) = sink.as_mut() {
            for line in &batch {
                if writeln!(file, "{line}").is_err() {
                    sink = None;
                    break;
                }
            }
            if let Some(file) = sink.as_mut() {
                let _ = file.flush();
            }
        }
        batch.clear();
    }
}
