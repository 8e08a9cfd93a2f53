//! Spinner line on stderr while tool calls are pending.
//!
//! The ticker thread only reads the label the host published after its last event. All drawing
//! goes through one mutex so the host can erase the line before writing output.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tape_stream::truncate_to_width;

use crate::host::ProgressSink;

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK: Duration = Duration::from_millis(80);
const LABEL_WIDTH: usize = 72;

const ERASE_LINE: &str = "\r\x1b[2K";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

struct DrawState<W> {
    writer: W,
    label: Option<String>,
    frame: usize,
    visible: bool,
    color: bool,
}

impl<W: Write> DrawState<W> {
    fn draw(&mut self) {
        let Some(label) = self.label.as_deref() else {
            return;
        };
        let glyph = SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()];
        let label = truncate_to_width(label, LABEL_WIDTH, "…");
        let line = if self.color {
            format!("\x1b[36m{glyph}\x1b[39m \x1b[2m{label}\x1b[22m")
        } else {
            format!("{glyph} {label}")
        };
        let cursor = if self.visible { "" } else { HIDE_CURSOR };
        let _ = write!(self.writer, "{cursor}{ERASE_LINE}{line}");
        let _ = self.writer.flush();
        self.visible = true;
    }

    fn erase(&mut self) {
        if !self.visible {
            return;
        }
        let _ = write!(self.writer, "{ERASE_LINE}{SHOW_CURSOR}");
        let _ = self.writer.flush();
        self.visible = false;
    }
}

struct Shared<W> {
    state: Mutex<DrawState<W>>,
    stop: AtomicBool,
}

impl<W> Shared<W> {
    fn lock(&self) -> MutexGuard<'_, DrawState<W>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct Spinner<W: Write + Send + 'static> {
    shared: Arc<Shared<W>>,
    thread: Option<JoinHandle<()>>,
}

impl Spinner<io::Stderr> {
    pub fn stderr(color: bool) -> Self {
        Self::with_writer(io::stderr(), color, TICK)
    }
}

impl<W: Write + Send + 'static> Spinner<W> {
    pub fn with_writer(writer: W, color: bool, tick: Duration) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(DrawState {
                writer,
                label: None,
                frame: 0,
                visible: false,
                color,
            }),
            stop: AtomicBool::new(false),
        });

        let ticker = Arc::clone(&shared);
        let thread = thread::spawn(move || {
            while !ticker.stop.load(Ordering::SeqCst) {
                thread::sleep(tick);
                let mut state = ticker.lock();
                if state.label.is_some() {
                    state.frame = state.frame.wrapping_add(1);
                    state.draw();
                }
            }
        });

        Self {
            shared,
            thread: Some(thread),
        }
    }

    pub fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        let mut state = self.shared.lock();
        state.label = None;
        state.erase();
    }
}

impl<W: Write + Send + 'static> ProgressSink for Spinner<W> {
    fn update(&mut self, label: Option<String>) {
        let mut state = self.shared.lock();
        state.label = label;
        if state.label.is_some() {
            state.draw();
        } else {
            state.erase();
        }
    }

    fn clear(&mut self) {
        let mut state = self.shared.lock();
        state.label = None;
        state.erase();
    }
}

impl<W: Write + Send + 'static> Drop for Spinner<W> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Best-effort terminal restore for signal cleanup.
pub fn restore_terminal() {
    let mut stderr = io::stderr();
    let _ = write!(stderr, "{ERASE_LINE}{SHOW_CURSOR}");
    let _ = stderr.flush();
}
