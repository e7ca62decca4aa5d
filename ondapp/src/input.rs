//! Keyboard binding
//!
//! A blocking reader thread forwards crossterm key presses into the app's
//! event loop. The binding is attached when the app starts and detached on
//! quit: the thread polls with a timeout and checks a stop flag, so
//! teardown never leaks a reader blocked on stdin.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Running keyboard listener. Dropping it (or calling [`detach`]) stops the
/// reader thread.
///
/// [`detach`]: KeyboardBinding::detach
pub struct KeyboardBinding {
    stop: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl KeyboardBinding {
    /// Starts forwarding key presses to `tx`.
    pub fn attach(tx: UnboundedSender<KeyEvent>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = stop.clone();
        let thread = thread::Builder::new()
            .name("ondes-keys".into())
            .spawn(move || {
                while !stop_flag.load(Ordering::Relaxed) {
                    match event::poll(POLL_INTERVAL) {
                        Ok(true) => match event::read() {
                            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                                if tx.send(key).is_err() {
                                    break;
                                }
                            }
                            Ok(_) => {}
                            Err(e) => {
                                debug!("Keyboard read failed: {e}");
                                break;
                            }
                        },
                        Ok(false) => {}
                        Err(e) => {
                            debug!("Keyboard poll failed: {e}");
                            break;
                        }
                    }
                }
            })
            .expect("could not spawn keyboard thread");
        Self {
            stop,
            thread: Some(thread),
        }
    }

    /// Stops the reader thread and waits for it.
    pub fn detach(mut self) {
        self.stop_inner();
    }

    fn stop_inner(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for KeyboardBinding {
    fn drop(&mut self) {
        self.stop_inner();
    }
}
