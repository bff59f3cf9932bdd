//! Cosmetic progress spinner
//!
//! Runs on its own thread and draws to stderr only; it never touches
//! query data or control flow. Stopped (and the line cleared) either
//! explicitly or on drop.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const FRAMES: [char; 4] = ['|', '/', '-', '\\'];

pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let message = message.to_string();

        let handle = std::thread::spawn(move || {
            let mut frame = 0usize;
            while flag.load(Ordering::Relaxed) {
                eprint!("\r{} {}", FRAMES[frame % FRAMES.len()], message);
                std::io::stderr().flush().ok();
                frame += 1;
                std::thread::sleep(Duration::from_millis(80));
            }
            // Clear the spinner line before handing the terminal back.
            eprint!("\r{}\r", " ".repeat(message.len() + 2));
            std::io::stderr().flush().ok();
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn stop(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.finish();
    }
}
