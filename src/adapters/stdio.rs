//! Stdin/stdout serial adapter for the host simulator.
//!
//! A background thread blocks on stdin and pushes bytes into a shared
//! queue; the flight loop only ever looks at the queue, so
//! [`SerialPort::read_byte`] never waits.  Writes go straight to stdout.

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, warn};

use crate::link::transport::SerialPort;

/// Bytes buffered ahead of the flight loop before the reader pauses.
const QUEUE_LIMIT: usize = 4096;

pub struct StdioSerial {
    rx: Arc<Mutex<VecDeque<u8>>>,
}

impl StdioSerial {
    /// Start the stdin reader thread.
    pub fn spawn() -> io::Result<Self> {
        let rx = Arc::new(Mutex::new(VecDeque::with_capacity(QUEUE_LIMIT)));
        let queue = Arc::clone(&rx);
        thread::Builder::new()
            .name("stdin-rx".into())
            .spawn(move || read_stdin(&queue))?;
        Ok(Self { rx })
    }
}

fn read_stdin(queue: &Mutex<VecDeque<u8>>) {
    let mut stdin = io::stdin().lock();
    let mut buf = [0u8; 256];
    loop {
        match stdin.read(&mut buf) {
            Ok(0) => {
                debug!("SERIAL: stdin closed");
                return;
            }
            Ok(n) => {
                let Ok(mut q) = queue.lock() else {
                    return;
                };
                let room = QUEUE_LIMIT.saturating_sub(q.len());
                if n > room {
                    warn!("SERIAL: rx queue full, dropping {} bytes", n - room);
                }
                q.extend(&buf[..n.min(room)]);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => {
                warn!("SERIAL: stdin read failed: {e}");
                return;
            }
        }
    }
}

impl SerialPort for StdioSerial {
    type Error = io::Error;

    fn available(&self) -> usize {
        self.rx.lock().map_or(0, |q| q.len())
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.lock().ok()?.pop_front()
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        let mut out = io::stdout().lock();
        out.write_all(data)?;
        out.flush()?;
        Ok(data.len())
    }
}
