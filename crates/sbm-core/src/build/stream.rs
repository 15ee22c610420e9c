//! Line streaming from a child process.
//!
//! One reader thread per pipe feeds a bounded channel; the caller drains it on
//! its own thread, so output is delivered as it arrives and stdout/stderr
//! interleave in arrival order.

use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread::JoinHandle;

use serde::Serialize;

/// Lines buffered between the readers and the consumer.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}

pub struct LineStream {
    rx: Receiver<OutputLine>,
    readers: Vec<JoinHandle<()>>,
}

impl LineStream {
    pub fn new() -> (Self, LineSink) {
        let (tx, rx) = sync_channel(CHANNEL_CAPACITY);
        (
            Self {
                rx,
                readers: Vec::new(),
            },
            LineSink { tx },
        )
    }

    pub fn attach<R: Read + Send + 'static>(
        &mut self,
        sink: &LineSink,
        stream: OutputStream,
        reader: R,
    ) {
        let tx = sink.tx.clone();
        let handle = std::thread::spawn(move || pump_lines(reader, stream, tx));
        self.readers.push(handle);
    }

    /// Deliver lines until every attached reader reached end of file.
    ///
    /// The sink passed to [`LineStream::new`] must be dropped first, or this
    /// never returns.
    pub fn drain(self, on_line: &mut dyn FnMut(&OutputLine)) {
        for line in self.rx.iter() {
            on_line(&line);
        }
        for handle in self.readers {
            let _ = handle.join();
        }
    }
}

/// Sending half kept by the caller until all readers are attached.
pub struct LineSink {
    tx: SyncSender<OutputLine>,
}

fn pump_lines<R: Read>(reader: R, stream: OutputStream, tx: SyncSender<OutputLine>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buf)
                    .trim_end_matches(['\n', '\r'])
                    .to_string();
                if tx.send(OutputLine { stream, text }).is_err() {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_all_lines_from_both_streams() {
        let (mut stream, sink) = LineStream::new();
        stream.attach(&sink, OutputStream::Stdout, &b"one\ntwo\r\nthree"[..]);
        stream.attach(&sink, OutputStream::Stderr, &b"oops\n"[..]);
        drop(sink);

        let mut seen = Vec::new();
        stream.drain(&mut |line| seen.push((line.stream, line.text.clone())));

        let stdout: Vec<_> = seen
            .iter()
            .filter(|(s, _)| *s == OutputStream::Stdout)
            .map(|(_, t)| t.as_str())
            .collect();
        assert_eq!(stdout, vec!["one", "two", "three"]);
        assert!(seen.contains(&(OutputStream::Stderr, "oops".to_string())));
    }
}
