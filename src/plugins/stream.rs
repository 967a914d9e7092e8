//! The output stream shared by console reporters.
//!
//! Clones share one sink. While buffering, writes are held back until the buffer is flushed to the sink or
//! discarded; `--failures-only` uses this to hide the output of contexts that passed.

use std::cell::RefCell;
use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

struct StreamState {
    sink: Box<dyn Write>,
    buffer: Option<Vec<u8>>,
}

#[derive(Clone)]
pub struct ReportStream {
    state: Rc<RefCell<StreamState>>,
    memory: Option<Rc<RefCell<Vec<u8>>>>,
}

impl ReportStream {
    pub fn new(sink: impl Write + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(StreamState {
                sink: Box::new(sink),
                buffer: None,
            })),
            memory: None,
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// A stream that keeps everything written to it, readable through [`ReportStream::captured`].
    pub fn in_memory() -> Self {
        let memory = Rc::new(RefCell::new(Vec::new()));
        let mut stream = Self::new(MemorySink(memory.clone()));
        stream.memory = Some(memory);
        stream
    }

    /// Everything that reached the sink of an in-memory stream (buffered output excluded).
    pub fn captured(&self) -> String {
        self.memory
            .as_ref()
            .map(|memory| String::from_utf8_lossy(&memory.borrow()).into_owned())
            .unwrap_or_default()
    }

    pub fn begin_buffering(&self) {
        self.state.borrow_mut().buffer = Some(Vec::new());
    }

    pub fn is_buffering(&self) -> bool {
        self.state.borrow().buffer.is_some()
    }

    /// Write the held-back output to the sink and stop buffering.
    pub fn flush_buffer(&self) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(buffer) = state.buffer.take() {
            state.sink.write_all(&buffer)?;
            state.sink.flush()?;
        }
        Ok(())
    }

    /// Drop the held-back output and stop buffering.
    pub fn discard_buffer(&self) {
        self.state.borrow_mut().buffer = None;
    }
}

impl Write for ReportStream {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        match &mut state.buffer {
            Some(buffer) => {
                buffer.extend_from_slice(bytes);
                Ok(bytes.len())
            }
            None => state.sink.write(bytes),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.state.borrow_mut();
        if state.buffer.is_some() {
            return Ok(());
        }
        state.sink.flush()
    }
}

impl fmt::Debug for ReportStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportStream")
            .field("buffering", &self.is_buffering())
            .field("in_memory", &self.memory.is_some())
            .finish()
    }
}

struct MemorySink(Rc<RefCell<Vec<u8>>>);

impl Write for MemorySink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
