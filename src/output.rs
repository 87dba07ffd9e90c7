//! Primary output shared by every fragment.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use rhai::Dynamic;

/// Clonable handle to the primary output stream.
///
/// The evaluator's print hooks cannot return errors, so a failed write is
/// parked here and collected by the execution context after the fragment.
#[derive(Clone)]
pub struct Output {
    sink: Rc<RefCell<Box<dyn Write>>>,
    failure: Rc<RefCell<Option<io::Error>>>,
}

impl Output {
    pub fn new(sink: impl Write + 'static) -> Self {
        Self {
            sink: Rc::new(RefCell::new(Box::new(sink))),
            failure: Rc::default(),
        }
    }

    /// Buffered, locked standard output. Call `flush` before dropping it.
    pub fn stdout() -> Self {
        Self::new(io::BufWriter::new(io::stdout().lock()))
    }

    /// An in-memory output and a handle to read back what was written.
    pub fn buffer() -> (Self, Buffer) {
        let buffer = Buffer::default();
        (Self::new(buffer.clone()), buffer)
    }

    /// Write `text` followed by a newline.
    pub fn line(&self, text: &str) -> io::Result<()> {
        let mut sink = self.sink.borrow_mut();
        sink.write_all(text.as_bytes())?;
        sink.write_all(b"\n")
    }

    /// Like `line`, but remembers the error instead of returning it.
    pub(crate) fn line_or_park(&self, text: &str) {
        if let Err(e) = self.line(text) {
            self.failure.borrow_mut().get_or_insert(e);
        }
    }

    pub(crate) fn park(&self, err: io::Error) {
        self.failure.borrow_mut().get_or_insert(err);
    }

    /// Take the first parked write failure, if any.
    pub fn take_failure(&self) -> Option<io::Error> {
        self.failure.borrow_mut().take()
    }

    pub fn flush(&self) -> io::Result<()> {
        self.sink.borrow_mut().flush()
    }
}

/// Shared in-memory sink returned by `Output::buffer`.
#[derive(Clone, Default)]
pub struct Buffer(Rc<RefCell<Vec<u8>>>);

impl Buffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Render values the way `P` prints them: space separated, arrays
/// flattened, unit as the empty string.
pub fn join_printable(values: &[Dynamic]) -> String {
    let mut parts = Vec::with_capacity(values.len());
    for value in values {
        push_printable(value, &mut parts);
    }
    parts.join(" ")
}

fn push_printable(value: &Dynamic, parts: &mut Vec<String>) {
    if value.is_unit() {
        parts.push(String::new());
    } else if let Some(items) = value.read_lock::<rhai::Array>() {
        for item in items.iter() {
            push_printable(item, parts);
        }
    } else {
        parts.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lines_reach_buffer() {
        let (out, buf) = Output::buffer();
        out.line("one").unwrap();
        out.clone().line("two").unwrap();
        assert_eq!(buf.contents(), "one\ntwo\n");
    }

    #[test]
    fn failures_are_parked_once() {
        let out = Output::new(Closed);
        out.line_or_park("x");
        out.line_or_park("y");
        let err = out.take_failure().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(out.take_failure().is_none());
    }

    #[test]
    fn join_flattens_and_blanks_unit() {
        let values = vec![
            Dynamic::from(1_i64),
            Dynamic::from_array(vec![Dynamic::from("a".to_string()), Dynamic::from(2.5_f64)]),
            Dynamic::UNIT,
            Dynamic::from("z".to_string()),
        ];
        assert_eq!(join_printable(&values), "1 a 2.5  z");
    }

    #[test]
    fn join_nothing() {
        assert_eq!(join_printable(&[]), "");
    }
}
