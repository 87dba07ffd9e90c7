//! Record reader.
//!
//! Pulls records lazily from a `BufRead`, one at a time, and numbers them
//! from 1. Only the current record is held in memory.

use std::io::{self, BufRead};

use serde::Serialize;

/// How records are delimited in the input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminator {
    /// `\n`, also stripping a `\r` before it.
    #[default]
    Newline,
    /// Records separated by one or more blank lines.
    Paragraph,
    /// An arbitrary, possibly multi-byte, terminator string.
    Literal(String),
}

impl Terminator {
    /// Build a terminator from an optional command line value.
    ///
    /// The empty string selects paragraph mode.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None | Some("\n") => Terminator::Newline,
            Some("") => Terminator::Paragraph,
            Some(s) => Terminator::Literal(s.to_string()),
        }
    }
}

/// One input record with its terminator removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// 1-based position of the record in the input.
    pub index: u64,
    pub text: String,
}

/// Lazy iterator over the records of an input.
pub struct RecordReader<R> {
    input: R,
    terminator: Terminator,
    index: u64,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(input: R, terminator: Terminator) -> Self {
        let terminator = match terminator {
            Terminator::Literal(s) => Terminator::from_arg(Some(&s)),
            other => other,
        };
        Self {
            input,
            terminator,
            index: 0,
            buf: Vec::new(),
            done: false,
        }
    }

    /// Number of records yielded so far.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Read the raw bytes of the next record into `buf`.
    ///
    /// Returns `false` once the input is exhausted and nothing was read.
    fn fill(&mut self) -> io::Result<bool> {
        self.buf.clear();
        match &self.terminator {
            Terminator::Newline => {
                if self.input.read_until(b'\n', &mut self.buf)? == 0 {
                    return Ok(false);
                }
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Ok(true)
            }
            Terminator::Literal(term) => {
                let term = term.as_bytes();
                let last = term[term.len() - 1];
                loop {
                    if self.input.read_until(last, &mut self.buf)? == 0 {
                        return Ok(!self.buf.is_empty());
                    }
                    if self.buf.ends_with(term) {
                        self.buf.truncate(self.buf.len() - term.len());
                        return Ok(true);
                    }
                }
            }
            Terminator::Paragraph => {
                let mut line = Vec::new();
                loop {
                    line.clear();
                    if self.input.read_until(b'\n', &mut line)? == 0 {
                        break;
                    }
                    let blank = line == b"\n" || line == b"\r\n";
                    if blank {
                        if self.buf.is_empty() {
                            continue;
                        }
                        break;
                    }
                    self.buf.extend_from_slice(&line);
                }
                while self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Ok(!self.buf.is_empty())
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.fill() {
            Ok(true) => {
                self.index += 1;
                Some(Ok(Record {
                    index: self.index,
                    text: String::from_utf8_lossy(&self.buf).into_owned(),
                }))
            }
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(input: &str, terminator: Terminator) -> Vec<String> {
        RecordReader::new(input.as_bytes(), terminator)
            .map(|r| r.unwrap().text)
            .collect()
    }

    #[test]
    fn newline_records() {
        assert_eq!(records("a\nb\nc\n", Terminator::Newline), vec!["a", "b", "c"]);
    }

    #[test]
    fn final_record_without_terminator() {
        assert_eq!(records("a\nb", Terminator::Newline), vec!["a", "b"]);
    }

    #[test]
    fn crlf_is_stripped() {
        assert_eq!(records("a\r\nb\r\n", Terminator::Newline), vec!["a", "b"]);
    }

    #[test]
    fn empty_lines_are_records() {
        assert_eq!(records("a\n\nb\n", Terminator::Newline), vec!["a", "", "b"]);
    }

    #[test]
    fn empty_input_has_no_records() {
        assert!(records("", Terminator::Newline).is_empty());
        assert!(records("", Terminator::Paragraph).is_empty());
        assert!(records("", Terminator::Literal(";".into())).is_empty());
    }

    #[test]
    fn literal_terminator() {
        let t = Terminator::Literal(";".into());
        assert_eq!(records("a;b;;c", t), vec!["a", "b", "", "c"]);
    }

    #[test]
    fn multi_byte_terminator() {
        let t = Terminator::Literal("<>".into());
        assert_eq!(records("a>b<>c<d<>", t), vec!["a>b", "c<d"]);
    }

    #[test]
    fn multi_byte_terminator_with_repeated_last_byte() {
        let t = Terminator::Literal("ab".into());
        assert_eq!(records("xbyabz", t), vec!["xby", "z"]);
    }

    #[test]
    fn paragraph_mode() {
        let input = "\n\nfirst line\nsecond line\n\n\n\nnext\n";
        assert_eq!(
            records(input, Terminator::Paragraph),
            vec!["first line\nsecond line", "next"]
        );
    }

    #[test]
    fn indexes_start_at_one() {
        let mut reader = RecordReader::new("x\ny\n".as_bytes(), Terminator::Newline);
        assert_eq!(reader.index(), 0);
        let first = reader.next().unwrap().unwrap();
        assert_eq!(first.index, 1);
        let second = reader.next().unwrap().unwrap();
        assert_eq!(second.index, 2);
        assert!(reader.next().is_none());
        assert_eq!(reader.index(), 2);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let input: &[u8] = b"ok\n\xff\xfe\n";
        let got: Vec<String> = RecordReader::new(input, Terminator::Newline)
            .map(|r| r.unwrap().text)
            .collect();
        assert_eq!(got, vec!["ok".to_string(), "\u{fffd}\u{fffd}".to_string()]);
    }

    #[test]
    fn terminator_from_arg() {
        assert_eq!(Terminator::from_arg(None), Terminator::Newline);
        assert_eq!(Terminator::from_arg(Some("\n")), Terminator::Newline);
        assert_eq!(Terminator::from_arg(Some("")), Terminator::Paragraph);
        assert_eq!(
            Terminator::from_arg(Some("\0")),
            Terminator::Literal("\0".into())
        );
    }

    struct Broken;

    impl io::Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device gone"))
        }
    }

    #[test]
    fn io_error_is_yielded_once() {
        let mut reader = RecordReader::new(io::BufReader::new(Broken), Terminator::Newline);
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }
}
