//! Run driver.
//!
//! Compiles every fragment, starts the execution context, feeds it records
//! one at a time and finalizes it once the input is exhausted.

use std::io::BufRead;

use tracing::debug;

use crate::context::ExecutionContext;
use crate::error::{Error, Result};
use crate::interrupt::Progress;
use crate::options::Options;
use crate::output::Output;
use crate::reader::RecordReader;

/// What a completed run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub records: u64,
}

/// Process `input` according to `options`, writing script output to
/// `output`. `progress` tracks the current record for the interrupt handler.
///
/// Output is flushed whether or not the run succeeds, so whatever earlier
/// records printed survives a failure on a later one.
pub fn run<R: BufRead>(
    options: &Options,
    input: R,
    output: Output,
    progress: &Progress,
) -> Result<Summary> {
    let result = process(options, input, &output, progress);
    let flushed = output.flush();
    let summary = result?;
    flushed?;
    Ok(summary)
}

fn process<R: BufRead>(
    options: &Options,
    input: R,
    output: &Output,
    progress: &Progress,
) -> Result<Summary> {
    if options.verbose {
        debug!(options = %describe(options), "parsed options");
    }

    let mut ctx = ExecutionContext::new(output.clone());
    let (begin, per_record, end) = options.fragments();
    let begin = begin.map(|f| ctx.compile(&f)).transpose()?;
    let per_record = per_record
        .iter()
        .map(|f| ctx.compile(f))
        .collect::<Result<Vec<_>>>()?;
    let end = end.map(|f| ctx.compile(&f)).transpose()?;

    ctx.start(begin.as_ref())?;

    let mut reader = RecordReader::new(input, options.terminator.clone());
    for record in reader.by_ref() {
        let record = record.map_err(|e| Error::io(e).with_record(progress.current() + 1))?;
        progress.set(record.index);
        ctx.bind_record(record, &options.separator)?;

        if options.verbose {
            let registry = ctx.registry();
            debug!(record = registry.nr(), bindings = %registry.snapshot(), "record");
        }

        for fragment in &per_record {
            ctx.run(fragment)?;
        }
    }

    ctx.finish(end.as_ref())?;

    Ok(Summary {
        records: reader.index(),
    })
}

fn describe(options: &Options) -> String {
    serde_json::to_string(options).unwrap_or_else(|e| format!("<unprintable: {}>", e))
}
