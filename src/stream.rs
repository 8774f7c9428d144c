//! Streaming ingest loop: pull-based line-by-line conversion with throughput
//! reporting and fail-fast diagnostics.
//!
//! [`RecordStream`] is the lazy sequence handed to the sink. Production
//! suspends at the read-next-line boundary, so the sink drives consumption
//! cadence and can batch without any buffering here. The stream owns the
//! progress counters and timers; a conversion failure emits the diagnostic
//! block to stderr and terminates the sequence — bad lines are never skipped.

use std::{
    io::{BufRead, Write},
    time::{Duration, Instant},
};

use anyhow::Result;
use log::info;

use crate::{
    cli::StreamArgs,
    data::Record,
    io_utils, rows,
    schema::Schema,
    sink::{CsvSink, RecordSink},
};

const PROGRESS_EVERY_ROWS: u64 = 1000;
const PROGRESS_MIN_INTERVAL_SECS: f64 = 1.0;

pub fn execute(args: &StreamArgs) -> Result<()> {
    let schema = Schema::load(&args.schema)?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    info!(
        "Streaming into '{}' ({} column(s), delimiter '{}', batch size {})",
        schema.table,
        schema.columns.len(),
        crate::printable_delimiter(schema.delimiter),
        args.batch_size
    );
    let reader = io_utils::open_line_reader(&args.input, encoding)?;
    let mut sink = CsvSink::create(&args.output, args.batch_size)?;
    let mut stream = RecordStream::new(reader, &schema, &args.prefix, args.total_rows);
    let written = sink.load(&mut stream)?;
    info!("Sink committed {} record(s)", format_count(written));
    Ok(())
}

pub struct RecordStream<'a> {
    lines: std::io::Lines<Box<dyn BufRead>>,
    schema: &'a Schema,
    prefix: &'a str,
    total_rows: Option<i64>,
    started: Instant,
    last_report: Instant,
    last_count: u64,
    count: u64,
    finished: bool,
}

impl<'a> RecordStream<'a> {
    pub fn new(
        reader: Box<dyn BufRead>,
        schema: &'a Schema,
        prefix: &'a str,
        total_rows: Option<i64>,
    ) -> Self {
        let now = Instant::now();
        RecordStream {
            lines: reader.lines(),
            schema,
            prefix,
            total_rows,
            started: now,
            last_report: now,
            last_count: 0,
            count: 0,
            finished: false,
        }
    }

    fn maybe_report(&mut self) {
        let window = self.last_report.elapsed().as_secs_f64();
        if window < PROGRESS_MIN_INTERVAL_SECS {
            return;
        }
        println!("{}", self.progress_line(window));
        let _ = std::io::stdout().flush();
        self.last_count = self.count;
        self.last_report = Instant::now();
    }

    fn progress_line(&self, window: f64) -> String {
        let speed = (self.count - self.last_count) as f64 / window;
        let mut line = format!(
            "[{}] [{}] sent: {} rows; speed: {} rps",
            self.schema.table,
            self.prefix,
            format_count(self.count),
            format_count(speed as u64)
        );
        if let Some(total) = self.total_rows.filter(|t| *t > 0) {
            let elapsed = self.started.elapsed().as_secs_f64();
            let average = self.count as f64 / elapsed;
            let remain = (total as f64 - self.count as f64) / average;
            let percent = 100 * self.count as i64 / total;
            line.push_str(&format!(
                "; progress: {percent}%; remain: {}",
                format_remaining(remain)
            ));
        }
        line
    }

    fn print_summary(&self) {
        println!("{}", self.summary_line());
        let _ = std::io::stdout().flush();
    }

    fn summary_line(&self) -> String {
        let elapsed = self.started.elapsed();
        let seconds = elapsed.as_secs_f64();
        let average = if seconds > 0.0 {
            self.count as f64 / seconds
        } else {
            0.0
        };
        format!(
            "[{}] [{}] sent: {} rows; time: {}; speed: {} rps",
            self.schema.table,
            self.prefix,
            format_count(self.count),
            format_elapsed(elapsed),
            format_count(average as u64)
        )
    }

    fn print_diagnostic(&self, line: &str) {
        eprintln!("bulkstream format error");
        eprintln!("table: {}", self.schema.table);
        eprintln!("error on line:");
        eprintln!("{}", line.replace('\t', "\\t"));
        let _ = std::io::stderr().flush();
    }
}

impl Iterator for RecordStream<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let line = match self.lines.next() {
            Some(Ok(line)) => line,
            Some(Err(err)) => {
                self.finished = true;
                return Some(Err(
                    anyhow::Error::from(err).context("Reading next input line")
                ));
            }
            None => {
                self.finished = true;
                self.print_summary();
                return None;
            }
        };
        match rows::build_record(&line, self.schema) {
            Ok(record) => {
                self.count += 1;
                if self.count % PROGRESS_EVERY_ROWS == 0 {
                    self.maybe_report();
                }
                Some(Ok(record))
            }
            Err(err) => {
                self.finished = true;
                self.print_diagnostic(&line);
                Some(Err(
                    err.context(format!("Converting input line {}", self.count + 1))
                ))
            }
        }
    }
}

/// Groups digits in threes, the way the progress lines expect counts.
pub(crate) fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Buckets a remaining-time estimate into seconds, minutes, or hours;
/// non-positive or non-finite estimates render as `?`.
fn format_remaining(remain_secs: f64) -> String {
    if remain_secs <= 0.0 || !remain_secs.is_finite() {
        return "?".to_string();
    }
    if remain_secs <= 60.0 {
        format!("{remain_secs:.1} sec")
    } else if remain_secs <= 3600.0 {
        format!("{:.1} min", remain_secs / 60.0)
    } else {
        format!("{:.1} hrs", remain_secs / 3600.0)
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!(
        "{}:{:02}:{:02}.{:03}",
        total / 3600,
        total % 3600 / 60,
        total % 60,
        elapsed.subsec_millis()
    )
}
