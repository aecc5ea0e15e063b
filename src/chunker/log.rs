//! Log chunker: timestamp/level-aware line streamer with format detection
//! and error-boundary preference

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::cancel::CancellationToken;
use crate::chunk::{Chunk, ChunkResult};
use crate::chunker::{matches_extension, Chunker};
use crate::error::{ChunkError, ChunkWarning};
use crate::metadata::{ChunkMetadata, LogFormat, LogLevel, LogMetadata};
use crate::options::ChunkOptions;
use crate::tokenizer::count_tokens;

const EXTENSIONS: &[&str] = &[".log"];
const FORMAT_DETECTION_WINDOW: usize = 64;

/// Streams log-line input, grouping lines into chunks by size with an
/// error-aware boundary preference: an `ERROR`/`FATAL` line closes the
/// current chunk just before itself once the buffer is past a minimum size,
/// so the error stays together with the context that follows it.
#[derive(Debug, Default)]
pub struct LogChunker;

impl LogChunker {
    pub fn new() -> Self {
        Self
    }
}

static LEVEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[?(TRACE|DEBUG|INFO|WARNING|WARN|ERROR|FATAL)\]?").unwrap()
});
static SYSLOG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w{3}\s+\d{1,2}\s+\d{2}:\d{2}:\d{2}\s+(\S+)\s+([\w.\-/]+)(?:\[\d+\])?:").unwrap());
static APACHE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^\S+ \S+ \S+ \[[^\]]+\] "\S+ \S+ \S+" \d{3}"#).unwrap());

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%d/%b/%Y:%H:%M:%S %z",
];

fn parse_level(line: &str) -> Option<LogLevel> {
    let caps = LEVEL_RE.captures(line)?;
    let token = caps.get(1)?.as_str().to_ascii_uppercase();
    match token.as_str() {
        "TRACE" | "DEBUG" => Some(LogLevel::Debug),
        "INFO" => Some(LogLevel::Info),
        "WARN" | "WARNING" => Some(LogLevel::Warn),
        "ERROR" => Some(LogLevel::Error),
        "FATAL" => Some(LogLevel::Fatal),
        _ => None,
    }
}

/// Parse a leading timestamp off `line`, ignoring whatever text follows it
/// (the level token, message, ...). Uses `parse_and_remainder` rather than
/// `parse_from_str` against a fixed-width prefix, since `parse_from_str`
/// requires the entire slice to be consumed and any real log line has text
/// after its timestamp.
fn parse_timestamp(line: &str) -> Option<DateTime<Utc>> {
    for fmt in TIMESTAMP_FORMATS {
        if let Ok((dt, _)) = DateTime::parse_and_remainder(line, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok((naive, _)) = NaiveDateTime::parse_and_remainder(line, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    None
}

fn source_app(line: &str) -> Option<String> {
    SYSLOG_RE.captures(line).map(|c| c[2].to_string())
}

fn detect_format(lines: &[&str]) -> LogFormat {
    let sample: Vec<&&str> = lines.iter().take(FORMAT_DETECTION_WINDOW).collect();
    if sample.is_empty() {
        return LogFormat::Custom;
    }
    let json_count = sample
        .iter()
        .filter(|l| serde_json::from_str::<serde_json::Value>(l).is_ok())
        .count();
    if json_count * 2 >= sample.len() {
        return LogFormat::Json;
    }
    let syslog_count = sample.iter().filter(|l| SYSLOG_RE.is_match(l)).count();
    if syslog_count * 2 >= sample.len() {
        return LogFormat::Syslog;
    }
    let apache_count = sample.iter().filter(|l| APACHE_RE.is_match(l)).count();
    if apache_count * 2 >= sample.len() {
        return LogFormat::Apache;
    }
    let structured_count = sample
        .iter()
        .filter(|l| parse_timestamp(l).is_some() && parse_level(l).is_some())
        .count();
    if structured_count * 2 >= sample.len() {
        return LogFormat::Structured;
    }
    LogFormat::Custom
}

struct PendingLine<'a> {
    text: &'a str,
    timestamp: Option<DateTime<Utc>>,
    level: Option<LogLevel>,
}

fn plurality_level(levels: &[LogLevel]) -> Option<LogLevel> {
    let mut counts: Vec<(LogLevel, usize)> = Vec::new();
    for level in levels {
        if let Some(entry) = counts.iter_mut().find(|(l, _)| l == level) {
            entry.1 += 1;
        } else {
            counts.push((*level, 1));
        }
    }
    counts.into_iter().max_by_key(|(_, count)| *count).map(|(l, _)| l)
}

impl Chunker for LogChunker {
    fn name(&self) -> &'static str {
        "log"
    }

    fn priority(&self) -> i32 {
        25
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("text/x-log") {
                return true;
            }
        }
        language_hint.is_some_and(|hint| matches_extension(hint, EXTENSIONS))
    }

    fn chunk(
        &self,
        content: &[u8],
        options: &ChunkOptions,
        cancel: &CancellationToken,
    ) -> Result<ChunkResult, ChunkError> {
        let text = String::from_utf8_lossy(content);
        let warnings: Vec<ChunkWarning> = Vec::new();
        let raw_lines: Vec<&str> = text.lines().collect();
        let log_format = detect_format(&raw_lines);
        let min_chunk_size = options.max_chunk_size / 4;

        let lines: Vec<PendingLine> = raw_lines
            .iter()
            .map(|l| PendingLine {
                text: l,
                timestamp: parse_timestamp(l),
                level: parse_level(l),
            })
            .collect();

        let mut chunks = Vec::new();
        let mut cursor = 0usize;
        let mut buf = String::new();
        let mut buf_start = 0usize;
        let mut buf_timestamps: Vec<DateTime<Utc>> = Vec::new();
        let mut buf_levels: Vec<LogLevel> = Vec::new();
        let mut buf_error_count = 0usize;
        let mut buf_source_app: Option<String> = None;

        let mut flush = |buf: &mut String,
                          buf_start: &mut usize,
                          cursor: usize,
                          buf_timestamps: &mut Vec<DateTime<Utc>>,
                          buf_levels: &mut Vec<LogLevel>,
                          buf_error_count: &mut usize,
                          buf_source_app: &mut Option<String>,
                          chunks: &mut Vec<Chunk>| {
            if buf.is_empty() {
                return;
            }
            let meta = LogMetadata {
                time_start: buf_timestamps.iter().min().copied(),
                time_end: buf_timestamps.iter().max().copied(),
                log_level: plurality_level(buf_levels),
                log_format,
                error_count: *buf_error_count,
                source_app: buf_source_app.clone(),
            };
            let token_estimate = count_tokens(buf);
            chunks.push(Chunk {
                index: 0,
                start_offset: *buf_start,
                end_offset: cursor,
                content: std::mem::take(buf),
                metadata: ChunkMetadata::log(token_estimate, meta),
            });
            *buf_start = cursor;
            buf_timestamps.clear();
            buf_levels.clear();
            *buf_error_count = 0;
            *buf_source_app = None;
        };

        for line in &lines {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            let line_len = line.text.len() + 1;
            let is_error = matches!(line.level, Some(LogLevel::Error) | Some(LogLevel::Fatal));

            if is_error && buf.len() >= min_chunk_size {
                flush(
                    &mut buf,
                    &mut buf_start,
                    cursor,
                    &mut buf_timestamps,
                    &mut buf_levels,
                    &mut buf_error_count,
                    &mut buf_source_app,
                    &mut chunks,
                );
            } else if !buf.is_empty() && buf.len() + line_len > options.max_chunk_size {
                flush(
                    &mut buf,
                    &mut buf_start,
                    cursor,
                    &mut buf_timestamps,
                    &mut buf_levels,
                    &mut buf_error_count,
                    &mut buf_source_app,
                    &mut chunks,
                );
            }

            buf.push_str(line.text);
            buf.push('\n');
            if let Some(ts) = line.timestamp {
                buf_timestamps.push(ts);
            }
            if let Some(level) = line.level {
                buf_levels.push(level);
            }
            if is_error {
                buf_error_count += 1;
            }
            if buf_source_app.is_none() {
                buf_source_app = source_app(line.text);
            }
            cursor += line_len;
        }
        flush(
            &mut buf,
            &mut buf_start,
            cursor,
            &mut buf_timestamps,
            &mut buf_levels,
            &mut buf_error_count,
            &mut buf_source_app,
            &mut chunks,
        );

        for (i, chunk) in chunks.iter_mut().enumerate() {
            chunk.index = i;
        }

        Ok(ChunkResult::new(chunks, warnings, self.name(), content.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_handle_log_extension() {
        let c = LogChunker::new();
        assert!(c.can_handle(None, Some("app.log")));
    }

    #[test]
    fn detects_level_tokens() {
        assert_eq!(parse_level("2024-01-01 ERROR something broke"), Some(LogLevel::Error));
        assert_eq!(parse_level("[WARN] disk nearly full"), Some(LogLevel::Warn));
        assert_eq!(parse_level("no level here"), None);
    }

    #[test]
    fn detects_json_format() {
        let lines = vec![r#"{"level":"info","msg":"hi"}"#, r#"{"level":"error","msg":"bye"}"#];
        assert_eq!(detect_format(&lines), LogFormat::Json);
    }

    #[test]
    fn parses_timestamp_with_trailing_text_on_the_line() {
        let ts = parse_timestamp("2024-01-01 10:00:00 INFO started up");
        assert!(ts.is_some());
        assert_eq!(ts.unwrap().to_rfc3339(), "2024-01-01T10:00:00+00:00");
    }

    #[test]
    fn detects_structured_format_from_realistic_lines() {
        let lines = vec![
            "2024-01-01 10:00:00 INFO started up",
            "2024-01-01 10:00:01 DEBUG config loaded",
            "2024-01-01 10:00:02 WARN disk nearly full",
        ];
        assert_eq!(detect_format(&lines), LogFormat::Structured);
    }

    #[test]
    fn error_line_closes_chunk_when_buffer_past_minimum() {
        let c = LogChunker::new();
        let mut options = ChunkOptions::default();
        options.max_chunk_size = 100;
        let mut text = String::new();
        for i in 0..5 {
            text.push_str(&format!("2024-01-01 00:00:0{i} INFO line {i} padding padding\n"));
        }
        text.push_str("2024-01-01 00:00:09 ERROR boom\n");
        let result = c
            .chunk(text.as_bytes(), &options, &CancellationToken::new())
            .unwrap();
        assert!(result.total_chunks >= 2);
    }

    #[test]
    fn empty_input_produces_no_chunks() {
        let c = LogChunker::new();
        let result = c
            .chunk(b"", &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 0);
    }
}
