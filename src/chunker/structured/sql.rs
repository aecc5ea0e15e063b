//! SQL chunker: one chunk per statement

use crate::cancel::CancellationToken;
use crate::chunk::{Chunk, ChunkResult};
use crate::chunker::splitter::split_oversized;
use crate::chunker::{matches_extension, Chunker};
use crate::error::{ChunkError, ChunkWarning};
use crate::metadata::{ChunkMetadata, SqlMetadata};
use crate::options::ChunkOptions;
use crate::tokenizer::count_tokens;

const EXTENSIONS: &[&str] = &[".sql"];

/// Splits SQL source into one chunk per semicolon-terminated statement,
/// respecting string literals and `--`/`/* */` comments.
#[derive(Debug, Default)]
pub struct SqlChunker;

impl SqlChunker {
    pub fn new() -> Self {
        Self
    }
}

/// Split `text` into statement spans `[start, end)`, `end` exclusive of
/// the trailing semicolon's newline but inclusive of the semicolon itself.
fn split_statements(text: &str) -> Vec<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut spans = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    let mut in_single = false;
    let mut in_double = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    while i < bytes.len() {
        let b = bytes[i];
        if in_line_comment {
            if b == b'\n' {
                in_line_comment = false;
            }
            i += 1;
            continue;
        }
        if in_block_comment {
            if b == b'*' && i + 1 < bytes.len() && bytes[i + 1] == b'/' {
                in_block_comment = false;
                i += 2;
                continue;
            }
            i += 1;
            continue;
        }
        if in_single {
            if b == b'\'' {
                in_single = false;
            }
            i += 1;
            continue;
        }
        if in_double {
            if b == b'"' {
                in_double = false;
            }
            i += 1;
            continue;
        }
        match b {
            b'\'' => in_single = true,
            b'"' => in_double = true,
            b'-' if i + 1 < bytes.len() && bytes[i + 1] == b'-' => in_line_comment = true,
            b'/' if i + 1 < bytes.len() && bytes[i + 1] == b'*' => in_block_comment = true,
            b';' => {
                spans.push((start, i + 1));
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if text[start..].trim().len() > 0 {
        spans.push((start, text.len()));
    }
    spans
}

fn classify(statement: &str) -> SqlMetadata {
    let upper = statement.trim_start().to_uppercase();
    let (statement_type, object_type) = if upper.starts_with("CREATE TABLE") {
        ("CREATE_TABLE", Some("TABLE"))
    } else if upper.starts_with("CREATE VIEW") {
        ("CREATE_VIEW", Some("VIEW"))
    } else if upper.starts_with("CREATE INDEX") || upper.starts_with("CREATE UNIQUE INDEX") {
        ("CREATE_INDEX", Some("INDEX"))
    } else if upper.starts_with("CREATE PROCEDURE") || upper.starts_with("CREATE OR REPLACE PROCEDURE") {
        ("CREATE_PROCEDURE", Some("PROCEDURE"))
    } else if upper.starts_with("CREATE FUNCTION") || upper.starts_with("CREATE OR REPLACE FUNCTION") {
        ("CREATE_FUNCTION", Some("FUNCTION"))
    } else if upper.starts_with("ALTER TABLE") {
        ("ALTER_TABLE", Some("TABLE"))
    } else if upper.starts_with("DROP TABLE") {
        ("DROP_TABLE", Some("TABLE"))
    } else if upper.starts_with("INSERT") {
        ("INSERT", None)
    } else if upper.starts_with("UPDATE") {
        ("UPDATE", None)
    } else if upper.starts_with("DELETE") {
        ("DELETE", None)
    } else if upper.starts_with("SELECT") {
        ("SELECT", None)
    } else {
        ("UNKNOWN", None)
    };

    let table_name = extract_identifier(&upper, statement, &["TABLE", "INTO", "UPDATE", "FROM"]);
    let procedure_name = if statement_type == "CREATE_PROCEDURE" || statement_type == "CREATE_FUNCTION" {
        extract_identifier(&upper, statement, &["PROCEDURE", "FUNCTION"])
    } else {
        None
    };

    let dialect = if upper.contains("AUTO_INCREMENT") {
        Some("mysql".to_string())
    } else if upper.contains("SERIAL") || upper.contains("RETURNING") {
        Some("postgres".to_string())
    } else if upper.contains("IDENTITY(") || upper.contains("NVARCHAR") {
        Some("tsql".to_string())
    } else {
        Some("ansi".to_string())
    };

    SqlMetadata {
        statement_type: statement_type.to_string(),
        object_type: object_type.map(String::from),
        table_name,
        procedure_name,
        dialect,
    }
}

fn extract_identifier(upper: &str, original: &str, after_keywords: &[&str]) -> Option<String> {
    for kw in after_keywords {
        if let Some(pos) = upper.find(kw) {
            let after = &original[pos + kw.len()..];
            let after = after.trim_start();
            let after = after.trim_start_matches("OR REPLACE").trim_start_matches("IF NOT EXISTS").trim_start();
            let end = after
                .find(|c: char| c.is_whitespace() || c == '(' || c == ';')
                .unwrap_or(after.len());
            let ident = after[..end].trim_matches(['`', '"', '[', ']']);
            if !ident.is_empty() {
                return Some(ident.to_string());
            }
        }
    }
    None
}

impl Chunker for SqlChunker {
    fn name(&self) -> &'static str {
        "sql"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn can_handle(&self, mime: Option<&str>, language_hint: Option<&str>) -> bool {
        if let Some(mime) = mime {
            if mime.eq_ignore_ascii_case("application/sql") || mime.eq_ignore_ascii_case("text/x-sql") {
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
        let mut warnings: Vec<ChunkWarning> = Vec::new();
        let mut chunks = Vec::new();

        for (start, end) in split_statements(&text) {
            if cancel.is_cancelled() {
                return Err(ChunkError::Cancelled);
            }
            let statement = text[start..end].trim();
            if statement.is_empty() {
                continue;
            }
            let meta = classify(statement);
            let pieces = split_oversized(statement, options.max_chunk_size, options.overlap, start, &mut warnings);
            for piece in pieces {
                let token_estimate = count_tokens(&piece.content);
                chunks.push(Chunk {
                    index: 0,
                    start_offset: piece.start_in_unit,
                    end_offset: piece.end_in_unit,
                    content: piece.content,
                    metadata: ChunkMetadata::sql(token_estimate, meta.clone()),
                });
            }
        }

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
    fn can_handle_sql_extension() {
        let c = SqlChunker::new();
        assert!(c.can_handle(None, Some("migration.sql")));
    }

    #[test]
    fn one_chunk_per_statement() {
        let c = SqlChunker::new();
        let text = "CREATE TABLE users (id INT);\nINSERT INTO users VALUES (1);\n";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 2);
    }

    #[test]
    fn semicolon_inside_string_literal_does_not_split() {
        let c = SqlChunker::new();
        let text = "INSERT INTO notes (body) VALUES ('a; b');";
        let result = c
            .chunk(text.as_bytes(), &ChunkOptions::default(), &CancellationToken::new())
            .unwrap();
        assert_eq!(result.total_chunks, 1);
    }

    #[test]
    fn classifies_create_table() {
        let meta = classify("CREATE TABLE users (id INT);");
        assert_eq!(meta.statement_type, "CREATE_TABLE");
        assert_eq!(meta.table_name.as_deref(), Some("users"));
    }
}
