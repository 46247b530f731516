//! Record sources
//!
//! Two formats are accepted:
//! - `.json`: an array of `{ "address": "0x…", "maxTokens": "…" }` objects,
//!   where `maxTokens` may also be a JSON integer
//! - anything else: one `address,amount` pair per line (comma or whitespace
//!   separated), `#` comments and blank lines ignored, optional header line

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AllowlistError, AllowlistResult};
use crate::leaf::Record;

#[derive(Debug, Deserialize)]
struct JsonRecord {
    address: String,
    #[serde(rename = "maxTokens", alias = "amount")]
    max_tokens: serde_json::Value,
}

/// Loads records from `path` in file order.
///
/// Amounts are scaled by `10^decimals`.
pub fn load_records(path: &Path, decimals: u8) -> AllowlistResult<Vec<Record>> {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let records = if is_json {
        let content = std::fs::read_to_string(path).map_err(|e| AllowlistError::InvalidInput {
            path: path.to_path_buf(),
            line: 0,
            message: format!("failed to read input: {e}"),
        })?;
        parse_json_records(path, &content, decimals)?
    } else {
        let file = File::open(path).map_err(|e| AllowlistError::InvalidInput {
            path: path.to_path_buf(),
            line: 0,
            message: format!("failed to open input: {e}"),
        })?;
        parse_line_records(path, BufReader::new(file), decimals)?
    };

    debug!(path = %path.display(), records = records.len(), "loaded records");
    Ok(records)
}

/// Parses the JSON array form.
pub fn parse_json_records(
    path: &Path,
    content: &str,
    decimals: u8,
) -> AllowlistResult<Vec<Record>> {
    let raw: Vec<JsonRecord> =
        serde_json::from_str(content).map_err(|e| AllowlistError::InvalidInput {
            path: path.to_path_buf(),
            line: e.line(),
            message: e.to_string(),
        })?;

    raw.iter()
        .enumerate()
        .map(|(index, entry)| {
            let amount = match &entry.max_tokens {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) if n.is_u64() => n.to_string(),
                other => {
                    return Err(AllowlistError::InvalidEntitlement {
                        index,
                        value: other.to_string(),
                    })
                }
            };
            Record::parse(index, &entry.address, &amount, decimals)
        })
        .collect()
}

/// Parses the line-oriented form.
pub fn parse_line_records<R: BufRead>(
    path: &Path,
    reader: R,
    decimals: u8,
) -> AllowlistResult<Vec<Record>> {
    let mut records = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| AllowlistError::InvalidInput {
            path: path.to_path_buf(),
            line: line_num + 1,
            message: format!("failed to read line: {e}"),
        })?;
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }

        let fields: Vec<&str> = content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();

        let is_header = fields.first().is_some_and(|f| f.eq_ignore_ascii_case("address"));
        if records.is_empty() && is_header {
            continue;
        }

        let &[address, amount] = fields.as_slice() else {
            return Err(AllowlistError::InvalidInput {
                path: path.to_path_buf(),
                line: line_num + 1,
                message: format!("expected 'address,amount', got '{}'", content),
            });
        };

        records.push(Record::parse(records.len(), address, amount, decimals)?);
    }

    Ok(records)
}
