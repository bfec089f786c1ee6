// src/oracle/parse.rs

//! Lenient extraction of a JSON object from model output.
//!
//! Models wrap JSON in markdown fences, prepend prose, or emit
//! `<think>...</think>` reasoning blocks. We strip those and take the first
//! balanced top-level object.

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;

/// Parse the first JSON object found in `text` into `T`.
pub fn parse_response<T: DeserializeOwned>(text: &str) -> Result<T> {
    let cleaned = strip_think_blocks(text);
    let json = extract_json_object(&cleaned)
        .ok_or_else(|| anyhow!("no JSON object found in oracle response"))?;
    serde_json::from_str(json).context("decoding oracle response")
}

fn strip_think_blocks(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("<think>") {
        out.push_str(&rest[..start]);
        match rest[start..].find("</think>") {
            Some(end) => rest = &rest[start + end + "</think>".len()..],
            None => {
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Return the first balanced `{...}` in `text`, honouring string literals.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
