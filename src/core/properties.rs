use crate::utils::error::{ProjectError, Result};
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Chars;

/// Parses `.properties` text into ordered key/value entries.
///
/// Supports `=`, `:` and whitespace separators, `#`/`!` comments, `\`
/// line continuations and `\uXXXX` escapes. A key without a separator maps to
/// an empty value and later duplicates override earlier ones.
pub fn parse_properties(bytes: &[u8]) -> Result<BTreeMap<String, String>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| ProjectError::parse(format!("properties are not valid UTF-8: {}", e)))?;

    let mut entries = BTreeMap::new();
    let mut logical = String::new();

    for raw_line in text.lines() {
        // 續行的前導空白不屬於值
        let line = raw_line.trim_start();

        if logical.is_empty() && (line.is_empty() || line.starts_with('#') || line.starts_with('!')) {
            continue;
        }

        if ends_with_continuation(line) {
            logical.push_str(&line[..line.len() - 1]);
            continue;
        }

        logical.push_str(line);
        let (key, value) = split_entry(&logical)?;
        entries.insert(key, value);
        logical.clear();
    }

    if !logical.is_empty() {
        let (key, value) = split_entry(&logical)?;
        entries.insert(key, value);
    }

    Ok(entries)
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> Result<(String, String)> {
    let mut key = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => unescape(&mut chars, &mut key)?,
            '=' | ':' => break,
            c if c.is_whitespace() => {
                while let Some(next) = chars.peek() {
                    if next.is_whitespace() {
                        chars.next();
                    } else {
                        break;
                    }
                }
                if matches!(chars.peek(), Some('=') | Some(':')) {
                    chars.next();
                }
                break;
            }
            c => key.push(c),
        }
    }

    while chars.next_if(|c| c.is_whitespace()).is_some() {}

    let mut value = String::new();
    while let Some(c) = chars.next() {
        if c == '\\' {
            unescape(&mut chars, &mut value)?;
        } else {
            value.push(c);
        }
    }

    Ok((key, value))
}

/// Decodes the escape following a consumed `\`. A trailing lone `\` is
/// dropped; unknown escapes yield the escaped character itself.
fn unescape(chars: &mut Peekable<Chars<'_>>, out: &mut String) -> Result<()> {
    match chars.next() {
        Some('t') => out.push('\t'),
        Some('n') => out.push('\n'),
        Some('r') => out.push('\r'),
        Some('f') => out.push('\u{c}'),
        Some('u') => out.push(unicode_escape(chars)?),
        Some(other) => out.push(other),
        None => {}
    }
    Ok(())
}

/// `\uXXXX`, with UTF-16 surrogate pairs written as two consecutive escapes.
fn unicode_escape(chars: &mut Peekable<Chars<'_>>) -> Result<char> {
    let unit = hex_unit(chars)?;
    let code = match unit {
        0xD800..=0xDBFF => {
            if chars.next() != Some('\\') || chars.next() != Some('u') {
                return Err(ProjectError::parse(format!(
                    "unpaired surrogate \\u{:04X} in properties",
                    unit
                )));
            }
            let low = hex_unit(chars)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(ProjectError::parse(format!(
                    "unpaired surrogate \\u{:04X} in properties",
                    unit
                )));
            }
            0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00)
        }
        _ => u32::from(unit),
    };

    char::from_u32(code).ok_or_else(|| {
        ProjectError::parse(format!("invalid unicode escape \\u{:04X} in properties", unit))
    })
}

fn hex_unit(chars: &mut Peekable<Chars<'_>>) -> Result<u16> {
    let digits: String = chars.by_ref().take(4).collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ProjectError::parse(format!(
            "malformed \\uXXXX escape '\\u{}' in properties",
            digits
        )));
    }
    u16::from_str_radix(&digits, 16)
        .map_err(|e| ProjectError::parse(format!("malformed \\uXXXX escape: {}", e)))
}
