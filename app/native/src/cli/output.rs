//! CLI output formatting: highlighted JSON, frames and flag columns.

use colored::Colorize;

use crate::placement::geometry::Rect;

/// Prints a value as pretty, syntax-highlighted JSON.
pub fn print_highlighted_json(value: &serde_json::Value) {
    let json = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    println!("{}", highlight_json(&json));
}

/// Colors pretty-printed JSON: keys cyan, strings green, numbers yellow,
/// booleans and null magenta.
#[must_use]
pub fn highlight_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len() * 2);
    let mut chars = json.char_indices().peekable();
    let mut expecting_value = false;

    while let Some((start, ch)) = chars.next() {
        match ch {
            '"' => {
                let mut end = start + 1;
                let mut escaped = false;
                for (index, c) in chars.by_ref() {
                    end = index + c.len_utf8();
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        break;
                    }
                }
                let literal = &json[start..end];
                if expecting_value {
                    out.push_str(&literal.green().to_string());
                } else {
                    out.push_str(&literal.cyan().to_string());
                }
            }
            ':' => {
                out.push(ch);
                expecting_value = true;
            }
            ',' | '{' | '}' | '[' | ']' => {
                out.push_str(&ch.to_string().white().bold().to_string());
                // Array elements are values, object members start with a key.
                expecting_value = ch == '[' || (ch == ',' && in_array(json, start));
            }
            c if c.is_whitespace() => out.push(c),
            _ => {
                let mut end = start + ch.len_utf8();
                while let Some(&(index, c)) = chars.peek() {
                    if c == ',' || c == '}' || c == ']' || c.is_whitespace() {
                        break;
                    }
                    end = index + c.len_utf8();
                    chars.next();
                }
                let token = &json[start..end];
                if matches!(token, "true" | "false" | "null") {
                    out.push_str(&token.magenta().to_string());
                } else {
                    out.push_str(&token.yellow().to_string());
                }
            }
        }
    }
    out
}

/// Whether the byte at `position` sits directly inside an array.
fn in_array(json: &str, position: usize) -> bool {
    let mut in_string = false;
    let mut escaped = false;
    let mut stack: Vec<char> = Vec::new();
    for (index, c) in json.char_indices() {
        if index >= position {
            break;
        }
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => stack.push(c),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }
    stack.last() == Some(&'[')
}

/// `x,y widthxheight` with whole pixels.
#[must_use]
pub fn format_frame(frame: &Rect) -> String {
    format!("{:.0},{:.0} {:.0}x{:.0}", frame.x, frame.y, frame.width, frame.height)
}

/// Formats a boolean as a colored check mark.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

/// Formats a ratio in `[0, 1]` as a percentage.
#[must_use]
pub fn format_percent(ratio: f64) -> String { format!("{:.0}%", ratio * 100.0) }
