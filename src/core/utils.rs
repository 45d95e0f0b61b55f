/// Formats a byte count as a human readable size.
///
/// Missing or zero sizes render as `"Unknown size"`. Units step by 1024
/// through B, KB, MB, GB, TB and PB with one decimal place.
///
/// # Example
///
/// ```
/// use fileshelf::core::utils::format_file_size;
///
/// assert_eq!(format_file_size(Some(1536)), "1.5 KB");
/// assert_eq!(format_file_size(None), "Unknown size");
/// ```
pub fn format_file_size(size: Option<i64>) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

    let bytes = match size {
        Some(b) if b > 0 => b,
        _ => return "Unknown size".to_string(),
    };

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Escapes text for safe inclusion in HTML bodies and attribute values.
pub fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cuts `text` to at most `max_chars` characters, appending an ellipsis when shortened.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}
