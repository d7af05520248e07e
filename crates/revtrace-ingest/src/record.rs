//! Record splitting for delimited text files
//!
//! Fields may be wrapped in double quotes; inside quotes the delimiter is
//! literal and `""` stands for one quote character. Every field is trimmed.

/// Delimiters considered when reading a log header
pub const CANDIDATE_DELIMITERS: [char; 3] = [',', ';', '\t'];

/// Pick the delimiter occurring most often outside quotes.
///
/// Ties and headers without any candidate fall back to `,`.
pub fn detect_delimiter(header: &str) -> char {
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for c in header.chars() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            if let Some(idx) = CANDIDATE_DELIMITERS.iter().position(|d| *d == c) {
                counts[idx] += 1;
            }
        }
    }
    let mut best = 0;
    for idx in 1..counts.len() {
        if counts[idx] > counts[best] {
            best = idx;
        }
    }
    CANDIDATE_DELIMITERS[best]
}

/// Split one line into trimmed, unquoted fields. Trailing empty fields are kept.
pub fn split_record(line: &str, delimiter: char) -> Vec<String> {
    let line = line.trim_start_matches('\u{feff}');
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '"' {
            if in_quotes && chars.peek() == Some(&'"') {
                current.push('"');
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == delimiter && !in_quotes {
            fields.push(current.trim().to_string());
            current.clear();
        } else {
            current.push(c);
        }
    }
    fields.push(current.trim().to_string());
    fields
}

/// Split on the first delimiter outside quotes only, as used for
/// `name,code` pairs
pub fn split_pair(line: &str, delimiter: char) -> Option<(String, String)> {
    let mut in_quotes = false;
    let at = line.char_indices().find_map(|(idx, c)| {
        if c == '"' {
            in_quotes = !in_quotes;
        }
        (c == delimiter && !in_quotes).then_some(idx)
    })?;
    let unquote = |s: &str| s.trim().trim_matches('"').trim().to_string();
    Some((
        unquote(&line[..at]),
        unquote(&line[at + delimiter.len_utf8()..]),
    ))
}
