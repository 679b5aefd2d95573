// src/cli/output.rs

//! Output formatting for the query tools

use serde::Serialize;
use std::process::ExitCode;

/// Output helper switching between human-readable text and JSON
#[derive(Debug, Clone, Copy)]
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Prints structured data as pretty JSON
    pub fn data<T: Serialize + ?Sized>(&self, data: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(data)?);
        Ok(())
    }

    /// Reports a "not found" condition and returns the matching exit code
    pub fn not_found(&self, message: &str) -> ExitCode {
        if self.json {
            println!(
                "{}",
                serde_json::json!({
                    "found": false,
                    "message": message
                })
            );
        } else {
            println!("{}", message);
        }
        ExitCode::FAILURE
    }

    /// Reports package entries skipped because they could not be read
    ///
    /// JSON output already carries the count, so only text mode prints it.
    pub fn read_errors(&self, count: usize) {
        if let Some(line) = read_errors_line(count)
            && !self.json
        {
            println!("{}", line);
        }
    }
}

fn read_errors_line(count: usize) -> Option<String> {
    (count > 0).then(|| format!("({} package file(s) could not be read)", count))
}

/// Format a count with thousands separators (`12345` -> `12,345`)
pub fn group_digits(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0), "0");
        assert_eq!(group_digits(999), "999");
        assert_eq!(group_digits(1000), "1,000");
        assert_eq!(group_digits(12345), "12,345");
        assert_eq!(group_digits(1234567), "1,234,567");
    }

    #[test]
    fn test_read_errors_line() {
        assert_eq!(read_errors_line(0), None);
        assert_eq!(
            read_errors_line(3).as_deref(),
            Some("(3 package file(s) could not be read)")
        );
    }

    #[test]
    fn test_not_found_exit_code() {
        assert_eq!(Output::new(false).not_found("missing"), ExitCode::FAILURE);
    }
}
