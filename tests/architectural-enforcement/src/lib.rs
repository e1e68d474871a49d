//! Architectural Enforcement
//!
//! Source-tree scanner used by the integration tests in `tests/`. It walks
//! the production sources of the workspace and reports lines that break the
//! async-only rules of the chat core:
//! - No thread sleeps (pacing uses `tokio::time::sleep`)
//! - No blocking stdin or blocking HTTP in library code
//!
//! Everything from the first `#[cfg(test)]` line of a file onward is treated
//! as test code and skipped, as are comments.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// A forbidden pattern
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    /// Short name shown in reports
    pub name: &'static str,
    /// Substring that must not appear in production code
    pub pattern: &'static str,
}

/// One offending line
#[derive(Clone, Debug)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
    /// Rule that matched
    pub rule: &'static str,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} - {}: {}",
            self.path.display(),
            self.line,
            self.rule,
            self.text
        )
    }
}

/// Result of scanning a directory
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Number of `.rs` files read
    pub files_scanned: usize,
    /// Every offending line
    pub violations: Vec<Violation>,
}

/// Root of the workspace this crate lives in
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Production lines of a source file, with their 1-based numbers
///
/// Stops at the first `#[cfg(test)]` and strips `//` comments.
pub fn production_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .map(|(idx, line)| (idx + 1, line.split("//").next().unwrap_or(line)))
}

/// Scan every `.rs` file under `dir` against `rules`
#[must_use]
pub fn scan(dir: &Path, rules: &[Rule]) -> ScanReport {
    let mut report = ScanReport::default();

    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
    {
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };
        report.files_scanned += 1;

        for (line_number, code) in production_lines(&content) {
            for rule in rules {
                if code.contains(rule.pattern) {
                    report.violations.push(Violation {
                        path: entry.path().to_path_buf(),
                        line: line_number,
                        text: code.trim().to_string(),
                        rule: rule.name,
                    });
                }
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_tests() {
        let src = "fn a() {}\n// std::thread::sleep\nlet x = 1; // trailing\n#[cfg(test)]\nmod tests {}\n";
        let lines: Vec<_> = production_lines(src).collect();
        assert_eq!(lines, vec![(1, "fn a() {}"), (2, ""), (3, "let x = 1; ")]);
    }
}
