//! Renders the `--json` execution report (`spec.md` §6 "CLI surface") and,
//! behind the optional `pretty-diagnostics` feature, a source-annotated
//! rendering of a syntax error using `annotate-snippets` — the same crate
//! the teacher keeps as an optional dependency of `yash-syntax`/`yash-env`
//! for exactly this purpose. Without the feature, diagnostics fall back to
//! the plain `<program>: <context>: <message>` line `spec.md` §7 specifies.
//!
//! No JSON crate is in this workspace's dependency stack, so `to_json` hand-
//! rolls the three-field object the CLI needs rather than pulling one in
//! for a single call site.

use crate::ExecutionReport;

fn escape_json(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Serializes `report` as `{"stdout":...,"stderr":...,"exitCode":...}`.
#[must_use]
pub fn to_json(report: &ExecutionReport) -> String {
    format!(
        "{{\"stdout\":\"{}\",\"stderr\":\"{}\",\"exitCode\":{}}}",
        escape_json(&report.stdout),
        escape_json(&report.stderr),
        report.exit_status,
    )
}

/// Renders `message` with a byte-range `location` into `source` as a single
/// `<program>: <message>` line. The plain fallback used when the
/// `pretty-diagnostics` feature is off.
#[cfg(not(feature = "pretty-diagnostics"))]
#[must_use]
pub fn render_diagnostic(program: &str, _source: &str, message: &str, _location: &wsh_syntax::source::Location) -> String {
    format!("{program}: {message}\n")
}

/// Renders `message` as a source-annotated snippet using `annotate-snippets`.
#[cfg(feature = "pretty-diagnostics")]
#[must_use]
pub fn render_diagnostic(program: &str, source: &str, message: &str, location: &wsh_syntax::source::Location) -> String {
    use annotate_snippets::{Level, Renderer, Snippet};

    let title = format!("{program}: {message}");
    let snippet = Snippet::source(source).fold(true).annotation(Level::Error.span(location.range.clone()).label(message));
    let group = Level::Error.title(&title).snippet(snippet);
    Renderer::styled().render(group).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_escapes_newlines_and_quotes() {
        let report = ExecutionReport {
            stdout: "line1\nline2\"".to_string(),
            stderr: String::new(),
            exit_status: 0,
        };
        assert_eq!(to_json(&report), "{\"stdout\":\"line1\\nline2\\\"\",\"stderr\":\"\",\"exitCode\":0}");
    }

    #[test]
    fn exit_code_is_rendered_as_a_number() {
        let report = ExecutionReport { stdout: String::new(), stderr: String::new(), exit_status: 127 };
        assert!(to_json(&report).ends_with("\"exitCode\":127}"));
    }
}
