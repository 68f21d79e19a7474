// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal formatter for diagnostics.
//!
//! ```text
//! error[E0300]: mismatched types: expected `Float`, found `Integer`
//!   --> shader.pgsl:1:18
//!    |
//!  1 | const a: Float = 10;
//!    |                  ^^ expected `Float`, found `Integer`
//!    |
//!    = note: PGSL has no implicit conversions; use `new` to convert
//! ```

use std::collections::BTreeMap;

use colored::Colorize;

use pgsl_ast::LineMap;

use crate::{Diagnostic, Help, LabelStyle, Severity};

/// Formats diagnostics for terminal output.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

/// A source line with its labels.
struct AnnotatedLine {
    line_num: usize,
    text: String,
    annotations: Vec<Annotation>,
}

struct Annotation {
    col_start: usize,
    col_end: usize,
    style: LabelStyle,
    message: Option<String>,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            file_name: None,
            line_map: LineMap::new(source),
        }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    /// Format several diagnostics, separated by blank lines.
    pub fn format_all(&self, diagnostics: &[Diagnostic]) -> String {
        diagnostics
            .iter()
            .map(|d| self.format(d))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        let annotated = self.collect_annotated_lines(diagnostic);
        let (first_label, first_line) = match (diagnostic.labels.first(), annotated.first()) {
            (Some(label), Some(line)) => (label, line),
            _ => {
                self.format_footer(&mut out, diagnostic);
                return out;
            }
        };

        let file = self.file_name.unwrap_or("<source>");
        let (_, col) = self.offset_to_line_col(first_label.span.start);
        out.push_str(&format!(
            "  {} {}:{}:{}\n",
            "-->".blue(),
            file,
            first_line.line_num,
            col
        ));

        let max_line = annotated.last().map(|a| a.line_num).unwrap_or(1);
        let gutter_width = max_line.to_string().len().max(2);

        out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));

        let mut prev_line_num: Option<usize> = None;
        for annotated_line in &annotated {
            if let Some(prev) = prev_line_num {
                if annotated_line.line_num > prev + 1 {
                    out.push_str(&format!("{} {}\n", " ".repeat(gutter_width), "...".blue()));
                }
            }

            out.push_str(&format!(
                "{:>width$} {} {}\n",
                annotated_line.line_num.to_string().blue().bold(),
                "|".blue(),
                annotated_line.text,
                width = gutter_width + 1,
            ));
            self.format_annotations(&mut out, annotated_line, gutter_width);
            prev_line_num = Some(annotated_line.line_num);
        }

        if !diagnostic.notes.is_empty() || diagnostic.help.is_some() {
            out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
        }
        self.format_footer(&mut out, diagnostic);
        out
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Note => "note".blue().bold(),
        };

        match &diagnostic.code {
            Some(code) => out.push_str(&format!(
                "{}[{}]: {}\n",
                severity,
                code.0.clone().red().bold(),
                diagnostic.message.bold()
            )),
            None => out.push_str(&format!("{}: {}\n", severity, diagnostic.message.bold())),
        }
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic) {
        let gutter_width = 2;
        for note in &diagnostic.notes {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                " ".repeat(gutter_width + 1),
                "=".cyan(),
                "note".cyan().bold(),
                note
            ));
        }
        if let Some(help) = &diagnostic.help {
            self.format_help(out, help, gutter_width);
        }
    }

    fn format_help(&self, out: &mut String, help: &Help, gutter_width: usize) {
        out.push_str(&format!(
            "{} {} {}: {}\n",
            " ".repeat(gutter_width + 1),
            "=".cyan(),
            "help".cyan().bold(),
            help.message
        ));

        let Some(suggestion) = &help.suggestion else {
            return;
        };
        let (line, col) = self.offset_to_line_col(suggestion.span.start);
        let Some(source_line) = self.get_line(line) else {
            return;
        };

        let prefix_end = (col - 1).min(source_line.len());
        let span_len = suggestion.span.end.saturating_sub(suggestion.span.start);
        let suffix_start = (prefix_end + span_len).min(source_line.len());

        out.push_str(&format!("{} {}\n", " ".repeat(gutter_width + 1), "|".blue()));
        out.push_str(&format!(
            "{:>width$} {} {}{}{}\n",
            line.to_string().blue().bold(),
            "|".blue(),
            &source_line[..prefix_end],
            suggestion.replacement.green(),
            &source_line[suffix_start..],
            width = gutter_width + 1,
        ));
        out.push_str(&format!(
            "{} {} {}{}\n",
            " ".repeat(gutter_width + 1),
            "|".blue(),
            " ".repeat(prefix_end),
            "~".repeat(suggestion.replacement.len()).green(),
        ));
    }

    fn collect_annotated_lines(&self, diagnostic: &Diagnostic) -> Vec<AnnotatedLine> {
        let mut lines: BTreeMap<usize, AnnotatedLine> = BTreeMap::new();

        for label in &diagnostic.labels {
            let (line_num, col_start) = self.offset_to_line_col(label.span.start);
            let (end_line, col_end) = self.offset_to_line_col(label.span.end);
            let text = self.get_line(line_num).unwrap_or("");

            // Multi-line spans underline the rest of the first line.
            let col_end = if end_line == line_num { col_end } else { text.len() + 1 };

            let entry = lines.entry(line_num).or_insert_with(|| AnnotatedLine {
                line_num,
                text: text.to_string(),
                annotations: Vec::new(),
            });
            entry.annotations.push(Annotation {
                col_start,
                col_end: col_end.max(col_start + 1),
                style: label.style,
                message: label.message.clone(),
            });
        }

        lines.into_values().collect()
    }

    fn format_annotations(&self, out: &mut String, line: &AnnotatedLine, gutter_width: usize) {
        let mut sorted: Vec<&Annotation> = line.annotations.iter().collect();
        sorted.sort_by(|a, b| {
            a.style
                .priority()
                .cmp(&b.style.priority())
                .then(a.col_start.cmp(&b.col_start))
        });

        let width = line.text.len() + 10;
        let mut underline = vec![' '; width];
        let mut messages: Vec<(usize, LabelStyle, &str)> = Vec::new();

        for ann in &sorted {
            let ch = match ann.style {
                LabelStyle::Primary => '^',
                LabelStyle::Secondary => '-',
            };
            let end = (ann.col_end - 1).min(width);
            for slot in underline.iter_mut().take(end).skip(ann.col_start - 1) {
                *slot = ch;
            }
            if let Some(msg) = &ann.message {
                messages.push((ann.col_start, ann.style, msg));
            }
        }

        let underline: String = underline.iter().collect::<String>().trim_end().to_string();
        if underline.is_empty() {
            return;
        }
        let pad = " ".repeat(gutter_width + 1);

        if messages.len() <= 1 {
            let message = messages
                .first()
                .map(|(_, style, msg)| format!(" {}", style_message(*style, msg)))
                .unwrap_or_default();
            out.push_str(&format!(
                "{} {} {}{}\n",
                pad,
                "|".blue(),
                color_underline(&underline),
                message
            ));
            return;
        }

        out.push_str(&format!("{} {} {}\n", pad, "|".blue(), color_underline(&underline)));
        for (col, style, msg) in messages.iter().rev() {
            let pipe = match style {
                LabelStyle::Primary => "|".red().bold().to_string(),
                LabelStyle::Secondary => "|".blue().to_string(),
            };
            out.push_str(&format!(
                "{} {} {}{} {}\n",
                pad,
                "|".blue(),
                " ".repeat(col.saturating_sub(1)),
                pipe,
                style_message(*style, msg),
            ));
        }
    }

    /// Byte offset to 1-based (line, column).
    fn offset_to_line_col(&self, offset: usize) -> (usize, usize) {
        let (line, col) = self.line_map.offset_to_line_col(offset);
        (line as usize, col as usize)
    }

    fn get_line(&self, line_num: usize) -> Option<&'a str> {
        self.line_map.line_text(self.source, line_num as u32)
    }
}

impl LabelStyle {
    fn priority(&self) -> u8 {
        match self {
            LabelStyle::Primary => 0,
            LabelStyle::Secondary => 1,
        }
    }
}

fn style_message(style: LabelStyle, msg: &str) -> String {
    match style {
        LabelStyle::Primary => msg.red().bold().to_string(),
        LabelStyle::Secondary => msg.blue().to_string(),
    }
}

fn color_underline(underline: &str) -> String {
    let mut out = String::new();
    for ch in underline.chars() {
        match ch {
            '^' => out.push_str(&"^".red().bold().to_string()),
            '-' => out.push_str(&"-".blue().to_string()),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgsl_ast::Span;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn renders_source_excerpt_with_carets() {
        plain();
        let source = "const a: Float = 10;\n";
        let diag = Diagnostic::error("mismatched types")
            .with_code("E0300")
            .with_primary(Span::new(17, 19), "expected `Float`, found `Integer`")
            .with_note("no implicit conversions");
        let out = DiagnosticFormatter::new(source)
            .with_file_name("shader.pgsl")
            .format(&diag);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "error[E0300]: mismatched types");
        assert_eq!(lines[1], "  --> shader.pgsl:1:18");
        assert_eq!(lines[3], "  1 | const a: Float = 10;");
        assert_eq!(lines[4], "    |                  ^^ expected `Float`, found `Integer`");
        assert_eq!(lines.last().copied(), Some("   = note: no implicit conversions"));
    }

    #[test]
    fn renders_suggestion_inline() {
        plain();
        let source = "let x: Float = valeu;";
        let diag = Diagnostic::error("undefined variable: valeu")
            .with_primary(Span::new(15, 20), "not found in this scope")
            .with_suggestion("a similar name exists: `value`", Span::new(15, 20), "value");
        let out = DiagnosticFormatter::new(source).format(&diag);

        assert!(out.starts_with("error: undefined variable: valeu\n"));
        assert!(out.contains("--> <source>:1:16"));
        assert!(out.contains("= help: a similar name exists: `value`"));
        assert!(out.contains("let x: Float = value;"));
        assert!(out.contains(&format!("{}~~~~~", " ".repeat(15))));
    }

    #[test]
    fn labels_on_separate_lines_are_grouped() {
        plain();
        let source = "fn a() {\n}\nfn a() {\n}\n";
        let diag = Diagnostic::error("`a` is already declared in this module")
            .with_secondary(Span::new(3, 4), "first declared here")
            .with_primary(Span::new(14, 15), "declared again here");
        let out = DiagnosticFormatter::new(source).format(&diag);

        assert!(out.contains("  1 | fn a() {"));
        assert!(out.contains("  3 | fn a() {"));
        assert!(out.contains("   ..."));
        assert!(out.contains("   - first declared here"));
        assert!(out.contains("^ declared again here"));
    }

    #[test]
    fn diagnostics_without_labels_print_header_only() {
        plain();
        let diag = Diagnostic::error("no entry point").with_help("add [VertexEntry()]");
        let out = DiagnosticFormatter::new("").format(&diag);
        assert_eq!(out, "error: no entry point\n   = help: add [VertexEntry()]\n");
    }
}
