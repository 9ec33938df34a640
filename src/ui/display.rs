//! Display functions for diagnostics, render plans and temper reports

use console::Style;

use crate::domain::{Diagnostic, ResolvedFile, Severity};
use crate::temper::TemperReport;

macro_rules! display_opt_field {
    ($label:expr, $value:expr) => {
        if let Some(ref v) = $value {
            println!("  {} {}", Style::new().bold().apply_to($label), v);
        }
    };
}

/// One diagnostic as `severity: file: message`
pub fn diagnostic_line(diagnostic: &Diagnostic) -> String {
    let severity_style = match diagnostic.severity {
        Severity::Error => Style::new().bold().red(),
        Severity::Warning => Style::new().bold().yellow(),
    };
    let severity = severity_style.apply_to(format!("{}:", diagnostic.severity));
    match &diagnostic.file {
        Some(file) => format!(
            "{severity} {} {}",
            Style::new().cyan().apply_to(format!("{file}:")),
            diagnostic.message
        ),
        None => format!("{severity} {}", diagnostic.message),
    }
}

/// Print diagnostics to stderr
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{}", diagnostic_line(diagnostic));
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// `2 errors, 1 warning`
pub fn summary_line(errors: usize, warnings: usize) -> String {
    format!("{}, {}", plural(errors, "error"), plural(warnings, "warning"))
}

/// Print the planned `source -> destination` mapping
pub fn display_plan(files: &[ResolvedFile]) {
    if files.is_empty() {
        println!("No files to render.");
        return;
    }
    let width = files.iter().map(|f| f.source.len()).max().unwrap_or(0);
    for file in files {
        let suffix = if file.process {
            String::new()
        } else {
            format!(" {}", Style::new().dim().apply_to("(copied verbatim)"))
        };
        println!(
            "  {:<width$} -> {}{suffix}",
            file.source,
            Style::new().green().apply_to(&file.destination),
        );
    }
}

/// Print a temper report
pub fn display_temper_report(report: &TemperReport) {
    println!(
        "{} {}",
        Style::new().bold().apply_to("Tempering"),
        Style::new()
            .bold()
            .yellow()
            .apply_to(report.name.as_deref().unwrap_or("(unnamed)"))
    );
    println!("  {} {}", Style::new().bold().apply_to("Kind:"), report.kind);
    display_opt_field!("Version:", report.version);

    if report.diagnostics.is_empty() {
        println!("\n{}", Style::new().green().bold().apply_to("No problems found."));
        return;
    }

    println!();
    for diagnostic in &report.diagnostics {
        println!("  {}", diagnostic_line(diagnostic));
    }
    let summary = summary_line(report.errors().count(), report.warnings().count());
    let style = if report.has_errors() {
        Style::new().red().bold()
    } else {
        Style::new().yellow().bold()
    };
    println!("\n{}", style.apply_to(summary));
}
