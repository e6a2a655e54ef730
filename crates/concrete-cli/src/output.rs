//! Error reporting and logging setup.
//!
//! Uses `termcolor` for cross-platform colored terminal output.
//! Respects `NO_COLOR` environment variable and `--color` flag.

use crate::cli::{ColorWhen, MessageFormat};
use concrete_engine::ConcreteError;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, WriteColor};
use tracing_subscriber::EnvFilter;

/// Variable holding the log filter, e.g. `CONCRETE_LOG=concrete_checker=trace`.
pub const LOG_ENV: &str = "CONCRETE_LOG";

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: ColorWhen) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        ColorWhen::Always => ColorChoice::Always,
        ColorWhen::Never => ColorChoice::Never,
        ColorWhen::Auto => ColorChoice::Auto,
    }
}

/// Install the stderr log subscriber. `-v` forces `debug`; otherwise the
/// filter comes from `CONCRETE_LOG`, and nothing is logged without it.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        match EnvFilter::try_from_env(LOG_ENV) {
            Ok(filter) => filter,
            Err(_) => return,
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .without_time()
        .compact()
        .with_writer(std::io::stderr)
        .try_init();
    tracing::debug!("tracing initialized");
}

/// Print a generation failure. Parse and type-check failures are rendered
/// as source diagnostics; everything else as a one-line message.
pub fn report_error(err: &ConcreteError, format: MessageFormat, out: &mut dyn WriteColor) {
    let diagnostics = err.diagnostics();
    match (format, err.sources()) {
        (MessageFormat::Human, Some(sources)) if !diagnostics.is_empty() => {
            for diagnostic in &diagnostics {
                if diagnostic.emit_to(out, sources).is_err() {
                    let _ = writeln!(out, "error: {}", diagnostic.message());
                }
            }
            write_summary(out, diagnostics.len());
        }
        (MessageFormat::Json, Some(sources)) if !diagnostics.is_empty() => {
            for diagnostic in &diagnostics {
                match diagnostic.to_json(sources) {
                    Ok(line) => {
                        let _ = writeln!(out, "{}", line);
                    }
                    Err(_) => write_json_error(out, err),
                }
            }
        }
        (MessageFormat::Human, _) => {
            let mut spec = ColorSpec::new();
            spec.set_fg(Some(Color::Red)).set_bold(true);
            let _ = out.set_color(&spec);
            let _ = write!(out, "concrete:");
            let _ = out.reset();
            let _ = writeln!(out, " {}", err);
        }
        (MessageFormat::Json, _) => write_json_error(out, err),
    }
}

fn write_summary(out: &mut dyn WriteColor, count: usize) {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Red)).set_bold(true);
    let _ = out.set_color(&spec);
    let _ = write!(out, "error");
    let _ = out.reset();
    let plural = if count == 1 { "" } else { "s" };
    let _ = writeln!(out, ": could not load package due to {} previous error{}", count, plural);
}

fn write_json_error(out: &mut dyn WriteColor, err: &ConcreteError) {
    let value = serde_json::json!({
        "kind": err.kind(),
        "severity": "error",
        "message": err.to_string(),
    });
    let _ = writeln!(out, "{}", value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use concrete_engine::{generate, GenerateRequest, SourceSpec};
    use termcolor::NoColor;

    fn report(err: &ConcreteError, format: MessageFormat) -> String {
        let mut out = NoColor::new(Vec::new());
        report_error(err, format, &mut out);
        String::from_utf8(out.into_inner()).unwrap()
    }

    fn check_failure() -> ConcreteError {
        let source = "package temperature\n\ntype Rdr interface {\n\tGet() Celsius\n}\n";
        generate(&GenerateRequest::new("Rdr", SourceSpec::text("rdr.go", source))).unwrap_err()
    }

    #[test]
    fn test_human_diagnostics() {
        let text = report(&check_failure(), MessageFormat::Human);
        assert!(text.contains("undefined: Celsius"), "{}", text);
        assert!(text.contains("rdr.go:4:8"), "{}", text);
        assert!(text.ends_with("could not load package due to 1 previous error\n"));
    }

    #[test]
    fn test_json_diagnostics() {
        let text = report(&check_failure(), MessageFormat::Json);
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["message"], "undefined: Celsius");
        assert_eq!(value["labels"][0]["file"], "rdr.go");
        assert_eq!(value["labels"][0]["start_line"], 4);
    }

    #[test]
    fn test_plain_errors() {
        let err = ConcreteError::NotFound {
            name: "Rdr".to_string(),
            package: "temperature".to_string(),
        };
        assert_eq!(
            report(&err, MessageFormat::Human),
            "concrete: could not find interface 'Rdr' in package temperature\n"
        );
        let value: serde_json::Value =
            serde_json::from_str(report(&err, MessageFormat::Json).trim()).unwrap();
        assert_eq!(value["kind"], "not_found");
    }

    #[test]
    fn test_color_flag() {
        if std::env::var_os("NO_COLOR").is_none() {
            assert_eq!(resolve_color_choice(ColorWhen::Always), ColorChoice::Always);
        }
        assert_eq!(resolve_color_choice(ColorWhen::Never), ColorChoice::Never);
    }
}
