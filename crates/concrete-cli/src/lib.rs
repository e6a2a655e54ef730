//! The `concrete` command.
//!
//! Turns flags and an optional `concrete.toml` into one
//! [`GenerateRequest`] and runs it, or lists the interfaces of a package.

pub mod cli;
pub mod config;
pub mod output;

use anyhow::Context;
use cli::Cli;
use concrete_checker::LoaderConfig;
use concrete_engine::{
    generate_to, list, ConcreteError, FileSink, GenerateRequest, NameTemplate, RenderMode, Sink,
    SourceSpec, StreamSink, DEFAULT_RECEIVER,
};
use config::Config;
use std::io::Write;
use termcolor::WriteColor;
use tracing::info;

/// Settings after merging flags over the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub template: Option<String>,
    pub impl_package: Option<String>,
    pub receiver: String,
    pub write: bool,
    pub same_unit: bool,
    pub loader: LoaderConfig,
}

impl Settings {
    pub fn merge(cli: &Cli, config: Config) -> Self {
        let generate = config.generate;
        Self {
            template: cli.implementation.clone().or(generate.implementation),
            impl_package: cli.impl_package.clone().or(generate.impl_package),
            receiver: cli
                .receiver
                .clone()
                .or(generate.receiver)
                .unwrap_or_else(|| DEFAULT_RECEIVER.to_string()),
            write: cli.write || generate.write,
            same_unit: cli.same_unit || generate.same_unit,
            loader: LoaderConfig {
                include_tests: cli.include_tests || config.loader.include_tests,
            },
        }
    }
}

/// Exit status of a successful run.
pub const EXIT_SUCCESS: u8 = 0;
/// Exit status when loading, generation or writing fails. Usage errors
/// exit with 2 from clap.
pub const EXIT_FAILURE: u8 = 1;

/// Run the command, writing generated text or the interface list to
/// `stdout` and errors to `stderr`. Returns the exit status.
pub fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn WriteColor) -> u8 {
    match execute(cli, stdout) {
        Ok(()) => EXIT_SUCCESS,
        Err(err) => {
            match err.downcast_ref::<ConcreteError>() {
                Some(err) => output::report_error(err, cli.message_format, stderr),
                None => {
                    let _ = writeln!(stderr, "concrete: {:#}", err);
                }
            }
            EXIT_FAILURE
        }
    }
}

fn execute(cli: &Cli, stdout: &mut dyn Write) -> anyhow::Result<()> {
    let dir = &cli.in_package;
    let config = Config::discover(cli.config.as_deref(), dir).context("loading configuration")?;
    let settings = Settings::merge(cli, config);
    let source = SourceSpec::dir(dir);

    if cli.list {
        for name in list(&source, &settings.loader)? {
            writeln!(stdout, "{}", name).context("writing interface list")?;
        }
        return Ok(());
    }

    let interface = cli
        .interface
        .as_deref()
        .context("an interface name is required")?;
    let template = match &settings.template {
        Some(template) => NameTemplate::parse(template)?,
        None => NameTemplate::default(),
    };
    let type_name = template.type_name(interface)?;

    let mut request = GenerateRequest::new(interface, source)
        .with_type_name(type_name)
        .with_receiver(settings.receiver.clone())
        .with_loader(settings.loader.clone())
        .with_mode(if settings.same_unit {
            RenderMode::SameUnit
        } else {
            RenderMode::Standalone
        });
    if let Some(package) = &settings.impl_package {
        request = request.with_package(package.clone());
    }

    if settings.write {
        let mut sink = FileSink::for_type(dir, &request.type_name);
        generate_to(&request, &mut sink)?;
        info!(path = %sink.target(), "wrote {}", request.type_name);
    } else {
        let mut sink = StreamSink::new("stdout", stdout);
        generate_to(&request, &mut sink)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "concrete",
            "-i",
            "Rdr",
            "--implementation",
            "My{{.Interface}}",
        ])
        .unwrap();
        let config = Config::from_str(
            "[generate]\nimplementation = \"Fake{{.Interface}}\"\nreceiver = \"f\"\nwrite = true\n\n[loader]\ninclude-tests = true\n",
        )
        .unwrap();
        let settings = Settings::merge(&cli, config);
        assert_eq!(settings.template.as_deref(), Some("My{{.Interface}}"));
        assert_eq!(settings.receiver, "f");
        assert!(settings.write);
        assert!(settings.loader.include_tests);
        assert!(!settings.same_unit);
    }

    #[test]
    fn test_defaults_without_config() {
        let cli = Cli::try_parse_from(["concrete", "-i", "Rdr"]).unwrap();
        let settings = Settings::merge(&cli, Config::default());
        assert_eq!(settings.template, None);
        assert_eq!(settings.receiver, "t");
        assert_eq!(settings.impl_package, None);
        assert!(!settings.write);
    }
}
