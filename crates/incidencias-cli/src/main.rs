// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result};
use config::Config;
use incidencias_app::{IdentityGateway, Incident, sample_incidents};
use incidencias_testkit::IncidentFaker;
use runtime::Shell;
use std::env;
use std::io;
use std::path::PathBuf;
use time::OffsetDateTime;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `incidencias --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let assistant = incidencias_assistant::Client::new(
        config.assistant_base_url(),
        config.assistant_timeout()?,
    )
    .with_context(|| {
        format!(
            "invalid [assistant] config in {}; fix base_url/timeout values",
            options.config_path.display()
        )
    })?;

    let mut identity_client = match config.identity_anon_key() {
        Some(anon_key) => Some(
            incidencias_auth::Client::new(
                config.identity_base_url(),
                anon_key,
                config.identity_timeout()?,
            )
            .with_context(|| {
                format!(
                    "invalid [identity] config in {}; fix base_url/anon_key/timeout values",
                    options.config_path.display()
                )
            })?,
        ),
        None => None,
    };

    if options.health {
        let health = assistant.health()?;
        println!("{} ({})", health.status, health.timestamp);
        return Ok(());
    }
    if options.check_only {
        return Ok(());
    }

    let mut records = sample_incidents(OffsetDateTime::now_utc());
    if options.demo {
        records.extend(demo_records(12));
    }

    let identity = identity_client
        .as_mut()
        .map(|client| client as &mut dyn IdentityGateway);
    let mut shell = Shell::new(records, &assistant, identity);

    let stdout = io::stdout();
    let mut output = stdout.lock();
    if config.show_summary() {
        shell.print_counts(&mut output)?;
    }
    let stdin = io::stdin();
    shell.run(stdin.lock(), &mut output)
}

fn demo_records(count: usize) -> Vec<Incident> {
    IncidentFaker::new(42).incidents(count)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    health: bool,
    demo: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        health: false,
        demo: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--health" => {
                options.health = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("incidencias");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --check                  Validate config + service client setup");
    println!("  --health                 Probe the assistant health endpoint");
    println!("  --demo                   Add deterministic generated records to the sample set");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, parse_cli_args};
    use anyhow::Result;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/incidencias-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                check_only: false,
                health: false,
                demo: false,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_config_value() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_sets_print_check_and_health_flags() -> Result<()> {
        let options = parse_cli_args(
            vec![
                "--print-config-path",
                "--print-example-config",
                "--check",
                "--health",
            ],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(options.health);
        assert!(!options.demo);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_demo_flag() -> Result<()> {
        let options = parse_cli_args(vec!["--demo"], default_options_path())?;
        assert!(options.demo);
        Ok(())
    }

    #[test]
    fn demo_records_are_deterministic_and_well_formed() {
        let left = super::demo_records(12);
        let right = super::demo_records(12);
        assert_eq!(left.len(), 12);
        assert_eq!(left, right);
        for record in &left {
            assert!(record.created_at <= record.updated_at);
        }
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }
}
