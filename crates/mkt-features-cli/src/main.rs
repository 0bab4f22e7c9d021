//! `mkt-features`: inspect and produce app feature signatures

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use mkt_features::{FeatureCatalog, FeatureProfile, SignatureConfig, SignatureForm};
use tracing_subscriber::EnvFilter;

fn build_cli() -> Command {
    Command::new("mkt-features")
        .version(mkt_features::VERSION)
        .about("Encode and decode marketplace app feature signatures")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with signature version and default form"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("decode")
                .about("Show the features a signature enables")
                .arg(Arg::new("signature").required(true))
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the full key -> enabled map as JSON"),
                ),
        )
        .subcommand(
            Command::new("encode")
                .about("Build a signature from enabled feature keys")
                .arg(
                    Arg::new("feature")
                        .long("feature")
                        .short('f')
                        .action(ArgAction::Append)
                        .help("Feature key to enable (repeatable)"),
                )
                .arg(
                    Arg::new("base64")
                        .long("base64")
                        .action(ArgAction::SetTrue)
                        .help("Use the base64 form regardless of config"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Exit 0 iff the signature enables every required feature")
                .arg(Arg::new("signature").required(true))
                .arg(
                    Arg::new("require")
                        .long("require")
                        .short('r')
                        .action(ArgAction::Append)
                        .required(true)
                        .help("Required feature key (repeatable)"),
                ),
        )
        .subcommand(
            Command::new("catalog")
                .about("List the feature catalog in bit order")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<SignatureConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => SignatureConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(SignatureConfig::default()),
    }
}

fn strings(args: &ArgMatches, id: &str) -> Vec<String> {
    args.get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Runs the chosen subcommand; `Ok(false)` means a `check` failed
fn run(matches: &ArgMatches, out: &mut impl Write) -> anyhow::Result<bool> {
    let (name, args) = matches.subcommand().context("missing subcommand")?;
    // Globals propagate down, so the subcommand sees --config wherever it was given
    let config = load_config(args)?;
    let catalog = config.catalog();

    match (name, args) {
        ("decode", args) => {
            let text = args
                .get_one::<String>("signature")
                .context("missing signature")?;
            let profile = FeatureProfile::from_signature(catalog, text)
                .with_context(|| format!("decoding '{text}'"))?;
            if args.get_flag("json") {
                writeln!(out, "{}", serde_json::to_string_pretty(&profile)?)?;
            } else {
                for key in profile.to_list() {
                    writeln!(out, "{key}")?;
                }
            }
        }
        ("encode", args) => {
            let features = strings(args, "feature");
            if let Some(unknown) = features.iter().find(|k| catalog.position(k).is_none()) {
                anyhow::bail!("unknown feature: '{unknown}'");
            }
            let profile = FeatureProfile::with_enabled(catalog, &features);
            let form = if args.get_flag("base64") {
                SignatureForm::Base64
            } else {
                config.form
            };
            writeln!(out, "{}", profile.signature(form))?;
        }
        ("check", args) => {
            let text = args
                .get_one::<String>("signature")
                .context("missing signature")?;
            let required = strings(args, "require");
            let profile = FeatureProfile::from_signature(catalog, text)
                .with_context(|| format!("decoding '{text}'"))?;
            if !profile.has_features(&required) {
                let missing: Vec<&str> = required
                    .iter()
                    .map(String::as_str)
                    .filter(|k| profile.get(k) != Some(true))
                    .collect();
                tracing::info!(?missing, "signature lacks required features");
                writeln!(out, "missing: {}", missing.join(", "))?;
                return Ok(false);
            }
            writeln!(out, "ok")?;
        }
        ("catalog", args) => write_catalog(catalog, args.get_flag("json"), out)?,
        _ => unreachable!("subcommand_required"),
    }

    Ok(true)
}

fn write_catalog(catalog: FeatureCatalog, json: bool, out: &mut impl Write) -> anyhow::Result<()> {
    if json {
        let entries: Vec<serde_json::Value> = catalog
            .iter()
            .enumerate()
            .map(|(position, f)| {
                serde_json::json!({
                    "position": position,
                    "key": f.key(),
                    "name": f.name,
                    "description": f.description,
                })
            })
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
    } else {
        writeln!(out, "catalog version {}, {} features", catalog.version(), catalog.len())?;
        for (position, f) in catalog.iter().enumerate() {
            writeln!(out, "{position:>3}  {:<28} {}", f.key(), f.name)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    let log_json = matches
        .subcommand()
        .is_some_and(|(_, args)| args.get_flag("log-json"));
    init_tracing(log_json);

    let stdout = io::stdout();
    match run(&matches, &mut stdout.lock()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    fn run_args(args: &[&str]) -> (anyhow::Result<bool>, String) {
        let matches = build_cli()
            .try_get_matches_from(std::iter::once("mkt-features").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        let result = run(&matches, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn cli_definition_is_valid() {
        build_cli().debug_assert();
    }

    #[test]
    fn encode_then_decode() {
        let (result, out) = run_args(&["encode", "-f", "apps", "-f", "sms"]);
        assert!(result.unwrap());
        assert_eq!(out, "8000040000000.52.1\n");

        let (result, out) = run_args(&["decode", "8000040000000.52.1"]);
        assert!(result.unwrap());
        assert_eq!(out, "apps\nsms\n");
    }

    #[test]
    fn encode_base64() {
        let (result, out) = run_args(&["encode", "--feature", "apps", "--base64"]);
        assert!(result.is_ok());
        assert_eq!(out, "=AQAAAAAAAA==.52.1\n");
    }

    #[test]
    fn encode_rejects_unknown_feature() {
        let (result, _) = run_args(&["encode", "-f", "teleport"]);
        assert!(result.unwrap_err().to_string().contains("teleport"));
    }

    #[test]
    fn decode_malformed() {
        let (result, _) = run_args(&["decode", "2.3"]);
        assert!(result.is_err());
    }

    #[test]
    fn check_reports_missing() {
        let (result, out) = run_args(&["check", "8000040000000.52.1", "-r", "apps", "-r", "pay"]);
        assert!(!result.unwrap());
        assert_eq!(out, "missing: pay\n");

        let (result, out) = run_args(&["check", "8000040000000.52.1", "-r", "sms"]);
        assert!(result.unwrap());
        assert_eq!(out, "ok\n");
    }

    #[test]
    fn config_sets_version_and_form() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "version = 3\nform = \"base64\"").unwrap();
        let path = file.path().to_str().unwrap();

        let (result, out) = run_args(&["--config", path, "encode", "-f", "apps"]);
        assert!(result.is_ok());
        assert_eq!(out, "=AQAAAAAAAA==.52.3\n");
    }

    #[test]
    fn catalog_lists_every_feature() {
        let (result, out) = run_args(&["catalog"]);
        assert!(result.is_ok());
        assert!(out.starts_with("catalog version 1, 52 features\n"));
        assert_eq!(out.lines().count(), 53);
    }
}
