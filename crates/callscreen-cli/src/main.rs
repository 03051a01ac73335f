//! `callscreen`: screen calls and messages against a profile from the shell.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use callscreen_core::{
    render_reason, Extraction, Incoming, Profile, Resolution, Resolver, Step, Verdict,
    VerificationStatus,
};

#[derive(Parser)]
#[command(name = "callscreen", version, about = "Screen calls and SMS with prioritized rules")]
struct Cli {
    /// Profile document (YAML, or JSON with a .json extension)
    #[arg(short, long, global = true, default_value = "profile.yaml")]
    profile: PathBuf,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log every checker decision
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Screen an incoming call
    Call {
        number: String,

        /// Emergency-callback or network-identified emergency call
        #[arg(long)]
        emergency: bool,

        /// Caller verification outcome from the network
        #[arg(long, value_enum)]
        verification: Option<Verification>,

        /// Show every checker consulted
        #[arg(long)]
        explain: bool,
    },

    /// Screen an incoming SMS
    Sms {
        number: String,
        body: String,

        /// Show every checker consulted
        #[arg(long)]
        explain: bool,
    },

    /// Extract a value (e.g. a one-time code) from message text
    Extract { body: String },

    /// Explain a recorded verdict against the profile's current rules
    Reason {
        /// Verdict JSON, bare or as printed by `--format json`
        verdict: String,
    },

    /// Check a profile and report rules whose patterns do not compile
    Validate,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
    Yaml,
}

#[derive(Clone, Copy, ValueEnum)]
enum Verification {
    Passed,
    Failed,
    NotVerified,
}

impl From<Verification> for VerificationStatus {
    fn from(v: Verification) -> Self {
        match v {
            Verification::Passed => VerificationStatus::Passed,
            Verification::Failed => VerificationStatus::Failed,
            Verification::NotVerified => VerificationStatus::NotVerified,
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    verdict: &'a Verdict,
    reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    steps: Option<&'a [Step]>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let profile = Profile::from_file(&cli.profile)
        .with_context(|| format!("loading profile {}", cli.profile.display()))?;
    tracing::debug!(profile = %cli.profile.display(), "Profile loaded");

    match cli.command {
        Command::Call {
            number,
            emergency,
            verification,
            explain,
        } => {
            let incoming = Incoming::call(number, emergency, verification.map(Into::into));
            screen(&profile, &incoming, explain, cli.format)
        }
        Command::Sms {
            number,
            body,
            explain,
        } => screen(&profile, &Incoming::sms(number, body), explain, cli.format),
        Command::Extract { body } => {
            let mem = profile.to_sources();
            let resolver = Resolver::new(&profile.settings, mem.sources());
            let found = resolver.extract_quick_value(&body);
            print_extraction(found.as_ref(), cli.format)?;
            Ok(if found.is_some() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Reason { verdict } => {
            let verdict = parse_verdict(&verdict)?;
            let reason = render_reason(&verdict, &profile.rules);
            match cli.format {
                Format::Text => println!("{}", reason),
                Format::Json => println!("{}", serde_json::to_string_pretty(&reason)?),
                Format::Yaml => print!("{}", serde_yaml::to_string(&reason)?),
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate => validate(&profile, cli.format),
    }
}

/// Evaluate and print. Exit status 1 means blocked.
fn screen(profile: &Profile, incoming: &Incoming, explain: bool, format: Format) -> Result<ExitCode> {
    let mem = profile.to_sources();
    let resolver = Resolver::new(&profile.settings, mem.sources());
    let Resolution { verdict, steps } = resolver.resolve(incoming);

    let report = Report {
        reason: render_reason(&verdict, &mem.rules),
        verdict: &verdict,
        steps: explain.then_some(steps.as_slice()),
    };

    match format {
        Format::Text => {
            let label = if verdict.blocks { "BLOCKED" } else { "ALLOWED" };
            println!("{} [{}] {}", label, verdict.code, report.reason);
            if let Some(steps) = report.steps {
                for step in steps {
                    let mark = if step.matched { "*" } else { "-" };
                    println!("  {} {:?} (priority {})", mark, step.kind, step.priority);
                }
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Yaml => print!("{}", serde_yaml::to_string(&report)?),
    }

    Ok(if verdict.blocks {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn print_extraction(found: Option<&Extraction>, format: Format) -> Result<()> {
    match format {
        Format::Text => match found {
            Some(e) => println!("{}", e.value),
            None => eprintln!("no quick-copy rule matched"),
        },
        Format::Json => println!("{}", serde_json::to_string_pretty(&found)?),
        Format::Yaml => print!("{}", serde_yaml::to_string(&found)?),
    }
    Ok(())
}

/// Accept a bare verdict or a full `call`/`sms` JSON report.
fn parse_verdict(json: &str) -> Result<Verdict> {
    let value: serde_json::Value = serde_json::from_str(json).context("verdict is not valid JSON")?;
    let value = match value.get("verdict") {
        Some(inner) => inner.clone(),
        None => value,
    };
    serde_json::from_value(value).context("JSON does not describe a verdict")
}

fn validate(profile: &Profile, format: Format) -> Result<ExitCode> {
    let malformed = profile.malformed_rules();
    let messages: Vec<String> = malformed.iter().map(|e| e.to_string()).collect();

    match format {
        Format::Text => {
            if messages.is_empty() {
                println!(
                    "OK: {} number, {} content, {} quick-copy rules",
                    profile.rules.number.len(),
                    profile.rules.content.len(),
                    profile.rules.quick_copy.len()
                );
            }
            for message in &messages {
                println!("WARN: {}", message);
            }
        }
        Format::Json => println!("{}", serde_json::to_string_pretty(&messages)?),
        Format::Yaml => print!("{}", serde_yaml::to_string(&messages)?),
    }

    Ok(if messages.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
