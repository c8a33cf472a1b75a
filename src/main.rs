//! pathguard CLI
//!
//! Validates authorization rules and evaluates individual requests against them.

use clap::{Parser, Subcommand};
use pathguard::{
    access_control::{AuthorizationEvaluator, Identity},
    config::{AppConfig, LogFormat, load_config},
    identity::{IdentityProvider, create_identity_provider},
};
use serde_json::json;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// pathguard - ordered path-pattern authorization rules
#[derive(Parser, Debug)]
#[command(name = "pathguard")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "PATHGUARD_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PATHGUARD_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decide whether a request would be allowed
    Check {
        /// Request path, e.g. /users/alice/settings
        path: String,

        /// Principal name; omit for an anonymous request
        #[arg(short, long)]
        user: Option<String>,

        /// Extra role for the principal (repeatable)
        #[arg(short, long = "role")]
        roles: Vec<String>,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// List rules in evaluation order
    Rules,

    /// Load and compile the configuration
    Validate,

    /// Print the effective configuration as TOML
    ShowConfig,
}

fn init_logging(config: &AppConfig, cli_level: Option<&str>) {
    let level = cli_level.unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match config.logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

fn main() -> anyhow::Result<ExitCode> {
    // .env is optional; load it first so clap sees its variables too
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration before logging so its level and format apply;
    // failures are reported through a fallback subscriber
    let config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logging(&AppConfig::default(), args.log_level.as_deref());
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };

    init_logging(&config, args.log_level.as_deref());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        rules = config.authorization.rules.len(),
        users = config.users.len(),
        "Configuration loaded"
    );

    let evaluator = AuthorizationEvaluator::from_config(&config.authorization)
        .inspect_err(|e| error!(error = %e, "Failed to compile rules"))?;

    match args.command {
        Command::Check {
            path,
            user,
            roles,
            json,
        } => {
            let identities = create_identity_provider(&config)
                .inspect_err(|e| error!(error = %e, "Failed to create identity provider"))?;

            if user.is_none() && !roles.is_empty() {
                warn!("Roles are ignored for an anonymous request");
            }

            let identity = user.map(|name| {
                let known = identities.find(&name);
                if known.is_none() {
                    warn!(user = %name, "User is not configured, using only the given roles");
                }
                known
                    .unwrap_or_else(|| Identity::new(name))
                    .with_roles(roles)
            });

            let evaluation = evaluator.authorize(identity.as_ref(), &path);
            let rule = evaluation.rule.map(|i| evaluator.rules()[i].to_string());

            if json {
                let output = json!({
                    "path": path,
                    "principal": identity.as_ref().map(Identity::name),
                    "allowed": evaluation.decision.is_allowed(),
                    "reason": evaluation.decision.reason(),
                    "rule": rule,
                    "variables": evaluation.context.variables(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                let verdict = if evaluation.decision.is_allowed() {
                    "ALLOW"
                } else {
                    "DENY"
                };
                let governed_by =
                    rule.unwrap_or_else(|| format!("default -> {}", evaluator.default_access()));
                match evaluation.decision.reason() {
                    Some(reason) => println!("{verdict} ({governed_by}): {reason}"),
                    None => println!("{verdict} ({governed_by})"),
                }
            }

            Ok(if evaluation.decision.is_allowed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Rules => {
            for (index, rule) in evaluator.rules().iter().enumerate() {
                println!("{:>3}  {}", index, rule);
            }
            println!("  *  default -> {}", evaluator.default_access());
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate => {
            println!(
                "Configuration is valid: {} rule(s), {} user(s)",
                evaluator.rules().len(),
                config.users.len()
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::ShowConfig => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
