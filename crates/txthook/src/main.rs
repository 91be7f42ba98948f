// # txthook - ACME DNS-01 TXT record hook
//
// A thin integration layer: all naming and reconciliation logic lives in
// txthook-core. This binary is responsible for:
// 1. Parsing the command line
// 2. Reading configuration from environment variables
// 3. Initializing logging and the runtime
// 4. Registering providers and running one command
// 5. Mapping the outcome to the exit status
//
// ## Example
//
// ```bash
// txthook init
// echo "$HCLOUD_TOKEN" > ~/.txthook-token
// txthook test example.com
//
// # called by the ACME client
// txthook set example.com _acme-challenge.example.com. <token>
// txthook unset example.com _acme-challenge.example.com. <token>
// ```

mod cli;

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use txthook_core::{ChallengeTarget, HookConfig, ProviderRegistry, Reconciler, TokenFile, names};

use crate::cli::{Command, Invocation};

/// Exit codes reported to the ACME client
#[derive(Debug, Clone, Copy)]
enum HookExitCode {
    /// Command completed
    Success = 0,
    /// Usage, configuration, token file or provider failure
    Failure = 1,
}

impl From<HookExitCode> for ExitCode {
    fn from(code: HookExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let mut args = env::args();
    let prog = args.next().unwrap_or_else(|| "txthook".to_string());

    let command = match Invocation::parse(args) {
        Ok(Invocation::Help) => {
            print!("{}", cli::usage(&prog));
            return HookExitCode::Success.into();
        }
        Ok(Invocation::Run(command)) => command,
        Err(e) => {
            eprintln!("{}", e);
            if e.is_usage() {
                println!("{}", cli::help_hint(&prog));
            }
            return HookExitCode::Failure.into();
        }
    };

    let config = match HookConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{}", e);
            return HookExitCode::Failure.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("{}", e);
        return HookExitCode::Failure.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout is reserved for messages meant for the operator
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HookExitCode::Failure.into();
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {}", e);
            return HookExitCode::Failure.into();
        }
    };

    let code = match rt.block_on(run(command, &config)) {
        Ok(()) => HookExitCode::Success,
        Err(e) => {
            eprintln!("{:#}", e);
            HookExitCode::Failure
        }
    };

    code.into()
}

/// Run one command to completion
async fn run(command: Command, config: &HookConfig) -> Result<()> {
    let token_file = TokenFile::new(&config.token_file);

    match command {
        Command::Init => {
            let path = token_file.path().display();
            println!("Creating {}...", path);
            println!("Change mode of {} to 0600...", path);
            token_file
                .init()
                .await
                .with_context(|| format!("Failed to create {}", path))?;
        }

        Command::Set(challenge) => {
            let target = ChallengeTarget::from_fqdns(&challenge.domain, &challenge.validation_name)?;
            let reconciler = connect(config, &token_file).await?;
            let outcome = reconciler
                .set(&target, &challenge.validation_context)
                .await
                .context("Failed to set TXT record")?;
            info!(zone = %target.zone, name = %target.record_name, ?outcome, "set finished");
        }

        Command::Unset(challenge) => {
            let target = ChallengeTarget::from_fqdns(&challenge.domain, &challenge.validation_name)?;
            let reconciler = connect(config, &token_file).await?;
            let outcome = reconciler
                .unset(&target, &challenge.validation_context)
                .await
                .context("Failed to unset TXT record")?;
            info!(zone = %target.zone, name = %target.record_name, ?outcome, "unset finished");
        }

        Command::Test { domain } => {
            let warnings = token_file
                .check_permissions()
                .await
                .context("Failed to test token")?;
            for warning in &warnings {
                println!("{}", warning);
            }

            let zone = names::registrable_domain(&domain);
            if zone.is_empty() {
                anyhow::bail!("No registrable domain in '{}'", domain);
            }

            let reconciler = connect(config, &token_file).await?;
            let probe = config.reconciler_config();
            println!("Looking up zone: {}", zone);
            println!("Creating TXT record: {} = \"{}\"", probe.probe_name, probe.probe_value);
            reconciler.self_test(&zone).await.context("Test failed")?;
            println!("Test passed!");
        }
    }

    Ok(())
}

/// Read the token and build a reconciler over the configured provider
async fn connect(config: &HookConfig, token_file: &TokenFile) -> Result<Reconciler> {
    let token = token_file.read_token().await.context("Failed to get token")?;

    let registry = ProviderRegistry::new();

    #[cfg(feature = "hetzner")]
    txthook_provider_hetzner::register(&registry);

    let provider = registry
        .create_provider(&config.provider_config(token))
        .context("Failed to create provider")?;

    let reconciler = Reconciler::new(provider, config.reconciler_config());
    info!(
        provider = reconciler.provider_name(),
        mode = ?config.mode,
        "Provider ready"
    );
    Ok(reconciler)
}
