//! Command-line surface of the hook
//!
//! `<prog> <command> <domain> <validation_name> <validation_context>`
//!
//! Only the arguments a command needs are required, and they are checked
//! in positional order so the first missing one is reported.

use txthook_core::Error;

/// What the hook was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print usage and exit
    Help,
    /// Run a command against the token file or the provider
    Run(Command),
}

/// Commands that need configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Publish the challenge value
    Set(Challenge),
    /// Withdraw the challenge value
    Unset(Challenge),
    /// Create the token file
    Init,
    /// Check the token file and run the provider probe
    Test {
        /// Any name inside the zone to probe
        domain: String,
    },
}

/// Positional arguments of `set` and `unset`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub domain: String,
    pub validation_name: String,
    pub validation_context: String,
}

impl Invocation {
    /// Parse the arguments following the program name
    pub fn parse<I>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let command = args
            .next()
            .ok_or_else(|| Error::argument_missing("Command"))?;

        let mut next = |name: &str| args.next().ok_or_else(|| Error::argument_missing(name));

        match command.as_str() {
            "help" => Ok(Invocation::Help),
            "init" => Ok(Invocation::Run(Command::Init)),
            "test" => Ok(Invocation::Run(Command::Test {
                domain: next("domain")?,
            })),
            "set" | "unset" => {
                let challenge = Challenge {
                    domain: next("domain")?,
                    validation_name: next("validation_name")?,
                    validation_context: next("validation_context")?,
                };
                Ok(Invocation::Run(if command == "set" {
                    Command::Set(challenge)
                } else {
                    Command::Unset(challenge)
                }))
            }
            other => Err(Error::invalid_command(other)),
        }
    }
}

/// One-line pointer to the help command, printed after usage errors
pub fn help_hint(prog: &str) -> String {
    format!("Use \"{} help\" for help!", prog)
}

/// Full usage text
pub fn usage(prog: &str) -> String {
    format!(
        "Usage: {prog} <command> [domain] [validation_name] [validation_context]

Commands:
  set <domain> <validation_name> <validation_context>
      Add validation_context to the TXT records at validation_name
  unset <domain> <validation_name> <validation_context>
      Remove validation_context from the TXT records at validation_name
  init
      Create the token file with mode 0600
  test <domain>
      Check the token file, then create and delete a probe TXT record
  help
      Show this text

Environment:
  TXTHOOK_TOKEN_FILE         Token file (default: $HOME/.txthook-token)
  TXTHOOK_PROVIDER           Provider type (default: hetzner)
  TXTHOOK_API_BASE           Provider API base URL
  TXTHOOK_TTL                TTL of new TXT records (default: 3600)
  TXTHOOK_HTTP_TIMEOUT_SECS  Request timeout (default: 30)
  TXTHOOK_MODE               live or dry-run (default: live)
  TXTHOOK_LOG_LEVEL          trace, debug, info, warn, error (default: info)
"
    )
}
