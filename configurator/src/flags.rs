//! Flag registration and parsing service.
//!
//! Stands in for a process-wide flag namespace: flag providers register
//! their arguments here during the Flag phase, and the set is then parsed
//! against the argument list left over after the reserved file flag has
//! been stripped.

use clap::error::ErrorKind;
use clap::{Arg, ArgMatches, Command};

#[derive(Debug, Clone)]
pub struct FlagSet {
    command: Command,
}

impl FlagSet {
    /// Creates an empty flag set named after the application.
    pub fn new(app_name: impl Into<String>) -> Self {
        let command = Command::new(app_name.into()).disable_version_flag(true);
        Self { command }
    }

    /// Registers `arg`. Re-registering an id that already exists is ignored,
    /// so providers may call `init` more than once without clap rejecting
    /// the duplicate.
    pub fn register(&mut self, arg: Arg) {
        if self.is_registered(arg.get_id().as_str()) {
            tracing::debug!(id = %arg.get_id(), "flag already registered");
            return;
        }
        self.command = self.command.clone().arg(arg);
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.command
            .get_arguments()
            .any(|a| a.get_id().as_str() == id)
    }

    /// Parses `args`, whose first element is the program name.
    pub fn parse(&self, args: &[String]) -> Result<ArgMatches, clap::Error> {
        self.command.clone().try_get_matches_from(args)
    }

    /// The rendered usage when `args` contain `--help` or `-h`.
    pub fn help(&self, args: &[String]) -> Option<String> {
        match self.parse(args) {
            Err(err) if err.kind() == ErrorKind::DisplayHelp => Some(err.render().to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ArgAction;

    fn port_arg() -> Arg {
        Arg::new("port")
            .long("port")
            .action(ArgAction::Set)
            .value_parser(clap::value_parser!(i64))
    }

    #[test]
    fn test_register_and_parse() {
        let mut flags = FlagSet::new("demo");
        flags.register(port_arg());

        let args = vec!["demo".to_string(), "--port".to_string(), "8081".to_string()];
        let matches = flags.parse(&args).unwrap();
        assert_eq!(matches.get_one::<i64>("port"), Some(&8081));
    }

    #[test]
    fn test_duplicate_registration_is_ignored() {
        let mut flags = FlagSet::new("demo");
        flags.register(port_arg());
        flags.register(port_arg());

        assert!(flags.is_registered("port"));
        let matches = flags.parse(&["demo".to_string()]).unwrap();
        assert_eq!(matches.get_one::<i64>("port"), None);
    }

    #[test]
    fn test_unknown_flag_is_an_error() {
        let flags = FlagSet::new("demo");
        let args = vec!["demo".to_string(), "--nope".to_string()];
        assert!(flags.parse(&args).is_err());
    }

    #[test]
    fn test_help_is_rendered_not_parsed() {
        let mut flags = FlagSet::new("demo");
        flags.register(port_arg().help("Port to listen on"));

        let args = vec!["demo".to_string(), "-h".to_string()];
        let usage = flags.help(&args).unwrap();
        assert!(usage.contains("Usage: demo"));
        assert!(usage.contains("Port to listen on"));

        assert!(flags.help(&["demo".to_string()]).is_none());
        assert!(flags.help(&["demo".to_string(), "--nope".to_string()]).is_none());
    }
}
