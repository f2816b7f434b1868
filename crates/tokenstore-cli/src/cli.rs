use clap::{Parser, Subcommand, ValueEnum};
use tokenstore_core::RecordKind;

#[derive(Parser)]
#[command(name = "tokenstore")]
#[command(about = "Provision and inspect OAuth 2.0 token collections")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file (defaults to ./tokenstore.toml)
    #[arg(short, long, global = true, env = "TOKENSTORE_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Declare the TTL indexes on every token collection
    Init,
    /// Look up a token by one of its keys
    Get(LookupArgs),
    /// Remove the record stored under a key
    Remove(LookupArgs),
    /// Print the effective configuration
    Config,
}

/// Which key a lookup or removal goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeyKind {
    /// Authorization code
    Code,
    /// Access token
    Access,
    /// Refresh token
    Refresh,
}

impl KeyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyKind::Code => "code",
            KeyKind::Access => "access",
            KeyKind::Refresh => "refresh",
        }
    }

    /// Collection kind the key lives in.
    pub fn record_kind(self) -> RecordKind {
        match self {
            KeyKind::Code => RecordKind::Basic,
            KeyKind::Access => RecordKind::Access,
            KeyKind::Refresh => RecordKind::Refresh,
        }
    }
}

#[derive(clap::Args)]
pub struct LookupArgs {
    /// Key kind
    pub kind: KeyKind,
    /// Key value
    pub key: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get() {
        let cli = Cli::try_parse_from(["tokenstore", "get", "access", "a1"]).unwrap();
        match cli.command {
            Commands::Get(args) => {
                assert_eq!(args.kind, KeyKind::Access);
                assert_eq!(args.key, "a1");
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn test_parse_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["tokenstore", "remove", "refresh", "r1", "--config", "x.toml"])
                .unwrap();
        assert_eq!(cli.config.as_deref(), Some("x.toml"));
    }

    #[test]
    fn test_rejects_unknown_kind() {
        assert!(Cli::try_parse_from(["tokenstore", "get", "basic", "b1"]).is_err());
    }

    #[test]
    fn test_key_kind_names_match_arguments() {
        for kind in [KeyKind::Code, KeyKind::Access, KeyKind::Refresh] {
            let cli = Cli::try_parse_from(["tokenstore", "get", kind.as_str(), "k"]).unwrap();
            match cli.command {
                Commands::Get(args) => assert_eq!(args.kind, kind),
                _ => panic!("expected get"),
            }
        }
    }

    #[test]
    fn test_key_kind_maps_code_to_basic() {
        assert_eq!(KeyKind::Code.record_kind(), RecordKind::Basic);
        assert_eq!(KeyKind::Refresh.record_kind(), RecordKind::Refresh);
    }
}
