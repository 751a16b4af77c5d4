//! Process configuration.
//!
//! Every setting is read once at startup, from a flag or its environment
//! variable. Required settings that are missing or blank abort startup with a
//! diagnostic naming each of them.

use anyhow::bail;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_ROLES_CLAIM: &str = "https://drdp.app/roles";

/// DRDP assessment sidecar
#[derive(Parser, Debug)]
#[command(name = "drdpd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQLite database file
    #[arg(long, env = "DRDP_DATABASE_PATH", global = true)]
    pub database: Option<PathBuf>,

    /// Identity provider issuer (domain) expected in forwarded claims
    #[arg(long, env = "DRDP_IDENTITY_ISSUER", global = true)]
    pub identity_issuer: Option<String>,

    /// Identity provider client id expected as the claims audience
    #[arg(long, env = "DRDP_IDENTITY_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// Name of the custom claim carrying the user's role array
    #[arg(long, env = "DRDP_ROLES_CLAIM", global = true, default_value = DEFAULT_ROLES_CLAIM)]
    pub roles_claim: String,

    /// Log filter (e.g. "info", "drdpd=debug")
    #[arg(long, env = "DRDP_LOG", global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Serve JSON-line requests on stdin/stdout (default)
    Serve,

    /// Replace the database with the contents of a backup bundle
    Restore {
        /// Bundle produced by `backup.export`
        #[arg(long)]
        bundle: PathBuf,
    },
}

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub issuer: String,
    pub client_id: String,
    pub roles_claim: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub identity: IdentityConfig,
    pub log_level: String,
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl Config {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let database = cli
            .database
            .clone()
            .filter(|p| !p.as_os_str().is_empty());
        let issuer = non_blank(cli.identity_issuer.clone());
        let client_id = non_blank(cli.client_id.clone());

        let mut missing = Vec::new();
        if database.is_none() {
            missing.push("DRDP_DATABASE_PATH (--database)");
        }
        if issuer.is_none() {
            missing.push("DRDP_IDENTITY_ISSUER (--identity-issuer)");
        }
        if client_id.is_none() {
            missing.push("DRDP_IDENTITY_CLIENT_ID (--client-id)");
        }
        let (Some(database_path), Some(issuer), Some(client_id)) = (database, issuer, client_id)
        else {
            bail!("missing required configuration: {}", missing.join(", "));
        };

        let roles_claim = non_blank(Some(cli.roles_claim.clone()))
            .unwrap_or_else(|| DEFAULT_ROLES_CLAIM.to_string());

        Ok(Self {
            database_path,
            identity: IdentityConfig {
                issuer,
                client_id,
                roles_claim,
            },
            log_level: cli.log_level.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["drdpd"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).expect("parse args")
    }

    #[test]
    fn complete_flags_build_config() {
        let c = Config::from_cli(&cli(&[
            "--database",
            "/tmp/drdp.sqlite3",
            "--identity-issuer",
            "https://id.example.org/",
            "--client-id",
            "abc123",
        ]))
        .expect("config");
        assert_eq!(c.database_path, PathBuf::from("/tmp/drdp.sqlite3"));
        assert_eq!(c.identity.issuer, "https://id.example.org/");
        assert_eq!(c.identity.roles_claim, DEFAULT_ROLES_CLAIM);
        assert_eq!(c.log_level, "info");
    }

    #[test]
    fn log_level_flag_reaches_config() {
        let c = Config::from_cli(&cli(&[
            "--database",
            "/tmp/drdp.sqlite3",
            "--identity-issuer",
            "https://id.example.org/",
            "--client-id",
            "abc123",
            "--log-level",
            "drdpd=debug",
        ]))
        .expect("config");
        assert_eq!(c.log_level, "drdpd=debug");
    }

    #[test]
    fn blank_required_values_are_reported_together() {
        let parsed = Cli {
            database: None,
            identity_issuer: Some("   ".into()),
            client_id: Some("abc".into()),
            roles_claim: DEFAULT_ROLES_CLAIM.into(),
            log_level: "info".into(),
            command: None,
        };
        let e = Config::from_cli(&parsed).expect_err("must fail");
        let msg = e.to_string();
        assert!(msg.contains("DRDP_DATABASE_PATH"), "{}", msg);
        assert!(msg.contains("DRDP_IDENTITY_ISSUER"), "{}", msg);
        assert!(!msg.contains("DRDP_IDENTITY_CLIENT_ID"), "{}", msg);
    }

    #[test]
    fn restore_subcommand_parses() {
        let parsed = cli(&["restore", "--bundle", "/tmp/b.zip"]);
        assert_eq!(
            parsed.command,
            Some(Command::Restore {
                bundle: PathBuf::from("/tmp/b.zip")
            })
        );
    }
}
