//! Tests for CLI argument parsing

use super::*;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;

#[test]
fn test_cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn test_parse_check_with_global_flags() {
    let cli = Cli::try_parse_from(["idm-bulk", "check", "-C", "prod.yaml", "-v"]).unwrap();
    assert_eq!(cli.config, PathBuf::from("prod.yaml"));
    assert!(cli.verbose);
    assert!(matches!(cli.command, Commands::Check));
}

#[test]
fn test_default_config_path() {
    let cli = Cli::try_parse_from(["idm-bulk", "check"]).unwrap();
    assert_eq!(cli.config, PathBuf::from("idm-bulk.yaml"));
    assert!(!cli.verbose);
}

#[test]
fn test_parse_delete_modes() {
    let cli = Cli::try_parse_from(["idm-bulk", "delete", "all"]).unwrap();
    assert!(matches!(cli.command, Commands::Delete { mode: DeleteMode::All }));

    let cli = Cli::try_parse_from(["idm-bulk", "delete", "group", "--group-id", "g-1"]).unwrap();
    match cli.command {
        Commands::Delete { mode } => {
            assert_eq!(mode.list_filter().as_deref(), Some(r#"memberOfGroups[id eq "g-1"]"#));
        }
        other => panic!("unexpected command: {other:?}"),
    }

    let cli = Cli::try_parse_from([
        "idm-bulk",
        "delete",
        "inactive",
        "--days",
        "90",
        "--include-never-signed-on",
    ])
    .unwrap();
    match cli.command {
        Commands::Delete { mode } => {
            assert_eq!(
                mode,
                DeleteMode::Inactive {
                    days: 90,
                    include_never_signed_on: true
                }
            );
            assert!(mode.list_filter().is_none());
        }
        other => panic!("unexpected command: {other:?}"),
    }

    let cli = Cli::try_parse_from(["idm-bulk", "delete", "unverified", "--days", "30"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Delete {
            mode: DeleteMode::Unverified { days: 30 }
        }
    ));
}

#[test]
fn test_delete_inactive_requires_days() {
    assert!(Cli::try_parse_from(["idm-bulk", "delete", "inactive"]).is_err());
    assert!(Cli::try_parse_from(["idm-bulk", "delete", "unverified", "--days", "-3"]).is_err());
}

#[test]
fn test_parse_import() {
    let cli = Cli::try_parse_from([
        "idm-bulk",
        "-C",
        "run.yaml",
        "import",
        "--csv",
        "users.csv",
        "--skip-preflight",
    ])
    .unwrap();

    match cli.command {
        Commands::Import {
            csv,
            skip_preflight,
        } => {
            assert_eq!(csv, Some(PathBuf::from("users.csv")));
            assert!(skip_preflight);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
