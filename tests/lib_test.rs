//! Library integration tests.

use reposwarm::SwarmError;

#[test]
fn error_types_are_public() {
    let err = SwarmError::PrerequisitesMissing {
        missing: vec!["docker".into()],
    };
    assert!(err.to_string().contains("docker"));
}

#[test]
fn result_type_alias_is_public() {
    fn test_fn() -> reposwarm::Result<()> {
        Ok(())
    }
    assert!(test_fn().is_ok());
}

#[test]
fn cli_types_are_public() {
    use clap::Parser;
    use reposwarm::cli::{Cli, Commands};

    let cli = Cli::parse_from(["reposwarm", "doctor", "--json"]);

    if let Commands::Doctor(args) = cli.command {
        assert!(args.json);
    } else {
        panic!("Expected Doctor command");
    }
}

#[test]
fn step_errors_name_the_step() {
    let err = SwarmError::BuildFailed {
        service: "api".into(),
        message: "tsc exited with 2".into(),
    }
    .in_step("api");
    assert_eq!(err.to_string(), "api: api: build failed: tsc exited with 2");
    assert!(matches!(err.root(), SwarmError::BuildFailed { .. }));
}
