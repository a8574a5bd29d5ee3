use std::io::Write;

use clap::Parser;
use drone_stack::cli::{Cli, Command, DeployArgs};
use drone_stack::config::{DEFAULT_COMPOSE, DEFAULT_REGISTRY, EnvSource, parse_bool};
use drone_stack::error::DeployError;
use drone_stack::{Deploy, Settings};

fn resolve(pairs: &[(&str, &str)]) -> Settings {
    let env = EnvSource::from_pairs(pairs.iter().copied());
    Settings::resolve(&DeployArgs::default(), &env).unwrap()
}

#[test]
fn defaults() {
    let settings = resolve(&[]);

    assert_eq!(settings.login.registry, DEFAULT_REGISTRY);
    assert!(settings.login.is_guest());
    assert_eq!(settings.deploy.compose, vec![DEFAULT_COMPOSE]);
    assert!(settings.deploy.name.is_empty());
    assert!(!settings.deploy.prune);
    assert!(settings.host.uri.is_empty());
    assert!(!settings.host.tls);
    assert!(!settings.host.tls_verify);
    assert!(!settings.dry_run);
}

#[test]
fn plugin_variables() {
    let settings = resolve(&[
        ("PLUGIN_HOST", "tcp://swarm:2376"),
        ("PLUGIN_TLSVERIFY", "true"),
        ("PLUGIN_COMPOSE", "a.yml, b.yml"),
        ("PLUGIN_STACK_NAME", "app"),
        ("PLUGIN_PRUNE", "1"),
        ("PLUGIN_USERNAME", "ci"),
        ("PLUGIN_PASSWORD", "secret"),
        ("PLUGIN_CACERT", "ca"),
    ]);

    assert_eq!(settings.host.uri, "tcp://swarm:2376");
    assert!(settings.host.tls_verify);
    assert_eq!(settings.deploy.compose, vec!["a.yml", "b.yml"]);
    assert_eq!(settings.deploy.name, "app");
    assert!(settings.deploy.prune);
    assert_eq!(settings.login.username, "ci");
    assert_eq!(settings.login.password.as_deref(), Some("secret"));
    assert_eq!(settings.certs.ca.as_deref(), Some("ca"));
}

#[test]
fn plugin_variable_beats_docker_alias() {
    let settings = resolve(&[
        ("PLUGIN_USERNAME", "plugin-user"),
        ("DOCKER_USERNAME", "docker-user"),
        ("DOCKER_PASSWORD", "docker-pass"),
    ]);

    assert_eq!(settings.login.username, "plugin-user");
    assert_eq!(settings.login.password.as_deref(), Some("docker-pass"));
}

#[test]
fn empty_variable_falls_through_to_alias() {
    let settings = resolve(&[("PLUGIN_REGISTRY", ""), ("DOCKER_REGISTRY", "ghcr.io")]);

    assert_eq!(settings.login.registry, "ghcr.io");
}

#[test]
fn empty_password_is_guest() {
    let settings = resolve(&[("PLUGIN_USERNAME", "ci"), ("PLUGIN_PASSWORD", "")]);

    assert!(settings.login.is_guest());
}

#[test]
fn flags_win_over_environment() {
    let cli = Cli::try_parse_from([
        "drone-stack",
        "--stack-name",
        "from-flag",
        "--compose",
        "x.yml,y.yml",
        "--prune",
    ])
    .unwrap();
    let env = EnvSource::from_pairs([
        ("PLUGIN_STACK_NAME", "from-env"),
        ("PLUGIN_COMPOSE", "z.yml"),
    ]);

    let settings = Settings::resolve(&cli.args, &env).unwrap();

    assert_eq!(settings.deploy.name, "from-flag");
    assert_eq!(settings.deploy.compose, vec!["x.yml", "y.yml"]);
    assert!(settings.deploy.prune);
}

#[test]
fn version_subcommand_parses() {
    let cli = Cli::try_parse_from(["drone-stack", "version"]).unwrap();

    assert_eq!(cli.command, Some(Command::Version));
}

#[test]
fn invalid_boolean_is_rejected() {
    let env = EnvSource::from_pairs([("PLUGIN_TLS", "maybe")]);

    let err = Settings::resolve(&DeployArgs::default(), &env).unwrap_err();

    assert!(matches!(err, DeployError::Configuration(_)));
    assert!(err.to_string().contains("PLUGIN_TLS"));
}

#[test]
fn boolean_spellings() {
    for v in ["true", "TRUE", "1", "yes", "on"] {
        assert!(parse_bool("X", v).unwrap(), "{v}");
    }
    for v in ["", "false", "False", "0", "no", "off"] {
        assert!(!parse_bool("X", v).unwrap(), "{v}");
    }
}

#[test]
fn validate_requires_stack_name() {
    let settings = Settings::new(Deploy::new("  "));

    let err = settings.validate().unwrap_err();

    assert!(matches!(err, DeployError::Configuration(_)));
    assert_eq!(
        err.to_string(),
        "configuration error: docker stack name must be present"
    );
}

#[test]
fn validate_requires_compose_file() {
    let settings = Settings::new(Deploy::new("app").compose(Vec::<String>::new()));

    assert!(matches!(
        settings.validate(),
        Err(DeployError::Configuration(_))
    ));
}

#[test]
fn env_file_fills_gaps_without_overriding() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "PLUGIN_STACK_NAME=from-file").unwrap();
    writeln!(file, "PLUGIN_HOST=ssh://deploy@swarm").unwrap();
    file.flush().unwrap();

    let mut env = EnvSource::from_pairs([("PLUGIN_STACK_NAME", "from-process")]);
    let added = env.merge_env_file(file.path()).unwrap();

    assert_eq!(added, 1);
    assert_eq!(env.get(&["PLUGIN_STACK_NAME"]), Some("from-process"));
    assert_eq!(env.get(&["PLUGIN_HOST"]), Some("ssh://deploy@swarm"));
}

#[test]
fn missing_env_file_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut env = EnvSource::default();

    let err = env
        .merge_env_file(&dir.path().join("missing.env"))
        .unwrap_err();

    assert!(matches!(err, DeployError::Configuration(_)));
}

#[test]
fn process_alias_beats_env_file_primary() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "PLUGIN_USERNAME=from-file").unwrap();
    file.flush().unwrap();

    let mut env = EnvSource::from_pairs([("DOCKER_USERNAME", "from-process")]);
    let added = env.merge_env_file(file.path()).unwrap();
    let settings = Settings::resolve(&DeployArgs::default(), &env).unwrap();

    assert_eq!(added, 1);
    assert_eq!(settings.login.username, "from-process");
}

#[test]
fn first_env_file_entry_wins() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "PLUGIN_STACK_NAME=first").unwrap();
    writeln!(file, "PLUGIN_STACK_NAME=second").unwrap();
    file.flush().unwrap();

    let mut env = EnvSource::default();
    env.merge_env_file(file.path()).unwrap();

    assert_eq!(env.get(&["PLUGIN_STACK_NAME"]), Some("first"));
}

#[test]
fn load_reads_env_file_flag() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "PLUGIN_STACK_NAME=from-env-file").unwrap();
    writeln!(file, "PLUGIN_COMPOSE=one.yml,two.yml").unwrap();
    file.flush().unwrap();

    let args = DeployArgs {
        env_file: Some(file.path().display().to_string()),
        ..DeployArgs::default()
    };
    let settings = drone_stack::config::load(&args).unwrap();

    assert_eq!(settings.deploy.name, "from-env-file");
    assert_eq!(settings.deploy.compose, vec!["one.yml", "two.yml"]);
}
