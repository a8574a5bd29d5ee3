use clap::{Args, Parser, Subcommand};

/// Command line of the plugin binary.
///
/// Every flag is optional; unset flags fall back to the `PLUGIN_*`
/// variables (and their `DOCKER_*` aliases) set by the CI runner.
#[derive(Parser, Debug)]
#[command(name = "drone-stack")]
#[command(about = "Deploy a Docker Swarm stack")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub args: DeployArgs,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print version, commit and build time
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DeployArgs {
    /// Docker host [env: PLUGIN_HOST]
    #[arg(long)]
    pub host: Option<String>,

    /// Connect using TLS [env: PLUGIN_TLS]
    #[arg(long)]
    pub tls: bool,

    /// Connect using TLS and verify the remote [env: PLUGIN_TLSVERIFY]
    #[arg(long)]
    pub tlsverify: bool,

    /// Compose file(s), comma separated or repeated [env: PLUGIN_COMPOSE]
    #[arg(long, value_delimiter = ',')]
    pub compose: Vec<String>,

    /// Stack name [env: PLUGIN_STACK_NAME]
    #[arg(long)]
    pub stack_name: Option<String>,

    /// Prune services that are no longer referenced [env: PLUGIN_PRUNE]
    #[arg(long)]
    pub prune: bool,

    /// Registry address [env: PLUGIN_REGISTRY, DOCKER_REGISTRY]
    #[arg(long)]
    pub registry: Option<String>,

    /// Registry username [env: PLUGIN_USERNAME, DOCKER_USERNAME]
    #[arg(long)]
    pub username: Option<String>,

    /// Registry password [env: PLUGIN_PASSWORD, DOCKER_PASSWORD]
    #[arg(long)]
    pub password: Option<String>,

    /// Registry email, legacy registries only [env: PLUGIN_EMAIL, DOCKER_EMAIL]
    #[arg(long)]
    pub email: Option<String>,

    /// CA certificate contents [env: PLUGIN_CACERT, DOCKER_CACERT]
    #[arg(long)]
    pub cacert: Option<String>,

    /// Client key contents [env: PLUGIN_KEY, DOCKER_KEY]
    #[arg(long)]
    pub key: Option<String>,

    /// Client certificate contents [env: PLUGIN_CERT, DOCKER_CERT]
    #[arg(long)]
    pub cert: Option<String>,

    /// SSH private key contents [env: PLUGIN_SSH_KEY, DOCKER_SSH_KEY]
    #[arg(long)]
    pub ssh_key: Option<String>,

    /// Validate and print the planned commands without executing
    /// [env: PLUGIN_DRY_RUN]
    #[arg(long)]
    pub dry_run: bool,

    /// Dotenv file loaded before resolving settings [env: PLUGIN_ENV_FILE]
    #[arg(long)]
    pub env_file: Option<String>,
}
