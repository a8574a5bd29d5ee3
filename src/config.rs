use std::collections::HashMap;
use std::path::Path;

use crate::cli::DeployArgs;
use crate::error::{DeployError, DeployResult};

pub const DEFAULT_REGISTRY: &str = "https://index.docker.io/v1/";
pub const DEFAULT_COMPOSE: &str = "docker-compose.yml";

/// Registry credentials. A missing password means guest mode:
/// no login is attempted and registry auth is not forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Login {
    pub registry: String,
    pub username: String,
    pub password: Option<String>,
    pub email: Option<String>,
}

impl Login {
    #[must_use]
    pub fn guest() -> Self {
        Self {
            registry: DEFAULT_REGISTRY.to_string(),
            username: String::new(),
            password: None,
            email: None,
        }
    }

    #[must_use]
    pub fn registry(mut self, registry: &str) -> Self {
        self.registry = registry.to_string();
        self
    }

    #[must_use]
    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        self.username = username.to_string();
        self.password = Some(password.to_string());
        self
    }

    #[must_use]
    pub fn email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    #[must_use]
    pub const fn is_guest(&self) -> bool {
        self.password.is_none()
    }
}

impl Default for Login {
    fn default() -> Self {
        Self::guest()
    }
}

/// Docker engine to talk to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Host {
    /// e.g. `tcp://example.com:2376` or `ssh://deploy@example.com`
    pub uri: String,
    /// Authenticate the server against the default CA pool.
    pub tls: bool,
    /// Authenticate the server against the supplied CA.
    pub tls_verify: bool,
}

impl Host {
    #[must_use]
    pub fn new(uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            tls: false,
            tls_verify: false,
        }
    }

    #[must_use]
    pub const fn tls(mut self) -> Self {
        self.tls = true;
        self
    }

    #[must_use]
    pub const fn tls_verify(mut self) -> Self {
        self.tls_verify = true;
        self
    }

    #[must_use]
    pub const fn wants_tls(&self) -> bool {
        self.tls || self.tls_verify
    }
}

/// What to deploy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deploy {
    pub name: String,
    pub compose: Vec<String>,
    pub prune: bool,
}

impl Deploy {
    /// A deploy of `name` from the default compose file.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            compose: vec![DEFAULT_COMPOSE.to_string()],
            prune: false,
        }
    }

    /// Replace the compose file list.
    #[must_use]
    pub fn compose<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compose = files.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub const fn prune(mut self) -> Self {
        self.prune = true;
        self
    }
}

/// TLS client material. Each value is either PEM text or its
/// base64 encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Certs {
    pub key: Option<String>,
    pub cert: Option<String>,
    pub ca: Option<String>,
}

/// Everything the plugin needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub login: Login,
    pub host: Host,
    pub deploy: Deploy,
    pub certs: Certs,
    pub ssh_key: Option<String>,
    pub dry_run: bool,
}

impl Settings {
    #[must_use]
    pub fn new(deploy: Deploy) -> Self {
        Self {
            login: Login::guest(),
            host: Host::default(),
            deploy,
            certs: Certs::default(),
            ssh_key: None,
            dry_run: false,
        }
    }

    /// Resolve settings from parsed flags and an environment
    /// snapshot. Flags win over `PLUGIN_*` variables, which win
    /// over their `DOCKER_*` aliases.
    pub fn resolve(args: &DeployArgs, env: &EnvSource) -> DeployResult<Self> {
        let pick = |flag: &Option<String>, names: &[&str]| -> Option<String> {
            flag.as_deref()
                .filter(|v| !v.is_empty())
                .or_else(|| env.get(names))
                .map(ToString::to_string)
        };

        let compose = if args.compose.is_empty() {
            env.get(&["PLUGIN_COMPOSE"])
                .map_or_else(|| vec![DEFAULT_COMPOSE.to_string()], split_list)
        } else {
            args.compose.clone()
        };

        Ok(Self {
            login: Login {
                registry: pick(&args.registry, &["PLUGIN_REGISTRY", "DOCKER_REGISTRY"])
                    .unwrap_or_else(|| DEFAULT_REGISTRY.to_string()),
                username: pick(&args.username, &["PLUGIN_USERNAME", "DOCKER_USERNAME"])
                    .unwrap_or_default(),
                password: pick(&args.password, &["PLUGIN_PASSWORD", "DOCKER_PASSWORD"]),
                email: pick(&args.email, &["PLUGIN_EMAIL", "DOCKER_EMAIL"]),
            },
            host: Host {
                uri: pick(&args.host, &["PLUGIN_HOST"]).unwrap_or_default(),
                tls: args.tls || env.flag("PLUGIN_TLS")?,
                tls_verify: args.tlsverify || env.flag("PLUGIN_TLSVERIFY")?,
            },
            deploy: Deploy {
                name: pick(&args.stack_name, &["PLUGIN_STACK_NAME"]).unwrap_or_default(),
                compose,
                prune: args.prune || env.flag("PLUGIN_PRUNE")?,
            },
            certs: Certs {
                key: pick(&args.key, &["PLUGIN_KEY", "DOCKER_KEY"]),
                cert: pick(&args.cert, &["PLUGIN_CERT", "DOCKER_CERT"]),
                ca: pick(&args.cacert, &["PLUGIN_CACERT", "DOCKER_CACERT"]),
            },
            ssh_key: pick(&args.ssh_key, &["PLUGIN_SSH_KEY", "DOCKER_SSH_KEY"]),
            dry_run: args.dry_run || env.flag("PLUGIN_DRY_RUN")?,
        })
    }

    /// Check the invariants that must hold before anything touches
    /// the filesystem or spawns a process.
    pub fn validate(&self) -> DeployResult<()> {
        if self.deploy.name.trim().is_empty() {
            return Err(DeployError::Configuration(
                "docker stack name must be present".into(),
            ));
        }
        if self.deploy.compose.is_empty() {
            return Err(DeployError::Configuration(
                "at least one compose file is required".into(),
            ));
        }
        if self.deploy.compose.iter().any(|c| c.trim().is_empty()) {
            return Err(DeployError::Configuration(
                "compose file paths must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Load settings the way the binary does: snapshot the process
/// environment, layer the optional env file underneath it, then
/// resolve. The env file is named by `--env-file` or
/// `PLUGIN_ENV_FILE`.
pub fn load(args: &DeployArgs) -> DeployResult<Settings> {
    let mut env = EnvSource::from_process();

    let env_file = args
        .env_file
        .clone()
        .or_else(|| env.get(&["PLUGIN_ENV_FILE"]).map(ToString::to_string));
    if let Some(path) = env_file {
        let added = env.merge_env_file(Path::new(&path))?;
        eprintln!("Loaded {added} variable(s) from {path}");
    }

    Settings::resolve(args, &env)
}

/// Read-only view over environment variables.
///
/// Process variables and env-file entries are kept apart: a lookup
/// tries every name against the process environment before it
/// consults the file. Empty values are treated as unset, matching
/// how CI systems export unset plugin settings.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    vars: HashMap<String, String>,
    file_vars: HashMap<String, String>,
}

impl EnvSource {
    /// Snapshot of the current process environment. Non-UTF-8
    /// entries are skipped.
    #[must_use]
    pub fn from_process() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self {
            vars,
            file_vars: HashMap::new(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            file_vars: HashMap::new(),
        }
    }

    /// Add the entries of a dotenv file as a lower layer. The first
    /// file to define a key wins. Returns how many entries are not
    /// shadowed by the process environment.
    pub fn merge_env_file(&mut self, path: &Path) -> DeployResult<usize> {
        let iter = dotenv::from_path_iter(path).map_err(|e| {
            DeployError::Configuration(format!("cannot read env file {}: {e}", path.display()))
        })?;

        let mut added = 0;
        for item in iter {
            let (key, value) = item.map_err(|e| {
                DeployError::Configuration(format!("invalid env file {}: {e}", path.display()))
            })?;
            if lookup(&self.vars, &key).is_none() {
                added += 1;
            }
            self.file_vars.entry(key).or_insert(value);
        }
        Ok(added)
    }

    /// First non-empty value among `names` in the process
    /// environment, then among `names` in the env file.
    #[must_use]
    pub fn get(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .find_map(|name| lookup(&self.vars, name))
            .or_else(|| names.iter().find_map(|name| lookup(&self.file_vars, name)))
    }

    /// Boolean variable; unset or empty is `false`.
    pub fn flag(&self, name: &str) -> DeployResult<bool> {
        self.get(&[name]).map_or(Ok(false), |v| parse_bool(name, v))
    }
}

/// Parse a boolean setting. Accepts the spellings CI systems
/// commonly emit.
pub fn parse_bool(name: &str, value: &str) -> DeployResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        other => Err(DeployError::Configuration(format!(
            "{name}: expected a boolean, got '{other}'"
        ))),
    }
}

fn lookup<'a>(vars: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    vars.get(name).map(String::as_str).filter(|v| !v.is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
