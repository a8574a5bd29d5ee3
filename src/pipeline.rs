use std::path::{Path, PathBuf};

use crate::certs::{self, TlsMaterial};
use crate::cmd::{self, EnvMap};
use crate::config::Settings;
use crate::docker::{self, DOCKER, Invocation};
use crate::error::{DeployError, DeployResult};
use crate::host::{SshTarget, Transport};
use crate::ssh;

/// Executes docker invocations. The pipeline only decides what to
/// run; a runner decides how.
pub trait Runner {
    /// Run a command with its output streamed to the operator.
    /// A non-zero exit is an error.
    fn run(&self, invocation: &Invocation, env: &EnvMap) -> DeployResult<()>;

    /// Run the registry login. `Ok(Err(text))` means docker ran and
    /// rejected the credentials; `text` is its error output.
    fn login(&self, invocation: &Invocation, env: &EnvMap) -> DeployResult<Result<(), String>>;
}

/// Spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run(&self, invocation: &Invocation, env: &EnvMap) -> DeployResult<()> {
        cmd::run_streamed(&invocation.program, &invocation.arg_refs(), env)
    }

    fn login(&self, invocation: &Invocation, env: &EnvMap) -> DeployResult<Result<(), String>> {
        cmd::run_collecting_stderr(&invocation.program, &invocation.arg_refs(), env)
    }
}

/// Files to write before docker is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Staging {
    Skip,
    Tls {
        dir: PathBuf,
        material: TlsMaterial,
    },
    Ssh {
        dir: PathBuf,
        target: SshTarget,
        key: Option<String>,
    },
}

impl Staging {
    pub fn apply(&self) -> DeployResult<()> {
        match self {
            Self::Skip => Ok(()),
            Self::Tls { dir, material } => {
                material.write_to(dir)?;
                eprintln!("TLS material staged in {}", dir.display());
                Ok(())
            }
            Self::Ssh { dir, target, key } => {
                ssh::stage(target, key.as_deref(), dir)?;
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn cert_dir(&self) -> Option<&Path> {
        match self {
            Self::Tls { dir, .. } => Some(dir),
            _ => None,
        }
    }
}

/// Everything a run will do, computed up front from the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub transport: Transport,
    pub staging: Staging,
    pub env: EnvMap,
    pub login: Option<Invocation>,
    /// `version`, `info` and `stack deploy`, in that order.
    pub commands: Vec<Invocation>,
}

/// Validate, stage credentials, log in, then deploy the stack.
///
/// Stages run strictly in order and the first failure ends the run:
/// validation, credential staging, registry login (skipped in guest
/// mode), `docker version`, `docker info`, `docker stack deploy`.
pub struct Pipeline {
    settings: Settings,
    docker: String,
    home: Option<PathBuf>,
}

impl Pipeline {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            docker: DOCKER.to_string(),
            home: None,
        }
    }

    /// Use a specific docker client binary.
    #[must_use]
    pub fn docker_bin(mut self, program: &str) -> Self {
        self.docker = program.to_string();
        self
    }

    /// Stage credentials under `dir` instead of `$HOME`.
    #[must_use]
    pub fn home(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home = Some(dir.into());
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run against the real docker client, or print the plan when
    /// dry run is enabled.
    pub fn run(&self) -> DeployResult<()> {
        if self.settings.dry_run {
            self.dry_run()
        } else {
            self.execute(&SystemRunner)
        }
    }

    /// Validate the settings and work out what a run would do.
    /// Reads the filesystem (to detect an existing SSH config) but
    /// never writes to it.
    pub fn plan(&self) -> DeployResult<Plan> {
        self.settings.validate()?;
        let transport = Transport::parse(&self.settings.host.uri)?;

        let staging = match &transport {
            Transport::Tcp(_) => match certs::plan(&self.settings.certs, &self.settings.host)? {
                Some(material) => Staging::Tls {
                    dir: self.home_dir()?.join(".docker").join("certs"),
                    material,
                },
                None => Staging::Skip,
            },
            Transport::Ssh(target) => {
                let dir = self.home_dir()?.join(".ssh");
                ssh::ensure_no_config(&dir)?;
                Staging::Ssh {
                    dir,
                    target: target.clone(),
                    key: self.settings.ssh_key.clone(),
                }
            }
            Transport::Local | Transport::Other(_) => Staging::Skip,
        };

        let env = transport.docker_env(&self.settings.host, staging.cert_dir());

        let login = (!self.settings.login.is_guest())
            .then(|| docker::login(&self.docker, &self.settings.login));
        let registry_auth = login.is_some();

        let commands = vec![
            docker::version(&self.docker),
            docker::info(&self.docker),
            docker::stack_deploy(&self.docker, &self.settings.deploy, registry_auth),
        ];

        Ok(Plan {
            transport,
            staging,
            env,
            login,
            commands,
        })
    }

    /// Run every stage through `runner`.
    pub fn execute(&self, runner: &impl Runner) -> DeployResult<()> {
        let plan = self.plan()?;

        plan.staging.apply()?;

        if let Some(login) = &plan.login {
            println!("+ {login}");
            runner
                .login(login, &plan.env)?
                .map_err(DeployError::Authentication)?;
        } else {
            println!("Registry credentials not provided. Guest mode enabled.");
        }

        for command in &plan.commands {
            println!("+ {command}");
            runner.run(command, &plan.env)?;
        }

        Ok(())
    }

    fn dry_run(&self) -> DeployResult<()> {
        let plan = self.plan()?;

        println!("=== Dry run: no changes will be made ===");
        println!();

        match &plan.staging {
            Staging::Skip => println!("No credentials to stage"),
            Staging::Tls { dir, material } => {
                println!("Would write TLS material to {}:", dir.display());
                if material.client.is_some() {
                    println!("  key.pem, cert.pem");
                }
                if material.ca.is_some() {
                    println!("  ca.pem");
                }
            }
            Staging::Ssh { dir, target, key } => {
                let identity = key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
                    .map(|_| dir.join("key.pem"));
                println!("Would write SSH config to {}:", dir.join("config").display());
                println!();
                print!("{}", ssh::render_config(target, identity.as_deref()));
            }
        }
        println!();

        println!("--- Environment ---");
        for (key, value) in &plan.env {
            println!("{key}={value}");
        }

        println!("--- Commands ---");
        match &plan.login {
            Some(login) => println!("+ {login}"),
            None => println!("(guest mode, no registry login)"),
        }
        for command in &plan.commands {
            println!("+ {command}");
        }

        Ok(())
    }

    fn home_dir(&self) -> DeployResult<PathBuf> {
        if let Some(home) = &self.home {
            return Ok(home.clone());
        }
        std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from)
            .ok_or_else(|| DeployError::EnvMissing("HOME".into()))
    }
}
