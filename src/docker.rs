use std::fmt;

use crate::config::{Deploy, Login};

/// Default docker client, resolved on `PATH`.
pub const DOCKER: &str = "docker";

const MASK: &str = "********";

/// A program and its arguments, ready to hand to a
/// [`Runner`](crate::pipeline::Runner).
///
/// `Display` renders the command line for trace output with secret
/// arguments masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    secret: Option<usize>,
}

impl Invocation {
    #[must_use]
    pub fn new(program: &str, args: Vec<String>) -> Self {
        Self {
            program: program.to_string(),
            args,
            secret: None,
        }
    }

    #[must_use]
    pub fn arg_refs(&self) -> Vec<&str> {
        self.args.iter().map(String::as_str).collect()
    }

    /// The first argument, naming the docker subcommand.
    #[must_use]
    pub fn subcommand(&self) -> &str {
        self.args.first().map_or("", String::as_str)
    }

    const fn with_secret(mut self, index: usize) -> Self {
        self.secret = Some(index);
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for (i, arg) in self.args.iter().enumerate() {
            if self.secret == Some(i) {
                write!(f, " {MASK}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// `docker login -u <user> -p <password> [-e <email>] <registry>`.
/// The email flag is only understood by legacy registries and is
/// left out unless one was given.
#[must_use]
pub fn login(program: &str, login: &Login) -> Invocation {
    let mut args = vec![
        "login".to_string(),
        "-u".to_string(),
        login.username.clone(),
        "-p".to_string(),
        login.password.clone().unwrap_or_default(),
    ];
    if let Some(email) = login.email.as_deref().filter(|e| !e.is_empty()) {
        args.push("-e".to_string());
        args.push(email.to_string());
    }
    args.push(login.registry.clone());

    Invocation::new(program, args).with_secret(4)
}

#[must_use]
pub fn version(program: &str) -> Invocation {
    Invocation::new(program, vec!["version".to_string()])
}

#[must_use]
pub fn info(program: &str) -> Invocation {
    Invocation::new(program, vec!["info".to_string()])
}

/// `docker stack deploy`, see [`stack_deploy_args`].
#[must_use]
pub fn stack_deploy(program: &str, deploy: &Deploy, registry_auth: bool) -> Invocation {
    Invocation::new(program, stack_deploy_args(deploy, registry_auth))
}

/// `stack deploy <name> [-c <compose>]... [--prune]
/// [--with-registry-auth]`
#[must_use]
pub fn stack_deploy_args(deploy: &Deploy, registry_auth: bool) -> Vec<String> {
    let mut args = vec![
        "stack".to_string(),
        "deploy".to_string(),
        deploy.name.clone(),
    ];

    for compose in &deploy.compose {
        args.push("-c".to_string());
        args.push(compose.clone());
    }

    if deploy.prune {
        args.push("--prune".to_string());
    }

    if registry_auth {
        args.push("--with-registry-auth".to_string());
    }

    args
}
