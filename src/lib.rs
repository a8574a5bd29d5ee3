//! Deploy a Docker Swarm stack from a CI pipeline.
//!
//! `drone-stack` turns plugin settings into a `docker stack deploy`
//! run against a remote engine. It logs in to the registry, stages
//! whatever the docker client needs to reach the engine (TLS client
//! material or an SSH key and host alias), then runs `docker
//! version`, `docker info` and `docker stack deploy` in order.
//!
//! # Overview
//!
//! - [`Settings`] is resolved once from flags, `PLUGIN_*` variables
//!   and an optional env file (see [`config::load`]).
//! - [`Transport`] classifies the host URI: local socket, `tcp://`,
//!   `ssh://`, or anything else passed through to `DOCKER_HOST`.
//! - [`certs`] and [`ssh`] validate and write credentials.
//! - [`docker`] builds the argument vectors.
//! - [`Pipeline`] runs the stages through a
//!   [`Runner`](pipeline::Runner).
//!
//! # Example
//!
//! ```rust,no_run
//! use drone_stack::{Deploy, Host, Login, Pipeline, Settings};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut settings = Settings::new(
//!         Deploy::new("app")
//!             .compose(["docker-compose.yml", "docker-compose.prod.yml"])
//!             .prune(),
//!     );
//!     settings.host = Host::new("ssh://deploy@swarm.example.com:2222");
//!     settings.login = Login::guest().credentials("ci", "secret");
//!
//!     Pipeline::new(settings).run()?;
//!     Ok(())
//! }
//! ```
//!
//! The docker client never sees a mutated process environment: each
//! invocation gets `DOCKER_HOST`, `DOCKER_CERT_PATH` and
//! `DOCKER_TLS`/`DOCKER_TLS_VERIFY` through an explicit map.

// Allow noisy pedantic lints that don't add value for a
// deployment tool crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod certs;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod docker;
pub mod error;
pub mod files;
pub mod host;
pub mod pipeline;
pub mod ssh;
pub mod version;

pub use config::{Certs, Deploy, Host, Login, Settings};
pub use error::{DeployError, DeployResult};
pub use host::Transport;
pub use pipeline::Pipeline;
pub use version::BuildInfo;
