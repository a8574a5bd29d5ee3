use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::{DeployError, DeployResult};

/// Extra environment variables handed to a child process on top
/// of the inherited environment.
pub type EnvMap = BTreeMap<String, String>;

/// Run a command with stdout/stderr inherited so its output
/// streams straight to the operator. Fails if the command returns
/// a non-zero exit code.
pub fn run_streamed(program: &str, args: &[&str], env: &EnvMap) -> DeployResult<()> {
    let status = command(program, args, env)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| not_found_or_io(program, e))?;

    check(program, args, status)
}

/// Run a command with stdout inherited and stderr forwarded to our
/// own stderr while being collected. On failure the collected text
/// is returned as the error payload.
///
/// The outer error is the spawn failure; the inner one carries the
/// stderr text of a command that ran but exited non-zero.
pub fn run_collecting_stderr(
    program: &str,
    args: &[&str],
    env: &EnvMap,
) -> DeployResult<Result<(), String>> {
    let mut child = command(program, args, env)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| not_found_or_io(program, e))?;

    let mut collected = Vec::new();
    let forwarded = child
        .stderr
        .take()
        .map_or(Ok(()), |stderr| tee(stderr, &mut collected));

    // Reap the child even when forwarding failed.
    let status = child.wait()?;
    forwarded?;
    if status.success() {
        Ok(Ok(()))
    } else {
        let text = String::from_utf8_lossy(&collected).trim().to_string();
        if text.is_empty() {
            Ok(Err(format!("{program} exited with {status}")))
        } else {
            Ok(Err(text))
        }
    }
}

/// Join a program and its arguments the way a shell trace shows
/// them.
#[must_use]
pub fn format_command(program: &str, args: &[&str]) -> String {
    let mut parts = vec![program.to_string()];
    parts.extend(args.iter().map(|a| (*a).to_string()));
    parts.join(" ")
}

fn tee(mut from: impl Read, collected: &mut Vec<u8>) -> std::io::Result<()> {
    let mut buf = [0u8; 4096];
    let mut sink = std::io::stderr();
    loop {
        let n = from.read(&mut buf)?;
        if n == 0 {
            return Ok(());
        }
        sink.write_all(&buf[..n])?;
        collected.extend_from_slice(&buf[..n]);
    }
}

fn command(program: &str, args: &[&str], env: &EnvMap) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args).envs(env);
    cmd
}

fn check(program: &str, args: &[&str], status: ExitStatus) -> DeployResult<()> {
    if status.success() {
        Ok(())
    } else {
        Err(DeployError::CommandFailed {
            command: format_command(program, args),
            code: status.code(),
        })
    }
}

fn not_found_or_io(program: &str, e: std::io::Error) -> DeployError {
    if e.kind() == std::io::ErrorKind::NotFound {
        DeployError::CommandNotFound(program.to_string())
    } else {
        DeployError::Io(e)
    }
}
