//! Privileged command execution
//!
//! All kernel-state mutation goes through external commands (`ip`, `ethtool`,
//! `sysctl`). The [`CommandRunner`] trait is the seam that lets tests
//! substitute scripted output for real system commands.

use std::io;
use std::process::Command;

/// Result of running an external command: exit status plus combined
/// stdout+stderr, which is what gets surfaced in error messages.
#[derive(Clone, Debug)]
pub struct CommandOutput {
    pub success: bool,
    pub combined: String,
}

/// Blocking execution of an external command.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        (*self).run(program, args)
    }
}

/// Runs commands on the host, blocking until they exit. No internal timeout;
/// a caller wrapping this logic must impose its own deadline.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostCommandRunner;

impl CommandRunner for HostCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let output = Command::new(program).args(args).output()?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        Ok(CommandOutput {
            success: output.status.success(),
            combined,
        })
    }
}
