//! Subprocess execution and command templating for providers.
//!
//! All session-native operations go through `sh -c` so user-supplied command
//! templates can use shell syntax. A non-zero exit propagates as
//! [`WshError::Provider`] with the command's output attached.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{Result, WshError};

/// Run a shell command and return its stdout.
pub fn run_cmd(cmd: &str) -> Result<String> {
    debug!(command = %cmd, "running command");

    let output = Command::new("sh").arg("-c").arg(cmd).output()?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        let mut combined = stderr.trim().to_string();
        if combined.is_empty() {
            combined = stdout.trim().to_string();
        }
        return Err(WshError::Provider {
            command: cmd.to_string(),
            output: combined,
        });
    }

    if !stderr.trim().is_empty() {
        warn!(command = %cmd, stderr = %stderr.trim(), "command wrote to stderr");
    }

    Ok(stdout)
}

/// Expand `{{path}}` and `{{display}}` placeholders in a command template.
pub fn expand_template(template: &str, path: &str, display: &str) -> String {
    template
        .replace("{{path}}", path)
        .replace("{{display}}", display)
}

/// True if `name` resolves to an executable on `PATH`.
pub fn command_exists(name: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| {
        let candidate = dir.join(name);
        candidate.is_file() && is_executable(&candidate)
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    true
}

/// Pick the first template from `candidates` whose executable is available,
/// expanded with `path` and `display`.
pub fn first_available(candidates: &[&str], path: &str, display: &str) -> Result<String> {
    for template in candidates {
        let program = template.split_whitespace().next().unwrap_or_default();
        if command_exists(program) {
            return Ok(expand_template(template, path, display));
        }
    }

    Err(WshError::NoCommand {
        purpose: "set wallpaper".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_cmd_captures_stdout() {
        let out = run_cmd("printf hello").unwrap();
        assert_eq!(out, "hello");
    }

    #[test]
    fn test_run_cmd_failure_carries_output() {
        let err = run_cmd("printf oops >&2; exit 3").unwrap_err();
        match err {
            WshError::Provider { output, .. } => assert_eq!(output, "oops"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_expand_template() {
        let cmd = expand_template(
            "swww img '{{path}}' --outputs '{{display}}'",
            "/walls/a.jpg",
            "eDP-1",
        );
        assert_eq!(cmd, "swww img '/walls/a.jpg' --outputs 'eDP-1'");
    }

    #[test]
    fn test_command_exists() {
        assert!(command_exists("sh"));
        assert!(!command_exists("wallshift-no-such-binary"));
    }

    #[test]
    fn test_first_available_skips_missing() {
        let cmd = first_available(
            &["wallshift-no-such-binary '{{path}}'", "sh -c 'true # {{path}}'"],
            "/a.jpg",
            "0",
        )
        .unwrap();
        assert!(cmd.starts_with("sh "));
        assert!(cmd.contains("/a.jpg"));
    }

    #[test]
    fn test_first_available_exhausted() {
        let err = first_available(&["wallshift-no-such-binary"], "/a.jpg", "0").unwrap_err();
        assert!(matches!(err, WshError::NoCommand { .. }));
    }
}
