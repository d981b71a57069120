//! Python execution in a child interpreter process.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;

use snippetlab_core::Language;

use crate::config::SandboxConfig;
use crate::error::SandboxError;
use crate::sandbox::{Sandbox, SandboxVerdict};

/// Message recorded for a run whose assertions all held.
pub const SUCCESS_MESSAGE: &str = "Code Executed Successfully";

/// Runs Python snippets with a separate interpreter in a scratch directory.
///
/// The test code becomes the body of a `test_code()` function that is
/// called after the snippet code, so a failing assertion exits non-zero and
/// its traceback on stderr becomes the failure message.
#[derive(Debug, Clone)]
pub struct PythonSandbox {
    interpreter: String,
    timeout: Duration,
}

impl PythonSandbox {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            interpreter: config.python.clone(),
            timeout: config.timeout,
        }
    }
}

/// Assembles the script the interpreter runs.
pub fn build_script(code: &str, test_code: &str) -> String {
    let mut script = String::with_capacity(code.len() + test_code.len() + 64);
    script.push_str(code);
    script.push('\n');
    script.push_str("def test_code():\n");
    for line in test_code.split('\n') {
        script.push_str("    ");
        script.push_str(line);
        script.push('\n');
    }
    script.push('\n');
    script.push_str("test_code()\n");
    script
}

#[async_trait]
impl Sandbox for PythonSandbox {
    async fn execute(
        &self,
        language: Language,
        code: &str,
        test_code: &str,
    ) -> Result<SandboxVerdict, SandboxError> {
        if language != Language::Python {
            return Err(SandboxError::Unsupported(language));
        }

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("test.py");
        tokio::fs::write(&path, build_script(code, test_code)).await?;

        let child = tokio::process::Command::new(&self.interpreter)
            .arg(&path)
            .current_dir(dir.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| {
                SandboxError::Unavailable(format!("failed to start {}: {}", self.interpreter, err))
            })?;

        // Dropping the child on timeout kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(SandboxError::Timeout {
                    millis: self.timeout.as_millis() as u64,
                })
            }
        };

        if output.status.success() {
            return Ok(SandboxVerdict::pass(SUCCESS_MESSAGE));
        }
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        if stderr.trim().is_empty() {
            Ok(SandboxVerdict::fail(format!(
                "process exited with {}",
                output.status
            )))
        } else {
            Ok(SandboxVerdict::fail(stderr))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tests_become_a_function_body() {
        let script = build_script("x = 1", "assert x == 1\nassert x > 0");
        assert_eq!(
            script,
            "x = 1\ndef test_code():\n    assert x == 1\n    assert x > 0\n\ntest_code()\n"
        );
    }

    #[tokio::test]
    async fn other_languages_are_refused() {
        let sandbox = PythonSandbox::new(&SandboxConfig::default());
        let err = sandbox
            .execute(Language::Javascript, "let x = 1;", "console.assert(x === 1);")
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Unsupported(Language::Javascript)));
    }

    #[tokio::test]
    async fn missing_interpreter_is_unavailable() {
        let sandbox = PythonSandbox::new(&SandboxConfig {
            python: "snippetlab-no-such-interpreter".into(),
            ..SandboxConfig::default()
        });
        let err = sandbox
            .execute(Language::Python, "x = 1", "assert x == 1")
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Unavailable(_)));
    }
}
