//! Code execution behind an explicit sandbox boundary.
//!
//! The model never gets an in-process interpreter. Every snippet goes through
//! a [`Sandbox`], and the stock [`ProcessSandbox`] runs it in a child process
//! with a scratch working directory, a cleared environment and a wall-clock
//! timeout.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{required_str, Tool};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SandboxOutput {
    pub stdout:    String,
    pub stderr:    String,
    pub exit_code: Option<i32>,
}

impl SandboxOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[async_trait]
pub trait Sandbox: Send + Sync {
    /// Runs `code` to completion. `Err` means the sandbox itself failed
    /// (spawn error, timeout, refusal), not that the code exited non-zero.
    async fn run(&self, code: &str) -> Result<SandboxOutput, String>;
}

/// Refuses every request. Used when no interpreter is configured.
pub struct DisabledSandbox;

#[async_trait]
impl Sandbox for DisabledSandbox {
    async fn run(&self, _code: &str) -> Result<SandboxOutput, String> {
        Err("code execution is disabled on this host".to_string())
    }
}

#[derive(Debug, Clone)]
pub struct ProcessSandbox {
    program:          String,
    args:             Vec<String>,
    /// Turns the submitted snippet into the script fed to `program`.
    script:           fn(&str) -> String,
    timeout:          Duration,
    max_output_bytes: usize,
}

impl ProcessSandbox {
    /// `program` receives the code on stdin.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program:          program.into(),
            args,
            script:           str::to_string,
            timeout:          Duration::from_secs(10),
            max_output_bytes: 16 * 1024,
        }
    }

    /// Isolated-mode Python reading the script from stdin. A top-level
    /// `result` variable is printed after the snippet finishes; if the snippet
    /// printed nothing and set no `result`, its plain variables are printed.
    pub fn python(program: impl Into<String>) -> Self {
        let mut sandbox = Self::new(program, vec!["-I".to_string(), "-".to_string()]);
        sandbox.script = python_script;
        sandbox
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout; self
    }

}

#[async_trait]
impl Sandbox for ProcessSandbox {
    async fn run(&self, code: &str) -> Result<SandboxOutput, String> {
        let workdir = tempfile::tempdir()
            .map_err(|e| format!("failed to create sandbox directory: {}", e))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(workdir.path())
            .env_clear()
            .env("HOME", workdir.path())
            .env("LANG", "C.UTF-8")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(path) = std::env::var_os("PATH") {
            cmd.env("PATH", path);
        }

        let mut child = cmd.spawn()
            .map_err(|e| format!("failed to start {}: {}", self.program, e))?;

        let script = (self.script)(code);
        let execution = async move {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(script.as_bytes()).await
                    .map_err(|e| format!("failed to pass code to {}: {}", self.program, e))?;
            }
            let output = child.wait_with_output().await
                .map_err(|e| format!("failed to collect output: {}", e))?;
            Ok::<_, String>(output)
        };

        // Dropping the future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, execution)
            .await
            .map_err(|_| format!("execution timed out after {:?}", self.timeout))??;

        Ok(SandboxOutput {
            stdout:    truncate(&String::from_utf8_lossy(&output.stdout), self.max_output_bytes),
            stderr:    truncate(&String::from_utf8_lossy(&output.stderr), self.max_output_bytes),
            exit_code: output.status.code(),
        })
    }
}

const PYTHON_EPILOGUE: &str = r#"
class _Watched:
    def __init__(self, inner):
        self.inner, self.used = inner, False
    def write(self, text):
        self.used = self.used or bool(text)
        return self.inner.write(text)
    def __getattr__(self, name):
        return getattr(self.inner, name)

_sys.stdout = _Watched(_sys.stdout)
_scope = {"__name__": "__main__"}
exec(compile(_SNIPPET, "<snippet>", "exec"), _scope)
if "result" in _scope:
    print(_scope["result"])
elif not _sys.stdout.used:
    _plain = {k: v for k, v in _scope.items()
              if not k.startswith("_") and not callable(v) and not isinstance(v, _types.ModuleType)}
    if _plain:
        print(_plain)
"#;

/// Wraps a snippet so it runs in its own namespace and reports `result`.
/// The snippet travels as a JSON string, which Python reads as a str literal.
fn python_script(code: &str) -> String {
    let literal = serde_json::to_string(code).unwrap_or_else(|_| "\"\"".to_string());
    format!("import sys as _sys, types as _types\n_SNIPPET = {}\n{}", literal, PYTHON_EPILOGUE)
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\n[output truncated]", &s[..end])
}

pub struct CodeExecutorTool {
    sandbox: Arc<dyn Sandbox>,
}

impl CodeExecutorTool {
    pub fn new(sandbox: Arc<dyn Sandbox>) -> Self {
        Self { sandbox }
    }
}

#[async_trait]
impl Tool for CodeExecutorTool {
    fn name(&self) -> &str { "run_code" }

    fn description(&self) -> &str {
        "Run a Python snippet for calculations, data processing or analysis. \
         Standard output is returned; assign the final value to `result` to have it printed."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "code": {
                    "type": "string",
                    "description": "The Python code to execute"
                }
            },
            "required": ["code"]
        })
    }

    async fn call(&self, args: &HashMap<String, Value>) -> Result<String, String> {
        let code = required_str(args, "code")?;
        tracing::info!(bytes = code.len(), "running code in sandbox");

        let output = self.sandbox.run(code).await?;
        if !output.success() {
            let detail = output.stderr.trim();
            return Err(match (detail.is_empty(), output.exit_code) {
                (false, _)       => format!("Error: {}", detail),
                (true, Some(c))  => format!("Error: process exited with status {}", c),
                (true, None)     => "Error: process was terminated by a signal".to_string(),
            });
        }

        let stdout = output.stdout.trim_end();
        if stdout.is_empty() {
            Ok("Code executed successfully.".to_string())
        } else {
            Ok(stdout.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> ProcessSandbox {
        ProcessSandbox::new("sh", Vec::new()).with_timeout(Duration::from_secs(5))
    }

    fn code_args(code: &str) -> HashMap<String, Value> {
        [("code".to_string(), json!(code))].into()
    }

    #[tokio::test]
    async fn runs_code_from_stdin() {
        let out = shell().run("echo hello").await.unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn environment_is_cleared() {
        std::env::set_var("NEWSAGENT_SANDBOX_SECRET", "leak");
        let out = shell().run("printf '%s' \"$NEWSAGENT_SANDBOX_SECRET\"").await.unwrap();
        assert_eq!(out.stdout, "");
    }

    #[tokio::test]
    async fn times_out() {
        let sandbox = shell().with_timeout(Duration::from_millis(200));
        let err = sandbox.run("sleep 5").await.unwrap_err();
        assert!(err.contains("timed out"));
    }

    #[tokio::test]
    async fn timeout_covers_a_child_that_never_reads_its_input() {
        let sandbox = ProcessSandbox::new("sleep", vec!["5".to_string()])
            .with_timeout(Duration::from_millis(300));
        let code = "x".repeat(1024 * 1024);
        let err = sandbox.run(&code).await.unwrap_err();
        assert!(err.contains("timed out"), "got: {err}");
    }

    #[test]
    fn python_script_embeds_the_snippet_as_a_literal() {
        let script = python_script("print(\"a\")\nresult = 'x'");
        assert!(script.contains(r#"_SNIPPET = "print(\"a\")\nresult = 'x'""#));
        assert!(script.contains("print(_scope[\"result\"])"));
    }

    #[tokio::test]
    async fn python_reports_result_or_variables() {
        let available = Command::new("python3").arg("-V").output().await
            .is_ok_and(|out| out.status.success());
        if !available {
            return;
        }
        let tool = CodeExecutorTool::new(Arc::new(ProcessSandbox::python("python3")));

        assert_eq!(tool.call(&code_args("result = 6 * 7")).await.unwrap(), "42");
        assert_eq!(tool.call(&code_args("x = 2\ny = x + 1")).await.unwrap(), "{'x': 2, 'y': 3}");
        assert_eq!(tool.call(&code_args("x = 2\nprint('hi')")).await.unwrap(), "hi");
    }

    #[tokio::test]
    async fn tool_reports_failures_and_silence() {
        let tool = CodeExecutorTool::new(Arc::new(shell()));

        let err = tool.call(&code_args("echo boom >&2; exit 3")).await.unwrap_err();
        assert_eq!(err, "Error: boom");

        let ok = tool.call(&code_args("x=1")).await.unwrap();
        assert_eq!(ok, "Code executed successfully.");
    }

    #[tokio::test]
    async fn disabled_sandbox_refuses() {
        let tool = CodeExecutorTool::new(Arc::new(DisabledSandbox));
        let err = tool.call(&code_args("print(1)")).await.unwrap_err();
        assert!(err.contains("disabled"));
    }

    #[test]
    fn truncates_on_char_boundary() {
        let s = truncate("ああああ", 4);
        assert!(s.starts_with("あ"));
        assert!(s.ends_with("[output truncated]"));
    }
}
