use crate::config::CompilerConfig;
use crate::error::{Result, ServiceError};
use crate::workspace::Workspace;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use texpress_template::{Details, Template};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

const DEFAULT_COMMAND: &str = "pdflatex";
const FALLBACK_COMMAND: &str = "pdftex";

/// Runs the external typesetting binary over a rendered template.
///
/// The rendered bytes are piped into the compiler's standard input, which is
/// closed once everything is written; captured output and exit status are
/// read afterwards. The process runs inside the workspace with the
/// workspace's name as its job name, so the artifact lands at
/// `<workspace>/<name>.pdf`.
///
/// The child is killed when the compile future is dropped, so a cancelled
/// request or an expired deadline never leaves an orphaned process.
#[derive(Debug, Clone)]
pub struct Compiler {
    command: PathBuf,
    timeout: Duration,
}

impl Compiler {
    pub fn new(command: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    /// Resolves the configured binary against `PATH`. Without one,
    /// `pdflatex` is preferred and `pdftex` accepted in its place.
    pub fn from_config(config: &CompilerConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        if let Some(command) = &config.command {
            let path = which::which(command)
                .map_err(|e| ServiceError::Config(format!("compiler {command}: {e}")))?;
            return Ok(Self::new(path, timeout));
        }

        match which::which(DEFAULT_COMMAND) {
            Ok(path) => Ok(Self::new(path, timeout)),
            Err(e) => {
                tracing::warn!("{DEFAULT_COMMAND} not found ({e}), checking for {FALLBACK_COMMAND}");
                let path = which::which(FALLBACK_COMMAND).map_err(|_| {
                    ServiceError::Config(format!(
                        "neither {DEFAULT_COMMAND} nor {FALLBACK_COMMAND} found in PATH"
                    ))
                })?;
                tracing::info!("falling back to {}", path.display());
                Ok(Self::new(path, timeout))
            }
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn compile(
        &self,
        template: &Template,
        details: &Details,
        workspace: &Workspace,
    ) -> Result<PathBuf> {
        let input = template.render(details)?;

        let mut child = Command::new(&self.command)
            .arg("-halt-on-error")
            .arg(format!("-jobname={}", workspace.name()))
            .current_dir(workspace.path())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ServiceError::io(format!("starting compiler {}", self.command.display()), e)
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ServiceError::Internal("compiler stdin was not captured".into()))?;

        tracing::info!(
            job = workspace.name(),
            bytes = input.len(),
            "running {}",
            self.command.display()
        );

        // The compiler may fill its output pipe before it has consumed all of
        // its input, so feeding and collecting run side by side.
        let feed = async move {
            let written = stdin.write_all(&input).await;
            drop(stdin);
            written
        };
        let run = async { tokio::join!(feed, child.wait_with_output()) };

        let (fed, output) = tokio::time::timeout(self.timeout, run).await.map_err(|_| {
            tracing::warn!(job = workspace.name(), "compiler deadline expired, killing process");
            ServiceError::Timeout(self.timeout)
        })?;

        let output = output.map_err(|e| ServiceError::io("waiting for compiler", e))?;
        let captured = captured_output(&output.stdout, &output.stderr);

        if !output.status.success() {
            return Err(ServiceError::Compile {
                message: exit_message(&self.command, output.status),
                output: captured,
            });
        }
        if let Err(e) = fed {
            return Err(ServiceError::Compile {
                message: format!("writing compiler input: {e}"),
                output: captured,
            });
        }

        tracing::debug!(job = workspace.name(), "{}", String::from_utf8_lossy(&output.stdout));

        let artifact = workspace.path().join(format!("{}.pdf", workspace.name()));
        if !tokio::fs::try_exists(&artifact).await.unwrap_or(false) {
            return Err(ServiceError::Compile {
                message: format!("compiler produced no {}", artifact.display()),
                output: captured,
            });
        }
        Ok(artifact)
    }
}

fn exit_message(command: &Path, status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("{} exited with status {code}", command.display()),
        None => format!("{} was terminated by a signal", command.display()),
    }
}

fn captured_output(stdout: &[u8], stderr: &[u8]) -> String {
    let mut out = String::from_utf8_lossy(stdout).into_owned();
    if !stderr.is_empty() {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&String::from_utf8_lossy(stderr));
    }
    out
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::{TempDir, tempdir};
    use texpress_template::{Delimiters, TemplateError};

    /// Writes an executable shell script standing in for the typesetter.
    fn script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    // Copies stdin to "<jobname>.pdf" in the working directory.
    const ECHO_COMPILER: &str = r#"for arg in "$@"; do
  case "$arg" in -jobname=*) job="${arg#-jobname=}" ;; esac
done
cat > "$job.pdf"
echo "Output written on $job.pdf""#;

    fn hello() -> Template {
        Template::parse("hello", "Hello #!name!#", &Delimiters::default()).unwrap()
    }

    fn details(value: serde_json::Value) -> Details {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_renders_into_stdin_and_returns_artifact() {
        let bin = tempdir().unwrap();
        let root = tempdir().unwrap();
        let compiler = Compiler::new(script(&bin, "fake", ECHO_COMPILER), Duration::from_secs(10));
        let ws = Workspace::create(root.path()).await.unwrap();

        let artifact = compiler
            .compile(&hello(), &details(json!({"name": "World"})), &ws)
            .await
            .unwrap();

        assert_eq!(artifact, ws.path().join(format!("{}.pdf", ws.name())));
        assert_eq!(std::fs::read(&artifact).unwrap(), b"Hello World");
    }

    #[tokio::test]
    async fn test_halt_on_error_flag_is_passed() {
        let bin = tempdir().unwrap();
        let root = tempdir().unwrap();
        let body = format!(
            "[ \"$1\" = \"-halt-on-error\" ] || {{ echo \"missing flag: $1\"; exit 3; }}\n{ECHO_COMPILER}"
        );
        let compiler = Compiler::new(script(&bin, "strict", &body), Duration::from_secs(10));
        let ws = Workspace::create(root.path()).await.unwrap();

        compiler
            .compile(&hello(), &details(json!({"name": "World"})), &ws)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_output() {
        let bin = tempdir().unwrap();
        let root = tempdir().unwrap();
        let failing = script(
            &bin,
            "failing",
            "cat > /dev/null\necho '! Undefined control sequence.'\necho 'l.1 \\foo' >&2\nexit 1",
        );
        let compiler = Compiler::new(failing, Duration::from_secs(10));
        let ws = Workspace::create(root.path()).await.unwrap();

        let err = compiler
            .compile(&hello(), &details(json!({"name": "World"})), &ws)
            .await
            .unwrap_err();

        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        match err {
            ServiceError::Compile { message, output } => {
                assert!(message.contains("exited with status 1"), "{message}");
                assert!(output.contains("! Undefined control sequence."));
                assert!(output.contains("l.1 \\foo"));
            }
            other => panic!("expected compile error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_artifact_is_compile_error() {
        let bin = tempdir().unwrap();
        let root = tempdir().unwrap();
        let silent = script(&bin, "silent", "cat > /dev/null");
        let compiler = Compiler::new(silent, Duration::from_secs(10));
        let ws = Workspace::create(root.path()).await.unwrap();

        let err = compiler
            .compile(&hello(), &details(json!({"name": "World"})), &ws)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Compile { .. }));
    }

    #[tokio::test]
    async fn test_render_failure_does_not_start_compiler() {
        let bin = tempdir().unwrap();
        let root = tempdir().unwrap();
        let marker = bin.path().join("started");
        let body = format!("touch {}\n{ECHO_COMPILER}", marker.display());
        let compiler = Compiler::new(script(&bin, "marking", &body), Duration::from_secs(10));
        let ws = Workspace::create(root.path()).await.unwrap();

        let err = compiler.compile(&hello(), &Details::new(), &ws).await.unwrap_err();

        assert!(matches!(err, ServiceError::Template(TemplateError::Render { .. })));
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_deadline_kills_process() {
        let bin = tempdir().unwrap();
        let root = tempdir().unwrap();
        let finished = bin.path().join("finished");
        let body = format!("sleep 1\ntouch {}", finished.display());
        let compiler = Compiler::new(script(&bin, "hang", &body), Duration::from_millis(200));
        let ws = Workspace::create(root.path()).await.unwrap();

        let err = compiler
            .compile(&hello(), &details(json!({"name": "World"})), &ws)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Timeout(_)));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!finished.exists(), "compiler kept running past its deadline");
    }

    #[test]
    fn test_from_config_resolves_explicit_path() {
        let bin = tempdir().unwrap();
        let fake = script(&bin, "fake", ECHO_COMPILER);
        let config = CompilerConfig {
            command: Some(fake.display().to_string()),
            timeout_secs: 5,
        };

        let compiler = Compiler::from_config(&config).unwrap();
        assert!(compiler.command().ends_with("fake"));
        assert_eq!(compiler.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_from_config_unknown_command() {
        let config = CompilerConfig {
            command: Some("texpress-no-such-typesetter".to_string()),
            timeout_secs: 5,
        };
        assert!(matches!(
            Compiler::from_config(&config),
            Err(ServiceError::Config(_))
        ));
    }

    #[test]
    fn test_captured_output_joins_streams() {
        assert_eq!(captured_output(b"a", b"b"), "a\nb");
        assert_eq!(captured_output(b"a\n", b""), "a\n");
        assert_eq!(captured_output(b"", b"b"), "b");
    }
}
