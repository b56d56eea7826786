//! Stand-in typesetting compilers.
//!
//! Each body runs after `$job` has been set from the `-jobname=` argument,
//! in the workspace directory, with the rendered template on stdin.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const PREAMBLE: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in -jobname=*) job="${arg#-jobname=}" ;; esac
done"#;

/// Copies the rendered template to `<job>.pdf`.
pub const ECHO: &str = r#"cat > "$job.pdf"
echo "Output written on $job.pdf""#;

/// Fails the way a typesetter does on a bad control sequence.
pub const FAILING: &str = r#"cat > /dev/null
echo "! Undefined control sequence."
echo "l.1 \foo"
exit 1"#;

/// Copies stdin to the artifact only if `logo.png` is linked in.
pub const NEEDS_LOGO: &str = r#"test -L logo.png || { echo "logo.png missing"; exit 1; }
cat > "$job.pdf""#;

/// Sleeps, then leaves a marker next to the script. The marker only appears
/// if the process was allowed to run to completion.
pub fn hanging(marker: &Path) -> String {
    format!("sleep 1\ntouch {}", marker.display())
}

pub fn write_compiler(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("typesetter");
    std::fs::write(&path, format!("{PREAMBLE}\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}
