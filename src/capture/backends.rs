//! Individual clipboard capture backends.
//!
//! Each backend wraps one optional external program. Backends never decide
//! whether the chain continues; they only report what happened.

use super::search_path::SearchPath;
use crate::platform::Platform;
use crate::relocate::temp::TempAllocator;
use crate::types::{GrabError, ImageExtension};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{ChildStderr, Command, Stdio};
use std::thread;

/// Diagnostic output kept from a backend's stderr; the rest is discarded.
const STDERR_KEEP_BYTES: u64 = 4096;

/// Result of one backend attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOutcome {
    /// Non-empty image bytes.
    Captured(Vec<u8>),
    /// The backend's program is not on the search path.
    Unavailable,
    /// The program ran but produced no usable image.
    Failed(String),
}

/// Shared inputs for a capture attempt.
pub struct BackendContext<'a> {
    pub search_path: &'a SearchPath,
    /// Allocator for scratch files used by file-writing backends.
    pub scratch: &'a TempAllocator,
    /// Upper bound on captured bytes.
    pub max_payload: u64,
}

/// One way of reading an image off the clipboard.
///
/// `Err` is reserved for conditions that must stop the whole chain (an
/// oversized payload, no scratch space); everything else is a
/// [`BackendOutcome::Failed`].
pub trait ClipboardBackend: Send + Sync {
    /// Program name looked up on the search path.
    fn program(&self) -> &'static str;

    /// Run the backend using the resolved executable.
    fn run(&self, executable: &Path, ctx: &BackendContext<'_>)
    -> Result<BackendOutcome, GrabError>;

    fn try_capture(&self, ctx: &BackendContext<'_>) -> Result<BackendOutcome, GrabError> {
        match ctx.search_path.find(self.program()) {
            Some(executable) => self.run(&executable, ctx),
            None => Ok(BackendOutcome::Unavailable),
        }
    }
}

/// Backend chain in priority order for `platform`.
pub fn default_backends(platform: Platform) -> Vec<Box<dyn ClipboardBackend>> {
    let mut backends: Vec<Box<dyn ClipboardBackend>> = vec![Box::new(PngPaste)];
    if platform.has_desktop_scripting() {
        backends.push(Box::new(AppleScript));
    }
    backends.push(Box::new(WlPaste));
    backends.push(Box::new(Xclip));
    backends
}

/// `pngpaste <file>`: native clipboard-to-file tool.
pub struct PngPaste;

impl ClipboardBackend for PngPaste {
    fn program(&self) -> &'static str {
        "pngpaste"
    }

    fn run(
        &self,
        executable: &Path,
        ctx: &BackendContext<'_>,
    ) -> Result<BackendOutcome, GrabError> {
        let scratch = ScratchFile::allocate(ctx.scratch)?;
        let mut command = Command::new(executable);
        command.arg(scratch.path());
        capture_via_file(command, &scratch, ctx.max_payload)
    }
}

/// `osascript`: reads the clipboard's PNG class and writes it through a file handle.
pub struct AppleScript;

impl AppleScript {
    fn script(target: &Path) -> String {
        let escaped = target
            .to_string_lossy()
            .replace('\\', "\\\\")
            .replace('"', "\\\"");
        format!(
            r#"set outFile to POSIX file "{escaped}"
set imageData to the clipboard as «class PNGf»
set fileRef to open for access outFile with write permission
try
    set eof of fileRef to 0
    write imageData to fileRef
    close access fileRef
on error errMsg
    close access fileRef
    error errMsg
end try"#
        )
    }
}

impl ClipboardBackend for AppleScript {
    fn program(&self) -> &'static str {
        "osascript"
    }

    fn run(
        &self,
        executable: &Path,
        ctx: &BackendContext<'_>,
    ) -> Result<BackendOutcome, GrabError> {
        let scratch = ScratchFile::allocate(ctx.scratch)?;
        let mut command = Command::new(executable);
        command.arg("-e").arg(Self::script(scratch.path()));
        capture_via_file(command, &scratch, ctx.max_payload)
    }
}

/// `wl-paste`: Wayland clipboard reader, image bytes on stdout.
pub struct WlPaste;

impl ClipboardBackend for WlPaste {
    fn program(&self) -> &'static str {
        "wl-paste"
    }

    fn run(
        &self,
        executable: &Path,
        ctx: &BackendContext<'_>,
    ) -> Result<BackendOutcome, GrabError> {
        let mut command = Command::new(executable);
        command.args(["--no-newline", "--type", "image/png"]);
        capture_via_stdout(command, self.program(), ctx.max_payload)
    }
}

/// `xclip`: X11 clipboard reader, explicitly requesting `image/png`.
pub struct Xclip;

impl ClipboardBackend for Xclip {
    fn program(&self) -> &'static str {
        "xclip"
    }

    fn run(
        &self,
        executable: &Path,
        ctx: &BackendContext<'_>,
    ) -> Result<BackendOutcome, GrabError> {
        let mut command = Command::new(executable);
        command.args(["-selection", "clipboard", "-t", "image/png", "-o"]);
        capture_via_stdout(command, self.program(), ctx.max_payload)
    }
}

/// Scratch file that is removed when dropped.
struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    fn allocate(allocator: &TempAllocator) -> Result<Self, GrabError> {
        Ok(Self {
            path: allocator.allocate(ImageExtension::Png)?,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => log::trace!("Removed scratch file {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove scratch file {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

fn capture_via_file(
    mut command: Command,
    scratch: &ScratchFile,
    max_payload: u64,
) -> Result<BackendOutcome, GrabError> {
    let output = match command.stdin(Stdio::null()).output() {
        Ok(output) => output,
        Err(e) => return Ok(BackendOutcome::Failed(format!("failed to spawn: {}", e))),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Ok(BackendOutcome::Failed(format!(
            "exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let size = match fs::metadata(scratch.path()) {
        Ok(meta) => meta.len(),
        Err(e) => {
            return Ok(BackendOutcome::Failed(format!(
                "no output file written: {}",
                e
            )));
        }
    };
    if size == 0 {
        return Ok(BackendOutcome::Failed("wrote an empty file".into()));
    }
    if size > max_payload {
        return Err(payload_too_large(max_payload));
    }

    match fs::read(scratch.path()) {
        Ok(bytes) if !bytes.is_empty() => Ok(BackendOutcome::Captured(bytes)),
        Ok(_) => Ok(BackendOutcome::Failed("wrote an empty file".into())),
        Err(e) => Ok(BackendOutcome::Failed(format!(
            "cannot read output file: {}",
            e
        ))),
    }
}

fn capture_via_stdout(
    mut command: Command,
    program: &str,
    max_payload: u64,
) -> Result<BackendOutcome, GrabError> {
    let mut child = match command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => return Ok(BackendOutcome::Failed(format!("failed to spawn: {}", e))),
    };

    // stderr must drain concurrently or a chatty tool blocks on a full pipe
    let stderr_reader = child.stderr.take().map(drain_stderr);

    let mut data = Vec::new();
    let read_result = match child.stdout.take() {
        Some(stdout) => stdout.take(max_payload + 1).read_to_end(&mut data),
        None => Ok(0),
    };

    if data.len() as u64 > max_payload {
        let _ = child.kill();
        let _ = child.wait();
        return Err(payload_too_large(max_payload));
    }

    let status = child.wait();
    let stderr = stderr_reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    let status = match status {
        Ok(status) => status,
        Err(e) => {
            return Ok(BackendOutcome::Failed(format!(
                "failed to wait for {}: {}",
                program, e
            )));
        }
    };

    if let Err(e) = read_result {
        return Ok(BackendOutcome::Failed(format!(
            "failed to read stdout: {}",
            e
        )));
    }
    if !status.success() {
        return Ok(BackendOutcome::Failed(format!(
            "exited with {}: {}",
            status,
            stderr.trim()
        )));
    }
    if data.is_empty() {
        return Ok(BackendOutcome::Failed("produced no output".into()));
    }

    Ok(BackendOutcome::Captured(data))
}

fn drain_stderr(mut pipe: ChildStderr) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut kept = Vec::new();
        let _ = (&mut pipe).take(STDERR_KEEP_BYTES).read_to_end(&mut kept);
        let _ = io::copy(&mut pipe, &mut io::sink());
        String::from_utf8_lossy(&kept).into_owned()
    })
}

fn payload_too_large(max_payload: u64) -> GrabError {
    GrabError::Clipboard(format!(
        "clipboard image exceeds the {} byte limit",
        max_payload
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(platform: Platform) -> Vec<&'static str> {
        default_backends(platform)
            .iter()
            .map(|b| b.program())
            .collect()
    }

    #[test]
    fn chain_order_follows_platform() {
        assert_eq!(
            names(Platform::MacOs),
            ["pngpaste", "osascript", "wl-paste", "xclip"]
        );
        assert_eq!(
            names(Platform::Freedesktop),
            ["pngpaste", "wl-paste", "xclip"]
        );
    }

    #[test]
    fn applescript_escapes_target_path() {
        let script = AppleScript::script(Path::new("/tmp/a\"b.png"));
        assert!(script.contains(r#"POSIX file "/tmp/a\"b.png""#));
        assert!(script.contains("«class PNGf»"));
        assert!(script.contains("close access fileRef"));
    }

    #[test]
    fn missing_program_is_unavailable() {
        let search_path = SearchPath::new("");
        let scratch = TempAllocator::new("shotgrab-test");
        let ctx = BackendContext {
            search_path: &search_path,
            scratch: &scratch,
            max_payload: 1024,
        };
        assert_eq!(
            WlPaste.try_capture(&ctx).unwrap(),
            BackendOutcome::Unavailable
        );
    }
}
