//! Legacy `.doc` extraction by shelling out to a platform converter (`textutil` on macOS, else
//! `antiword`), since no pure-Rust `.doc` parser exists in the corpus. Absence of the tool, a
//! non-zero exit, or a timeout all degrade to `None` rather than an error.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const BODY_CAP: usize = 5000;
const TIMEOUT: Duration = Duration::from_secs(10);

fn run_with_timeout(expr: duct::Expression) -> Option<String> {
    let handle = Arc::new(expr.stdout_capture().stderr_null().unchecked().start().ok()?);
    let (tx, rx) = std::sync::mpsc::channel();
    let handle_for_wait = Arc::clone(&handle);
    std::thread::spawn(move || {
        let _ = tx.send(handle_for_wait.wait().map(|o| o.stdout.clone()));
    });
    match rx.recv_timeout(TIMEOUT) {
        Ok(Ok(bytes)) => Some(String::from_utf8_lossy(&bytes).into_owned()),
        Ok(Err(_)) => None,
        Err(_) => {
            let _ = handle.kill();
            None
        }
    }
}

pub fn extract_doc(path: &Path) -> Option<String> {
    let path_str = path.to_str()?;
    let output = if cfg!(target_os = "macos") {
        run_with_timeout(duct::cmd!("textutil", "-convert", "txt", "-stdout", path_str))
    } else {
        run_with_timeout(duct::cmd!("antiword", path_str))
    }?;

    let trimmed = output.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(BODY_CAP).collect())
    }
}
