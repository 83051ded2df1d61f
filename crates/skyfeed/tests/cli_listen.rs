#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/skyfeed-cli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn wait_for_path(path: &Path, timeout: Duration) {
    let start = Instant::now();
    while !path.exists() {
        assert!(
            start.elapsed() < timeout,
            "{} did not appear within {timeout:?}",
            path.display()
        );
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn listen_plaintext_end_to_end() {
    let dir = unique_temp_dir("listen");
    let pipe = dir.join("api");
    let downloads = dir.join("downloads");

    // Build wire bytes with `pack`, raw (no inner header, plaintext mode).
    let input = dir.join("input.bin");
    std::fs::write(&input, b"hello world!!").unwrap();
    let wire = dir.join("wire.bin");
    let status = Command::new(env!("CARGO_BIN_EXE_skyfeed"))
        .args(["pack", "--raw", "-o"])
        .arg(&wire)
        .arg(&input)
        .status()
        .expect("pack should run");
    assert!(status.success());

    // Listener creates the FIFO and blocks until a writer attaches.
    let mut listener = Command::new(env!("CARGO_BIN_EXE_skyfeed"))
        .arg("listen")
        .arg(&pipe)
        .arg("--plaintext")
        .arg("--download-dir")
        .arg(&downloads)
        .args(["--count", "1", "--format", "json"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("listen should spawn");

    wait_for_path(&pipe, Duration::from_secs(10));

    // Opening the FIFO for writing unblocks the listener's open.
    let wire_bytes = std::fs::read(&wire).unwrap();
    std::fs::write(&pipe, &wire_bytes).expect("write into fifo");

    let start = Instant::now();
    let status = loop {
        match listener.try_wait().expect("try_wait") {
            Some(status) => break status,
            None => {
                if start.elapsed() > Duration::from_secs(10) {
                    let _ = listener.kill();
                    panic!("listener did not exit after receiving the message");
                }
                std::thread::sleep(Duration::from_millis(25));
            }
        }
    };
    assert!(status.success());

    let entries: Vec<_> = std::fs::read_dir(&downloads)
        .expect("download dir should exist")
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(std::fs::read(&entries[0]).unwrap(), b"hello world!!");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn listen_rejects_non_pipe_path() {
    let dir = unique_temp_dir("notpipe");
    let path = dir.join("regular");
    std::fs::write(&path, b"file").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_skyfeed"))
        .arg("listen")
        .arg(&path)
        .output()
        .expect("listen should run");

    assert_eq!(output.status.code(), Some(64)); // usage error
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn version_prints_package_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_skyfeed"))
        .arg("version")
        .output()
        .expect("version should run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
