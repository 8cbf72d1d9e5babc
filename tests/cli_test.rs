//! Runs the built binary end to end.

use std::fs;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::process::Command;
use std::thread;
use tempfile::TempDir;

fn mtsync_bin() -> String {
    env!("CARGO_BIN_EXE_mtsync").to_string()
}

#[test]
fn test_missing_config_argument_fails_with_usage() {
    let output = Command::new(mtsync_bin()).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
    assert!(output.stdout.is_empty());
}

#[test]
fn test_once_prints_server_response() {
    let temp = TempDir::new().unwrap();
    let folder = temp.path().join("sync");
    fs::create_dir(&folder).unwrap();
    fs::write(folder.join("one.txt"), "1").unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let expect = folder.to_string_lossy().len() + 8;
    let server = thread::spawn(move || {
        let (mut socket, _) = listener.accept().unwrap();
        let mut buf = vec![0u8; expect];
        socket.read_exact(&mut buf).unwrap();
        socket.write_all(b"OK: 1 files received").unwrap();
        buf
    });

    let config_path = temp.path().join("client.json");
    fs::write(
        &config_path,
        format!(
            r#"{{"serverIp": "127.0.0.1", "folderPath": "{}"}}"#,
            folder.to_string_lossy().replace('\\', "\\\\")
        ),
    )
    .unwrap();

    let output = Command::new(mtsync_bin())
        .arg(&config_path)
        .args(["--once", "--port", &port.to_string()])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "mtsync failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim_end(),
        "Server Response: OK: 1 files received"
    );

    let wire = server.join().unwrap();
    assert!(wire.starts_with(folder.to_string_lossy().as_bytes()));
}

#[test]
fn test_once_against_closed_port_exits_non_zero() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let temp = TempDir::new().unwrap();
    let output = Command::new(mtsync_bin())
        .arg(temp.path().join("missing.json"))
        .args(["--once", "--port", &port.to_string()])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("Error: cannot connect to 127.0.0.1:"), "stdout: {stdout}");
}
