#![cfg(unix)]

use std::net::TcpListener;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use liveview::frame::{FrameError, ImageFrame};
use liveview::pipeline::{FrameReceiver, FrameSink, PipelineError, Viewer};
use liveview::transport::{Endpoint, PullSocket};

/// Grab a currently-free loopback port for a child producer to bind.
fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("loopback bind should succeed");
    listener
        .local_addr()
        .expect("bound listener should have an address")
        .port()
}

fn spawn_producer(endpoint: &Endpoint, extra_args: &[&str]) -> std::process::Child {
    let mut command = Command::new(env!("CARGO_BIN_EXE_liveview"));
    command
        .arg("--log-level")
        .arg("error")
        .arg("produce")
        .arg("--endpoint")
        .arg(endpoint.to_string())
        .args(extra_args)
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    command.spawn().expect("producer should start")
}

fn connect_with_retry(endpoint: &Endpoint, timeout: Duration) -> PullSocket {
    let deadline = Instant::now() + timeout;
    loop {
        match PullSocket::connect(endpoint) {
            Ok(socket) => return socket,
            Err(err) => {
                assert!(
                    Instant::now() < deadline,
                    "connect to producer timed out: {err}"
                );
                std::thread::sleep(Duration::from_millis(25));
            }
        }
    }
}

#[derive(Default)]
struct CollectingSink {
    sequences: Vec<u64>,
    shapes: Vec<(u32, u32)>,
    last_stats: Option<(u64, u64)>,
}

impl FrameSink for CollectingSink {
    fn on_frame(&mut self, frame: &ImageFrame) {
        self.sequences.push(frame.sequence());
        self.shapes.push(frame.shape());
    }

    fn on_stats_changed(&mut self, frames_received: u64, frames_shown: u64) {
        self.last_stats = Some((frames_received, frames_shown));
    }
}

#[test]
fn producer_streams_five_frames_end_to_end() {
    let endpoint = Endpoint::new("127.0.0.1", free_port());
    let mut child = spawn_producer(
        &endpoint,
        &["--frames", "5", "--rate", "10", "--seed", "7"],
    );

    let socket = connect_with_retry(&endpoint, Duration::from_secs(5));
    let mut viewer = Viewer::new(FrameReceiver::new(socket), CollectingSink::default());

    let deadline = Instant::now() + Duration::from_secs(10);
    while viewer.frames_received() < 5 && Instant::now() < deadline {
        let readable = viewer
            .wait_readable(Some(Duration::from_millis(200)))
            .expect("poll should succeed");
        if !readable {
            continue;
        }
        match viewer.handle_readable() {
            Ok(_) => {}
            Err(PipelineError::Frame(FrameError::ConnectionClosed)) => break,
            Err(err) => panic!("drain failed: {err}"),
        }
    }

    assert_eq!(viewer.frames_received(), 5);
    assert_eq!(viewer.frames_shown(), 5);

    let sink = viewer.sink();
    assert_eq!(sink.sequences, vec![0, 1, 2, 3, 4]);
    assert!(sink.shapes.iter().all(|&shape| shape == (256, 256)));
    assert_eq!(sink.last_stats, Some((5, 5)));

    let status = child.wait().expect("producer should exit");
    assert!(status.success());
}

#[test]
fn view_command_prints_frames_and_stats_as_json() {
    let endpoint = Endpoint::new("127.0.0.1", free_port());
    let mut producer = spawn_producer(
        &endpoint,
        &[
            "--frames", "3", "--rate", "20", "--rows", "8", "--cols", "8", "--seed", "1",
        ],
    );

    let output = Command::new(env!("CARGO_BIN_EXE_liveview"))
        .arg("--log-level")
        .arg("error")
        .arg("view")
        .arg("--endpoint")
        .arg(endpoint.to_string())
        .arg("--count")
        .arg("3")
        .arg("--format")
        .arg("json")
        .output()
        .expect("view should run");

    assert!(output.status.success(), "view exited with {}", output.status);

    let stdout = String::from_utf8(output.stdout).expect("stdout should be UTF-8");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4, "3 frame lines + 1 stats line: {stdout}");

    for (index, line) in lines[..3].iter().enumerate() {
        let value: serde_json::Value = serde_json::from_str(line).expect("frame line is JSON");
        assert_eq!(value["frame"], index as u64);
        assert_eq!(value["dtype"], "uint16");
        assert_eq!(value["shape"], serde_json::json!([8, 8]));
        assert_eq!(value["payload_size"], 8 * 8 * 2);
    }

    let stats: serde_json::Value = serde_json::from_str(lines[3]).expect("stats line is JSON");
    assert_eq!(stats["frames_received"], 3);
    assert_eq!(stats["frames_shown"], 3);

    let _ = producer.wait();
}

#[test]
fn produce_exits_nonzero_when_bind_fails() {
    // Hold the port so the producer cannot bind it.
    let blocker = TcpListener::bind("127.0.0.1:0").expect("loopback bind should succeed");
    let port = blocker.local_addr().expect("address").port();
    let endpoint = Endpoint::new("127.0.0.1", port);

    let output = Command::new(env!("CARGO_BIN_EXE_liveview"))
        .arg("--log-level")
        .arg("error")
        .arg("produce")
        .arg("--frames")
        .arg("1")
        .arg("--endpoint")
        .arg(endpoint.to_string())
        .output()
        .expect("produce should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to bind"), "stderr: {stderr}");
}

#[test]
fn view_exits_nonzero_when_connect_fails() {
    let endpoint = Endpoint::new("127.0.0.1", free_port());

    let output = Command::new(env!("CARGO_BIN_EXE_liveview"))
        .arg("--log-level")
        .arg("error")
        .arg("view")
        .arg("--endpoint")
        .arg(endpoint.to_string())
        .arg("--connect-timeout")
        .arg("200ms")
        .output()
        .expect("view should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("connect failed"), "stderr: {stderr}");
}
