//! Service built with its production collaborators: the webfs client and
//! the file-backed audit log, pointed at a temp directory laid out like a
//! mounted webfs.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use fakefs_kernel::{FakeFs, FakefsConfig, ManualClock, Request, Response};
use tempfile::TempDir;

fn lay_out_webfs(root: &Path, body: &[u8]) {
    std::fs::create_dir_all(root.join("0")).unwrap();
    std::fs::write(root.join("clone"), "0\n").unwrap();
    std::fs::write(root.join("0/ctl"), b"").unwrap();
    std::fs::write(root.join("0/body"), body).unwrap();
}

fn service(dir: &TempDir, clock: Arc<ManualClock>) -> FakeFs {
    let config = FakefsConfig {
        log_path: Some(dir.path().join("fakelog")),
        webfs_root: dir.path().join("web"),
        sat_url: "https://example.com/pnw.jpg".into(),
        ..FakefsConfig::default()
    };
    FakeFs::builder(config)
        .owner("glenda")
        .clock(clock)
        .build()
        .unwrap()
}

#[tokio::test]
async fn sat_fetches_through_webfs_and_logs() {
    let dir = tempfile::tempdir().unwrap();
    let jpeg: Vec<u8> = [0xFF, 0xD8, 0x00, 0x00, 0xFF, 0xD9].repeat(500);
    lay_out_webfs(&dir.path().join("web"), &jpeg);

    let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
    let fs = service(&dir, clock.clone());
    fs.start();

    let response = fs.dispatch(Request::read("sat.jpg", "glenda", 0, u32::MAX)).await;
    assert_eq!(response, Response::Data(jpeg.clone()));

    let ctl = std::fs::read_to_string(dir.path().join("web/0/ctl")).unwrap();
    assert_eq!(ctl, "url https://example.com/pnw.jpg");

    // Body changes upstream, but the cached copy is still fresh.
    std::fs::write(dir.path().join("web/0/body"), b"newer").unwrap();
    clock.advance(Duration::from_secs(5));
    let cached = fs.dispatch(Request::read("sat.jpg", "glenda", 0, u32::MAX)).await;
    assert_eq!(cached, Response::Data(jpeg));

    clock.advance(Duration::from_secs(30));
    let refreshed = fs.dispatch(Request::read("sat.jpg", "glenda", 0, u32::MAX)).await;
    assert_eq!(refreshed, Response::Data(b"newer".to_vec()));

    fs.stop();

    let log = std::fs::read_to_string(dir.path().join("fakelog")).unwrap();
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].ends_with(" - fakefs started"));
    assert!(lines[1].ends_with(" - sat read done with 3000 bytes"));
    assert!(lines[2].ends_with(" - sat served cached 3000 bytes"));
    assert!(lines[3].ends_with(" - sat read done with 5 bytes"));
    assert!(lines[4].ends_with(" - fakefs stopped"));
}

#[tokio::test]
async fn sat_without_webfs_reports_dependency() {
    let dir = tempfile::tempdir().unwrap();
    let fs = service(&dir, Arc::new(ManualClock::at_unix(0)));

    let response = fs.dispatch(Request::read("sat.jpg", "glenda", 0, 1024)).await;
    assert_eq!(response, Response::error("run webfs first"));
    assert!(fs.fetch_cache().fetched_at().await.is_none());
}

#[tokio::test]
async fn honeypot_lands_in_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let fs = service(&dir, Arc::new(ManualClock::at_unix(0)));

    fs.dispatch(Request::read("honeypot", "mallory", 0, 64)).await;
    fs.dispatch(Request::write("honeypot", "mallory", "drop table")).await;

    let log = std::fs::read_to_string(dir.path().join("fakelog")).unwrap();
    let lines: Vec<_> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with(" - mallory - read the honeypot"));
    assert!(lines[1].ends_with(" - mallory - write the honeypot"));
}
