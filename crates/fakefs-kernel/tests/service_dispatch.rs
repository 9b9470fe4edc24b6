//! End-to-end tests through the dispatcher.
//!
//! Every test builds a full `FakeFs` with a manual clock, an in-memory audit
//! sink and a scripted fetch client, then talks to it only via `Request`s.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fakefs_kernel::files::honeypot::{DECOY, WRITE_WARNING};
use fakefs_kernel::files::rot13::rot13_in_place;
use fakefs_kernel::{
    Clock, FakeFs, FakefsConfig, FetchClient, FetchError, ManualClock, MemorySink, Request, Response,
};

// ============================================================================
// Shared test setup
// ============================================================================

#[derive(Default)]
struct ScriptedFetch {
    fetches: AtomicUsize,
    offline: AtomicBool,
}

#[async_trait]
impl FetchClient for ScriptedFetch {
    async fn is_available(&self) -> bool {
        !self.offline.load(Ordering::SeqCst)
    }

    async fn fetch(&self, _url: &str, _limit: usize) -> Result<Vec<u8>, FetchError> {
        let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(vec![n as u8; 2048])
    }
}

struct Harness {
    fs: FakeFs,
    clock: Arc<ManualClock>,
    sink: Arc<MemorySink>,
    fetch: Arc<ScriptedFetch>,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::at_unix(1_700_000_000));
    let sink = Arc::new(MemorySink::new());
    let fetch = Arc::new(ScriptedFetch::default());
    let fs = FakeFs::builder(FakefsConfig::default())
        .owner("glenda")
        .clock(clock.clone())
        .audit_sink(sink.clone())
        .fetch_client(fetch.clone())
        .build()
        .expect("build fakefs");
    Harness {
        fs,
        clock,
        sink,
        fetch,
    }
}

async fn read(fs: &FakeFs, file: &str) -> Response {
    fs.dispatch(Request::read(file, "glenda", 0, u32::MAX)).await
}

fn data(response: Response) -> Vec<u8> {
    match response {
        Response::Data(bytes) => bytes,
        other => panic!("expected data, got {:?}", other),
    }
}

// ============================================================================
// rot13
// ============================================================================

#[tokio::test]
async fn rot13_write_then_read() {
    let h = harness();
    let input = "Hello, World!".repeat(5000 / 13 + 1).into_bytes()[..5000].to_vec();

    let written = h.fs.dispatch(Request::write("rot13", "glenda", input.clone())).await;
    assert_eq!(written, Response::Written(5000));

    let out = data(read(&h.fs, "rot13").await);
    let mut expected = input;
    rot13_in_place(&mut expected);
    assert_eq!(out, expected);
    assert!(String::from_utf8(out).unwrap().starts_with("Uryyb, Jbeyq!Uryyb"));
}

#[tokio::test]
async fn rot13_oversized_write_truncates_silently() {
    let h = harness();
    let input = "Hello, World!".repeat(1000).into_bytes();
    let capacity = h.fs.config().rot13_capacity;

    let written = h.fs.dispatch(Request::write("rot13", "glenda", input.clone())).await;
    assert_eq!(written, Response::Written(input.len() as u32));

    let out = data(read(&h.fs, "rot13").await);
    assert_eq!(out.len(), capacity - 1);
    assert!(!out.contains(&0));
    assert_eq!(&out[..13], b"Uryyb, Jbeyq!");
}

#[tokio::test]
async fn rot13_twice_is_identity() {
    let h = harness();
    let original = b"TheQuickBrownFoxJumpsOverTheLazyDog".to_vec();

    h.fs.dispatch(Request::write("rot13", "glenda", original.clone())).await;
    let once = data(read(&h.fs, "rot13").await);
    h.fs.dispatch(Request::write("rot13", "glenda", once)).await;
    let twice = data(read(&h.fs, "rot13").await);

    assert_eq!(twice, original);
}

#[tokio::test]
async fn rot13_buffer_is_shared_between_callers() {
    let h = harness();
    h.fs.dispatch(Request::write("rot13", "alice", "secret")).await;
    let seen_by_bob = data(h.fs.dispatch(Request::read("rot13", "bob", 0, 100)).await);
    assert_eq!(seen_by_bob, b"frperg");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rot13_concurrent_writes_never_tear() {
    let h = Arc::new(harness());
    let len = 8000;

    let mut tasks = Vec::new();
    for i in 0..16 {
        let h = h.clone();
        tasks.push(tokio::spawn(async move {
            let fill = if i % 2 == 0 { b'a' } else { b'b' };
            h.fs.dispatch(Request::write("rot13", "w", vec![fill; len])).await;
            let out = data(read(&h.fs, "rot13").await);
            assert_eq!(out.len(), len);
            let first = out[0];
            assert!(first == b'n' || first == b'o');
            assert!(out.iter().all(|&b| b == first), "torn buffer observed");
        }));
    }
    for t in tasks {
        t.await.unwrap();
    }
}

// ============================================================================
// honeypot
// ============================================================================

#[tokio::test]
async fn honeypot_write_accepts_and_warns() {
    let h = harness();

    let response = h.fs.dispatch(Request::write("honeypot", "mallory", "test")).await;
    assert_eq!(
        response,
        Response::Error {
            message: WRITE_WARNING.to_string(),
            count: Some(4),
        }
    );

    let lines = h.sink.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("mallory"));
    assert!(lines[0].ends_with("write the honeypot"));
}

#[tokio::test]
async fn honeypot_read_returns_decoy() {
    let h = harness();
    let out = data(h.fs.dispatch(Request::read("honeypot", "mallory", 0, 1024)).await);
    assert_eq!(out, DECOY.as_bytes());
    assert_eq!(h.sink.len(), 1);
}

#[tokio::test]
async fn honeypot_lines_have_non_decreasing_timestamps() {
    let h = harness();
    let mut stamps = Vec::new();

    for i in 0..5 {
        h.clock.advance(Duration::from_secs(i * 30));
        h.fs.dispatch(Request::read("honeypot", "eve", 0, 64)).await;
        h.fs.dispatch(Request::write("honeypot", "eve", "x")).await;
        stamps.push(h.clock.unix_secs());
    }

    let lines = h.sink.lines();
    assert_eq!(lines.len(), 10);
    assert!(lines.iter().all(|l| l.contains(" - eve - ")));

    // ctime strings are not sortable, so compare against the clock readings
    // they were taken from.
    for (pair, stamp) in lines.chunks(2).zip(stamps) {
        let expected = fakefs_kernel::audit::ctime(
            std::time::UNIX_EPOCH + Duration::from_secs(stamp),
        );
        assert!(pair[0].starts_with(&expected));
        assert!(pair[1].starts_with(&expected));
    }
}

// ============================================================================
// sat.jpg
// ============================================================================

#[tokio::test]
async fn sat_reads_within_window_share_one_fetch() {
    let h = harness();

    let first = data(read(&h.fs, "sat.jpg").await);
    h.clock.advance(Duration::from_secs(10));
    let second = data(read(&h.fs, "sat.jpg").await);

    assert_eq!(first, second);
    assert_eq!(first.len(), 2048);
    assert_eq!(h.fetch.fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn sat_read_after_window_fetches_again() {
    let h = harness();

    let first = data(read(&h.fs, "sat.jpg").await);
    h.clock.advance(Duration::from_secs(20));
    let second = data(read(&h.fs, "sat.jpg").await);

    assert_ne!(first, second);
    assert_eq!(h.fetch.fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn sat_offset_reads_slice_the_cached_image() {
    let h = harness();
    let chunk = data(h.fs.dispatch(Request::read("sat.jpg", "glenda", 2000, 100)).await);
    assert_eq!(chunk.len(), 48);
}

#[tokio::test]
async fn sat_without_webfs_fails_cleanly() {
    let h = harness();
    h.fetch.offline.store(true, Ordering::SeqCst);

    let response = read(&h.fs, "sat.jpg").await;
    assert_eq!(response, Response::error("run webfs first"));
    assert!(h.fs.fetch_cache().fetched_at().await.is_none());
    assert!(h.fs.fetch_cache().cached().await.is_empty());
    assert!(h.sink.is_empty());
}

// ============================================================================
// generators and routing
// ============================================================================

#[tokio::test]
async fn tyme_embeds_clock() {
    let h = harness();
    let out = String::from_utf8(data(read(&h.fs, "tyme").await)).unwrap();
    assert!(out.contains("1700000000 seconds"));
}

#[tokio::test]
async fn backtalk_names_caller() {
    let h = harness();
    let out = data(h.fs.dispatch(Request::read("backtalk", "dave", 0, 256)).await);
    assert_eq!(out, b"I'm sorry dave, I'm afraid I can't do that.\n");
}

#[tokio::test]
async fn i_ching_has_six_lines() {
    let h = harness();
    let out = String::from_utf8(data(read(&h.fs, "i-ching").await)).unwrap();
    assert_eq!(out.lines().count(), 6);
}

#[tokio::test]
async fn writes_to_read_only_files_are_unsupported() {
    let h = harness();
    for file in ["tyme", "backtalk", "i-ching", "sat.jpg"] {
        let response = h.fs.dispatch(Request::write(file, "glenda", "x")).await;
        assert!(response.is_error(), "{file} accepted a write");
    }
    assert_eq!(h.fetch.fetches.load(Ordering::SeqCst), 0);
    assert!(h.sink.is_empty());
}
