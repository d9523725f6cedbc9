//! Key events reaching the playback controller.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use common::{write_wav, DroppingBackend, PacedBackend};
use shotgunner::{
    KeyEvent, KeyEventKind, PlaybackController, PlaybackError, PlaybackState, TriggerDispatcher, VirtualKey,
    TRIGGER_KEY,
};

fn controller_with(backend: impl shotgunner::audio::AudioBackend + 'static) -> (tempfile::TempDir, Arc<PlaybackController>) {
    let dir = tempfile::tempdir().unwrap();
    let path = write_wav(dir.path(), "shot.wav", 8_000, Duration::from_millis(150));
    let controller = Arc::new(PlaybackController::new(backend, Duration::from_millis(100)));
    controller.initialize(&path).unwrap();
    (dir, controller)
}

fn never_fatal() -> shotgunner::input::FatalHandler {
    Arc::new(|e: PlaybackError| panic!("unexpected playback error: {}", e))
}

#[test]
fn unrelated_events_are_ignored() {
    let backend = PacedBackend::new();
    let (_dir, controller) = controller_with(backend.clone());
    let dispatcher = TriggerDispatcher::new(TRIGGER_KEY, controller.clone(), never_fatal());

    assert!(!dispatcher.handle(KeyEvent::new(KeyEventKind::KeyUp, TRIGGER_KEY)));
    assert!(!dispatcher.handle(KeyEvent::new(KeyEventKind::SysKeyDown, TRIGGER_KEY)));
    assert!(!dispatcher.handle(KeyEvent::new(KeyEventKind::KeyDown, VirtualKey::from_ascii(b'E'))));

    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(backend.plays.load(Ordering::SeqCst), 0);
    assert_eq!(controller.state(), PlaybackState::Idle);
}

#[test]
fn trigger_key_press_plays_without_blocking() {
    let backend = PacedBackend::new();
    let (_dir, controller) = controller_with(backend.clone());
    let dispatcher = TriggerDispatcher::new(TRIGGER_KEY, controller.clone(), never_fatal());
    let callback = dispatcher.into_callback();

    let started = std::time::Instant::now();
    callback(KeyEvent::new(KeyEventKind::KeyDown, TRIGGER_KEY));
    assert!(started.elapsed() < Duration::from_millis(100));

    std::thread::sleep(Duration::from_millis(40));
    assert_eq!(controller.state(), PlaybackState::Playing);

    // Held key: repeats land while playing and are dropped
    callback(KeyEvent::new(KeyEventKind::KeyDown, TRIGGER_KEY));
    callback(KeyEvent::new(KeyEventKind::KeyDown, TRIGGER_KEY));

    controller.shutdown();
    assert_eq!(backend.plays.load(Ordering::SeqCst), 1);
}

#[test]
fn dispatcher_listens_for_its_own_key() {
    let backend = PacedBackend::new();
    let (_dir, controller) = controller_with(backend.clone());
    let key = VirtualKey::from_ascii(b'E');
    let dispatcher = TriggerDispatcher::new(key, controller.clone(), never_fatal());

    assert_eq!(dispatcher.key(), key);
    assert!(!dispatcher.handle(KeyEvent::new(KeyEventKind::KeyDown, TRIGGER_KEY)));
    assert!(dispatcher.handle(KeyEvent::new(KeyEventKind::KeyDown, key)));

    std::thread::sleep(Duration::from_millis(40));
    controller.shutdown();
    assert_eq!(backend.plays.load(Ordering::SeqCst), 1);
}

#[test]
fn playback_failure_reaches_fatal_handler() {
    let (_dir, controller) = controller_with(DroppingBackend);
    let (tx, rx) = mpsc::channel();
    let calls = Arc::new(AtomicUsize::new(0));
    let counted = calls.clone();
    let on_fatal: shotgunner::input::FatalHandler = Arc::new(move |e: PlaybackError| {
        counted.fetch_add(1, Ordering::SeqCst);
        let _ = tx.send(e);
    });
    let dispatcher = TriggerDispatcher::new(TRIGGER_KEY, controller, on_fatal);

    assert!(dispatcher.handle(KeyEvent::new(KeyEventKind::KeyDown, TRIGGER_KEY)));

    let err = rx.recv_timeout(Duration::from_secs(2)).unwrap();
    assert!(matches!(err, PlaybackError::Interrupted));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
