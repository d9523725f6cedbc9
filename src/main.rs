use std::io::{self, BufRead, Write};

use tracing::info;

use shotgunner::{logging, shutdown, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    logging::init();
    let config = Config::load();

    info!("Program started");
    info!("Press Ctrl+C to exit.");

    run(&config).await;

    if config.pause_on_exit {
        pause();
    }
}

#[cfg(windows)]
async fn run(config: &Config) {
    use std::sync::{mpsc, Arc};
    use std::thread;

    use anyhow::Context;
    use shotgunner::audio::DeviceBackend;
    use shotgunner::input::KeyboardHook;
    use shotgunner::{PlaybackController, PlaybackError, TriggerDispatcher, TRIGGER_KEY};

    let controller = Arc::new(PlaybackController::new(DeviceBackend, config.output_buffer()));
    let sound_path = config.resolve_sound_path();
    if let Err(e) = controller
        .initialize(&sound_path)
        .with_context(|| format!("failed to initialize sound {}", sound_path.display()))
    {
        logging::fatal(format!("{:#}", e));
    }

    let dispatcher = TriggerDispatcher::new(
        TRIGGER_KEY,
        controller.clone(),
        Arc::new(|e: PlaybackError| {
            logging::fatal(format!("playback failed: {}", e));
        }),
    );

    // The hook only fires while its installing thread pumps messages
    let (ready_tx, ready_rx) = mpsc::sync_channel(1);
    let hook_thread = thread::Builder::new()
        .name("keyboard-hook".to_string())
        .spawn(move || {
            let mut hook = match KeyboardHook::start(dispatcher.into_callback()) {
                Ok(hook) => hook,
                Err(e) => logging::fatal(format!("failed to install keyboard hook: {}", e)),
            };
            let _ = ready_tx.send(hook.quit_handle());
            hook.run_loop();
            hook.stop();
        });
    let hook_thread = match hook_thread {
        Ok(handle) => handle,
        Err(e) => logging::fatal(format!("failed to start keyboard hook thread: {}", e)),
    };
    let quit = match ready_rx.recv() {
        Ok(quit) => quit,
        Err(_) => logging::fatal("keyboard hook thread exited during startup"),
    };

    let reason = shutdown::wait_for_signal().await;
    tracing::debug!("Shutdown requested: {:?}", reason);
    info!("Exiting...");

    quit.request();
    if hook_thread.join().is_err() {
        tracing::error!("Keyboard hook thread panicked");
    }
    controller.shutdown();
}

#[cfg(not(windows))]
async fn run(_config: &Config) {
    logging::fatal("the global keyboard hook is only available on Windows");
}

fn pause() {
    print!("Press Enter to continue...");
    let _ = io::stdout().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
