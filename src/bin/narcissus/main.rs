//! Narcissus mirror entrypoint: camera loop, voice worker, and MJPEG stream
//! started as one process.
//!
//! # Threads
//!
//! - Processing loop (main thread): vision pipeline, then the inline dispatcher
//! - Voice worker: stdin utterances through the wake-word gate onto the event bus
//! - Stream publisher: serves composited frames at `/video_feed`

mod signals;

use anyhow::Result;
use narcissus::bridge::FrameBridge;
use narcissus::camera::{DirectoryFrameSource, FrameSource, SyntheticFrameSource};
use narcissus::collaborators::{
    BrowserMediaLauncher, DisabledSearch, DuckDuckGoSearch, HttpMirrorUi, WebSearch,
    DUCKDUCKGO_ENDPOINT,
};
use narcissus::config::MirrorConfig;
use narcissus::dispatch::{Collaborators, Dispatcher};
use narcissus::events::EventBus;
use narcissus::interpreter::OllamaInterpreter;
use narcissus::runtime::{MirrorRuntime, Perception};
use narcissus::stream::StreamServer;
use narcissus::vision::replay::{JsonlLandmarks, LandmarkKind};
use narcissus::vision::NoLandmarks;
use narcissus::voice::{StdinSpeechSource, VoiceListener};
use narcissus::{init_logging, init_tracing, log_debug, log_debug_content, log_file_path, log_panic};
use std::panic;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::info;

use crate::signals::{install_shutdown_handler, shutdown_flag};

fn main() -> Result<()> {
    let config = MirrorConfig::parse_args()?;
    init_logging(&config);
    init_tracing(&config);
    install_panic_hook();
    log_debug("=== Narcissus Mirror Started ===");
    log_debug(&format!("Log file: {:?}", log_file_path()));

    install_shutdown_handler()?;

    let camera = open_camera(&config)?;
    let perception = open_perception(&config)?;
    let dispatcher = Dispatcher::new(EventBus::new(), build_collaborators(&config));

    let bridge = FrameBridge::new();
    let mut streamer = if config.no_stream {
        None
    } else {
        Some(StreamServer::spawn(&config.stream_config(), bridge.clone())?)
    };
    let mut voice = if config.no_voice {
        None
    } else {
        Some(VoiceListener::start(
            Box::new(StdinSpeechSource::spawn()?),
            dispatcher.sender(),
            config.no_alerts,
        )?)
    };

    let mut runtime = MirrorRuntime::new(
        camera,
        perception,
        &config.gesture_config(),
        config.compositor_config(),
        bridge,
        dispatcher,
    );
    let frames = runtime.run(shutdown_flag(), config.max_frames, config.loop_sleep());

    if let Some(listener) = voice.as_mut() {
        listener.stop();
    }
    if let Some(server) = streamer.as_mut() {
        server.stop();
    }
    runtime.shutdown();
    info!(frames, "narcissus stopped");
    log_debug(&format!("=== Narcissus Mirror Stopped after {frames} frames ==="));
    Ok(())
}

fn open_camera(config: &MirrorConfig) -> Result<Box<dyn FrameSource>> {
    Ok(match &config.camera_dir {
        Some(dir) => Box::new(DirectoryFrameSource::open(dir)?),
        None => Box::new(SyntheticFrameSource::new(
            config.frame_width,
            config.frame_height,
        )),
    })
}

fn open_perception(config: &MirrorConfig) -> Result<Perception> {
    Ok(match &config.landmarks {
        Some(path) => {
            let face = JsonlLandmarks::open(path, LandmarkKind::Face)?;
            let hand = JsonlLandmarks::open(path, LandmarkKind::Hand)?;
            info!(
                faces = face.len(),
                hands = hand.len(),
                "replaying recorded landmarks"
            );
            Perception {
                face: Box::new(face),
                hand: Box::new(hand),
            }
        }
        None => Perception {
            face: Box::new(NoLandmarks),
            hand: Box::new(NoLandmarks),
        },
    })
}

fn build_collaborators(config: &MirrorConfig) -> Collaborators {
    let search: Box<dyn WebSearch> = if config.no_search {
        Box::new(DisabledSearch)
    } else {
        Box::new(DuckDuckGoSearch::new(
            DUCKDUCKGO_ENDPOINT,
            Duration::from_millis(config.search_timeout_ms),
        ))
    };
    Collaborators {
        interpreter: Box::new(OllamaInterpreter::from_config(config)),
        ui: Box::new(HttpMirrorUi::from_config(config)),
        search,
        media: Box::new(BrowserMediaLauncher::default()),
    }
}

fn install_panic_hook() {
    static PANIC_HOOK_INSTALLED: OnceLock<()> = OnceLock::new();
    PANIC_HOOK_INSTALLED.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            log_panic(info);
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".to_string());
            log_debug(&format!("panic at {location}"));
            log_debug_content(&format!("panic: {info}"));
            previous(info);
        }));
    });
}
