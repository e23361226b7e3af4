use std::{
    io::Cursor,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use flume::{Receiver, RecvTimeoutError, Sender};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, warn};
use url::Url;

use super::{MediaEventKind, emit};
use crate::{
    audio::{error::MediaError, traits::MediaElement},
    event::events::Event,
};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

enum Command {
    Load {
        token: u64,
        url: Url,
        duration_hint: Option<Duration>,
    },
    Play,
    Pause,
    Seek(Duration),
    Volume(f32),
    Shutdown,
}

/// Real output through the default audio device. The device, sink and
/// downloads live on one dedicated thread driven by commands.
pub struct RodioElement {
    commands: Sender<Command>,
    thread: Option<JoinHandle<()>>,
    loaded: bool,
    duration_millis: Arc<AtomicU64>,
}

impl RodioElement {
    pub fn new(event_tx: Sender<Event>) -> Result<Self, MediaError> {
        let (commands, rx) = flume::unbounded();
        let (ready_tx, ready_rx) = flume::bounded(1);
        let duration_millis = Arc::new(AtomicU64::new(0));

        let shared_duration = duration_millis.clone();
        let thread = thread::Builder::new()
            .name("musrec-audio".into())
            .spawn(move || {
                let mut stream = match OutputStreamBuilder::open_default_stream() {
                    Ok(stream) => {
                        let _ = ready_tx.send(Ok(()));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(MediaError::Device(e.to_string())));
                        return;
                    }
                };
                stream.log_on_drop(false);
                run(&stream, rx, event_tx, shared_duration);
            })
            .map_err(|e| MediaError::Device(e.to_string()))?;

        ready_rx
            .recv()
            .map_err(|_| MediaError::Device("audio thread exited".into()))??;

        Ok(Self {
            commands,
            thread: Some(thread),
            loaded: false,
            duration_millis,
        })
    }

    fn send(&self, command: Command) -> Result<(), MediaError> {
        self.commands
            .send(command)
            .map_err(|_| MediaError::Device("audio thread is gone".into()))
    }
}

impl MediaElement for RodioElement {
    fn load(
        &mut self,
        token: u64,
        url: &Url,
        duration_hint: Option<Duration>,
    ) -> Result<(), MediaError> {
        self.duration_millis.store(0, Ordering::Relaxed);
        self.send(Command::Load {
            token,
            url: url.clone(),
            duration_hint,
        })?;
        self.loaded = true;
        Ok(())
    }

    fn play(&mut self) -> Result<(), MediaError> {
        if !self.loaded {
            return Err(MediaError::Playback("no source loaded".into()));
        }
        self.send(Command::Play)
    }

    fn pause(&mut self) {
        let _ = self.send(Command::Pause);
    }

    fn seek(&mut self, position: Duration) {
        let _ = self.send(Command::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        let _ = self.send(Command::Volume(volume.clamp(0.0, 1.0)));
    }

    fn duration(&self) -> Option<Duration> {
        match self.duration_millis.load(Ordering::Relaxed) {
            0 => None,
            millis => Some(Duration::from_millis(millis)),
        }
    }
}

impl Drop for RodioElement {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run(
    stream: &OutputStream,
    rx: Receiver<Command>,
    event_tx: Sender<Event>,
    duration_millis: Arc<AtomicU64>,
) {
    let client = reqwest::blocking::Client::new();
    let mut sink: Option<Sink> = None;
    let mut token = 0;
    let mut volume = 1.0;
    let mut ended = false;

    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(Command::Load {
                token: next,
                url,
                duration_hint,
            }) => {
                if let Some(old) = sink.take() {
                    old.stop();
                }
                token = next;
                ended = false;
                emit(&event_tx, token, MediaEventKind::LoadStart);

                match open_sink(stream, &client, &url) {
                    Ok((new_sink, total)) => {
                        new_sink.set_volume(volume);
                        sink = Some(new_sink);
                        if let Some(duration) = total.or(duration_hint) {
                            duration_millis.store(duration.as_millis() as u64, Ordering::Relaxed);
                            emit(&event_tx, token, MediaEventKind::DurationChange(duration));
                        }
                        emit(&event_tx, token, MediaEventKind::CanPlay);
                    }
                    Err(e) => {
                        warn!(%url, error = %e, "Failed to load audio");
                        emit(&event_tx, token, MediaEventKind::Error(e.to_string()));
                    }
                }
            }
            Ok(Command::Play) => {
                if let Some(sink) = &sink {
                    sink.play();
                }
            }
            Ok(Command::Pause) => {
                if let Some(sink) = &sink {
                    sink.pause();
                }
            }
            Ok(Command::Seek(position)) => {
                if let Some(sink) = &sink {
                    if let Err(e) = sink.try_seek(position) {
                        debug!(error = %e, "Seek not supported by source");
                    }
                    emit(&event_tx, token, MediaEventKind::TimeUpdate(sink.get_pos()));
                }
            }
            Ok(Command::Volume(next)) => {
                volume = next;
                if let Some(sink) = &sink {
                    sink.set_volume(volume);
                }
            }
            Ok(Command::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        if let Some(sink) = &sink
            && !sink.is_paused()
            && !ended
        {
            if sink.empty() {
                ended = true;
                emit(&event_tx, token, MediaEventKind::Ended);
            } else {
                emit(&event_tx, token, MediaEventKind::TimeUpdate(sink.get_pos()));
            }
        }
    }
}

fn open_sink(
    stream: &OutputStream,
    client: &reqwest::blocking::Client,
    url: &Url,
) -> Result<(Sink, Option<Duration>), MediaError> {
    let response = client
        .get(url.clone())
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| MediaError::Load(e.to_string()))?;
    let bytes = response
        .bytes()
        .map_err(|e| MediaError::Load(e.to_string()))?;

    let source =
        Decoder::new(Cursor::new(bytes.to_vec())).map_err(|e| MediaError::Decode(e.to_string()))?;
    let total = source.total_duration();

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok((sink, total))
}
