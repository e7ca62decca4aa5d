//! Local audio output backed by rodio
//!
//! A dedicated worker thread owns the output stream and the current sink;
//! the [`RodioDevice`] handle only posts messages to it. HTTP sources are
//! streamed: a downloader thread appends bytes to a shared buffer that the
//! decoder reads (and probes) through a blocking `Read + Seek` adapter.
//!
//! Buffering granularity ("waiting for data" mid-play) is not observable
//! through rodio, so this backend never emits `Waiting`; live UIs see
//! `Loading` until the decoder is ready, then `Playing`.

use std::io::{self, Read, Seek, SeekFrom};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::{mpsc, Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::device::{AudioDevice, DeviceError, DeviceEvent, DeviceEventKind};

/// Bytes downloaded before the decoder is allowed to probe the stream.
const PREBUFFER_BYTES: usize = 64 * 1024;

/// Download chunk size.
const CHUNK_BYTES: usize = 8 * 1024;

/// Worker poll interval; also bounds auto-advance detection latency.
const TICK: Duration = Duration::from_millis(200);

/// Minimum interval between two position reports.
const POSITION_EVERY: Duration = Duration::from_millis(500);

enum WorkerMsg {
    Load { url: String, generation: u64 },
    Loaded {
        generation: u64,
        result: Result<Decoder<StreamReader>, String>,
    },
    Play,
    Pause,
    Seek(f64),
    SetVolume(f32),
    Release,
}

/// rodio-backed implementation of [`AudioDevice`].
pub struct RodioDevice {
    tx: Sender<WorkerMsg>,
    worker: Option<thread::JoinHandle<()>>,
}

impl RodioDevice {
    /// Spawns the audio worker thread. Output-stream failures are reported
    /// asynchronously on `events` (generation 0), not here.
    pub fn spawn(events: UnboundedSender<DeviceEvent>) -> Result<Self, DeviceError> {
        let (tx, rx) = mpsc::channel();
        let loader_tx = tx.clone();
        let worker = thread::Builder::new()
            .name("ondes-audio".into())
            .spawn(move || worker_loop(rx, loader_tx, events))
            .map_err(|e| DeviceError::new(format!("could not start audio worker: {e}")))?;
        Ok(Self {
            tx,
            worker: Some(worker),
        })
    }

    fn post(&self, msg: WorkerMsg) {
        if self.tx.send(msg).is_err() {
            debug!("Audio worker is gone; dropping device message");
        }
    }
}

impl AudioDevice for RodioDevice {
    fn load(&mut self, url: &str, generation: u64) {
        self.post(WorkerMsg::Load {
            url: url.to_string(),
            generation,
        });
    }

    fn play(&mut self) -> Result<(), DeviceError> {
        self.tx
            .send(WorkerMsg::Play)
            .map_err(|_| DeviceError::new("audio device unavailable"))
    }

    fn pause(&mut self) {
        self.post(WorkerMsg::Pause);
    }

    fn seek(&mut self, position: f64) {
        self.post(WorkerMsg::Seek(position));
    }

    fn set_volume(&mut self, volume: f32) {
        self.post(WorkerMsg::SetVolume(volume));
    }

    fn release(&mut self) {
        self.post(WorkerMsg::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop(
    rx: Receiver<WorkerMsg>,
    loader_tx: Sender<WorkerMsg>,
    events: UnboundedSender<DeviceEvent>,
) {
    let stream: Option<OutputStream> = match OutputStreamBuilder::open_default_stream() {
        Ok(mut stream) => {
            // rodio logs to stderr when the stream is dropped; keep our own
            // teardown quiet.
            stream.log_on_drop(false);
            Some(stream)
        }
        Err(e) => {
            let _ = events.send(DeviceEvent::new(
                0,
                DeviceEventKind::Failed(format!("no audio output: {e}")),
            ));
            None
        }
    };

    let mut sink: Option<Sink> = None;
    let mut generation: u64 = 0;
    let mut volume: f32 = 1.0;
    let mut want_play = false;
    let mut playing = false;
    let mut loaded = false;
    let mut duration: Option<Duration> = None;

    // Position accounting: accumulated elapsed plus the running segment.
    let mut accumulated = Duration::ZERO;
    let mut started_at: Option<Instant> = None;
    let mut last_position_emit = Instant::now();

    let emit = |generation: u64, kind: DeviceEventKind| {
        let _ = events.send(DeviceEvent::new(generation, kind));
    };

    loop {
        match rx.recv_timeout(TICK) {
            Ok(WorkerMsg::Load { url, generation: gen }) => {
                if let Some(old) = sink.take() {
                    old.stop();
                }
                generation = gen;
                want_play = false;
                playing = false;
                loaded = false;
                duration = None;
                accumulated = Duration::ZERO;
                started_at = None;

                if stream.is_none() {
                    emit(gen, DeviceEventKind::Failed("audio output unavailable".into()));
                    continue;
                }

                // Connect and probe off-thread so a slow host cannot block
                // pause/volume commands for the current sink.
                let tx = loader_tx.clone();
                thread::spawn(move || {
                    let result = open_stream_source(&url);
                    let _ = tx.send(WorkerMsg::Loaded {
                        generation: gen,
                        result,
                    });
                });
            }
            Ok(WorkerMsg::Loaded { generation: gen, result }) => {
                if gen != generation {
                    // A newer load superseded this one while it was connecting.
                    continue;
                }
                match result {
                    Ok(decoder) => {
                        let Some(stream) = stream.as_ref() else { continue };
                        duration = decoder.total_duration();
                        let new_sink = Sink::connect_new(stream.mixer());
                        new_sink.set_volume(volume);
                        new_sink.pause();
                        new_sink.append(decoder);
                        loaded = true;
                        emit(gen, DeviceEventKind::CanPlay);
                        if want_play {
                            new_sink.play();
                            playing = true;
                            started_at = Some(Instant::now());
                            emit(gen, DeviceEventKind::Playing);
                        }
                        sink = Some(new_sink);
                    }
                    Err(message) => {
                        emit(gen, DeviceEventKind::Failed(message));
                    }
                }
            }
            Ok(WorkerMsg::Play) => {
                want_play = true;
                if let Some(sink) = sink.as_ref() {
                    if loaded {
                        sink.play();
                        if !playing {
                            playing = true;
                            started_at = Some(Instant::now());
                        }
                        emit(generation, DeviceEventKind::Playing);
                    }
                }
            }
            Ok(WorkerMsg::Pause) => {
                want_play = false;
                if let Some(sink) = sink.as_ref() {
                    sink.pause();
                }
                if playing {
                    if let Some(started) = started_at.take() {
                        accumulated += started.elapsed();
                    }
                    playing = false;
                }
            }
            Ok(WorkerMsg::Seek(position)) => {
                if let Some(sink) = sink.as_ref() {
                    match sink.try_seek(Duration::from_secs_f64(position.max(0.0))) {
                        Ok(()) => {
                            accumulated = Duration::from_secs_f64(position.max(0.0));
                            started_at = playing.then(Instant::now);
                        }
                        Err(e) => debug!("Seek not supported by this source: {e:?}"),
                    }
                }
            }
            Ok(WorkerMsg::SetVolume(v)) => {
                volume = v;
                if let Some(sink) = sink.as_ref() {
                    sink.set_volume(v);
                }
            }
            Ok(WorkerMsg::Release) => {
                if let Some(sink) = sink.take() {
                    sink.stop();
                }
                break;
            }
            Err(RecvTimeoutError::Timeout) => {
                if playing {
                    // Natural end: the sink drained everything we appended.
                    if loaded && sink.as_ref().is_some_and(Sink::empty) {
                        playing = false;
                        want_play = false;
                        loaded = false;
                        if let Some(started) = started_at.take() {
                            accumulated += started.elapsed();
                        }
                        emit(generation, DeviceEventKind::Ended);
                    } else if last_position_emit.elapsed() >= POSITION_EVERY {
                        last_position_emit = Instant::now();
                        let position = accumulated
                            + started_at.map_or(Duration::ZERO, |s| s.elapsed());
                        emit(
                            generation,
                            DeviceEventKind::Position {
                                position: position.as_secs_f64(),
                                duration: duration.map_or(0.0, |d| d.as_secs_f64()),
                            },
                        );
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

/// Connects to `url` and returns a decoder over the live byte stream.
fn open_stream_source(url: &str) -> Result<Decoder<StreamReader>, String> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| format!("stream connect failed: {e}"))?;
    let body = response.into_body().into_reader();
    let reader = StreamReader::spawn(Box::new(body));
    reader.wait_for_prebuffer();
    Decoder::new(reader).map_err(|e| format!("stream decode failed: {e}"))
}

#[derive(Default)]
struct StreamBufferState {
    buffer: Vec<u8>,
    eof: bool,
    failed: Option<String>,
}

struct StreamBuffer {
    state: Mutex<StreamBufferState>,
    wakeup: Condvar,
}

/// Blocking `Read + Seek` view over a growing download buffer.
///
/// The whole stream stays buffered so the decoder can re-probe and seek
/// backwards; sessions are bounded in practice by the widget lifetime.
pub struct StreamReader {
    shared: Arc<StreamBuffer>,
    pos: u64,
}

impl StreamReader {
    fn spawn(mut body: Box<dyn Read + Send>) -> Self {
        let shared = Arc::new(StreamBuffer {
            state: Mutex::new(StreamBufferState::default()),
            wakeup: Condvar::new(),
        });

        let writer = shared.clone();
        thread::Builder::new()
            .name("ondes-stream".into())
            .spawn(move || {
                let mut chunk = [0u8; CHUNK_BYTES];
                loop {
                    match body.read(&mut chunk) {
                        Ok(0) => {
                            writer.state.lock().unwrap().eof = true;
                            writer.wakeup.notify_all();
                            break;
                        }
                        Ok(n) => {
                            writer.state.lock().unwrap().buffer.extend_from_slice(&chunk[..n]);
                            writer.wakeup.notify_all();
                        }
                        Err(e) => {
                            let mut state = writer.state.lock().unwrap();
                            state.failed = Some(format!("stream read error: {e}"));
                            writer.wakeup.notify_all();
                            break;
                        }
                    }
                }
            })
            .expect("could not spawn stream download thread");

        Self { shared, pos: 0 }
    }

    /// Blocks until enough data arrived for the decoder to probe the format.
    fn wait_for_prebuffer(&self) {
        let mut state = self.shared.state.lock().unwrap();
        while state.buffer.len() < PREBUFFER_BYTES && !state.eof && state.failed.is_none() {
            state = self.shared.wakeup.wait(state).unwrap();
        }
    }
}

impl Read for StreamReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let mut state = self.shared.state.lock().unwrap();
        loop {
            if let Some(message) = &state.failed {
                return Err(io::Error::new(io::ErrorKind::Other, message.clone()));
            }
            let available = state.buffer.len() as u64;
            if self.pos < available {
                let start = self.pos as usize;
                let n = out.len().min(state.buffer.len() - start);
                out[..n].copy_from_slice(&state.buffer[start..start + n]);
                self.pos += n as u64;
                return Ok(n);
            }
            if state.eof {
                return Ok(0);
            }
            state = self.shared.wakeup.wait(state).unwrap();
        }
    }
}

impl Seek for StreamReader {
    fn seek(&mut self, target: SeekFrom) -> io::Result<u64> {
        let state = self.shared.state.lock().unwrap();
        let len = state.buffer.len() as i64;
        let new_pos = match target {
            SeekFrom::Start(p) => p as i64,
            SeekFrom::Current(delta) => self.pos as i64 + delta,
            SeekFrom::End(delta) => {
                if !state.eof {
                    // The length of a live stream is unknown until EOF.
                    return Err(io::Error::new(
                        io::ErrorKind::Unsupported,
                        "cannot seek from the end of a live stream",
                    ));
                }
                len + delta
            }
        };
        if new_pos < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start",
            ));
        }
        if new_pos > len {
            warn!(
                requested = new_pos,
                buffered = len,
                "Seek beyond buffered data"
            );
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "seek beyond buffered data",
            ));
        }
        self.pos = new_pos as u64;
        Ok(self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_reader_reads_across_chunks() {
        let data: Vec<u8> = (0..=255u8).cycle().take(CHUNK_BYTES * 2 + 17).collect();
        let reader_src: Box<dyn Read + Send> = Box::new(io::Cursor::new(data.clone()));
        let mut reader = StreamReader::spawn(reader_src);
        reader.wait_for_prebuffer();

        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn test_stream_reader_seeks_within_buffer() {
        let data = vec![7u8; 1024];
        let reader_src: Box<dyn Read + Send> = Box::new(io::Cursor::new(data));
        let mut reader = StreamReader::spawn(reader_src);
        // Drain to EOF so every position is buffered.
        let mut out = Vec::new();
        reader.read_to_end(&mut out).unwrap();

        assert_eq!(reader.seek(SeekFrom::Start(100)).unwrap(), 100);
        let mut byte = [0u8; 1];
        assert_eq!(reader.read(&mut byte).unwrap(), 1);
        assert_eq!(byte[0], 7);
        assert_eq!(reader.seek(SeekFrom::End(-24)).unwrap(), 1000);
        assert!(reader.seek(SeekFrom::Start(4096)).is_err());
    }
}
