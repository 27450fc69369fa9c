use std::{
    collections::VecDeque,
    fs::File,
    io::{ErrorKind, Read},
    path::{Path, PathBuf},
    sync::mpsc::{self, Receiver, TryRecvError},
    thread,
};

use tracing::{info, warn};

use crate::{Result, VisualiserError};

/// Opaque producer of raw MIDI bytes, polled once per frame.
///
/// Neither method may block: both only report what has already arrived.
pub trait ByteSource {
    /// Called once at the start of each frame's poll phase.
    fn begin_poll(&mut self, _step: u64) {}

    /// Number of bytes that can be read right now.
    fn available(&mut self) -> usize;

    /// Copies up to `buf.len()` already-available bytes into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> usize;
}

/// Reads a MIDI character device such as `/dev/midi2`.
///
/// The device is read on a background thread that forwards chunks over a
/// channel; polling only ever drains the channel.
#[derive(Debug)]
pub struct DeviceSource {
    path: PathBuf,
    receiver: Receiver<Vec<u8>>,
    buffer: VecDeque<u8>,
    disconnected: bool,
}

impl DeviceSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| VisualiserError::DeviceUnavailable {
            path: path.clone(),
            source,
        })?;

        let (sender, receiver) = mpsc::channel();
        let reader_path = path.clone();
        thread::Builder::new()
            .name("midi-reader".to_string())
            .spawn(move || read_device(file, &reader_path, sender))?;

        info!(path = %path.display(), "opened MIDI device");
        Ok(Self {
            path,
            receiver,
            buffer: VecDeque::new(),
            disconnected: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn drain_channel(&mut self) {
        if self.disconnected {
            return;
        }
        loop {
            match self.receiver.try_recv() {
                Ok(chunk) => self.buffer.extend(chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
    }
}

impl ByteSource for DeviceSource {
    fn available(&mut self) -> usize {
        self.drain_channel();
        self.buffer.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let count = buf.len().min(self.buffer.len());
        for (slot, byte) in buf.iter_mut().zip(self.buffer.drain(..count)) {
            *slot = byte;
        }
        count
    }
}

fn read_device(mut file: File, path: &Path, sender: mpsc::Sender<Vec<u8>>) {
    let mut chunk = [0u8; 64];
    loop {
        match file.read(&mut chunk) {
            Ok(0) => {
                warn!(path = %path.display(), "MIDI device reached end of input");
                return;
            }
            Ok(read) => {
                if sender.send(chunk[..read].to_vec()).is_err() {
                    return;
                }
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "MIDI device read failed");
                return;
            }
        }
    }
}

/// Byte source that releases pre-recorded chunks at given steps.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    schedule: VecDeque<(u64, Vec<u8>)>,
    buffer: VecDeque<u8>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `bytes` available from the poll of `step` onwards.
    ///
    /// Entries must be added in non-decreasing step order.
    pub fn at_step(mut self, step: u64, bytes: impl Into<Vec<u8>>) -> Self {
        self.schedule.push_back((step, bytes.into()));
        self
    }

    /// Steps still waiting to be released.
    pub fn remaining(&self) -> usize {
        self.schedule.len()
    }

    /// A short phrase used by the demo mode: a C major arpeggio held into a
    /// chord, a stray release, then a second chord.
    pub fn demo() -> Self {
        let on = |pitch| [super::NOTE_ON, pitch, 100];
        let off = |pitch| [super::NOTE_OFF, pitch, 0];
        Self::new()
            .at_step(10, on(60))
            .at_step(20, on(64))
            .at_step(30, on(67))
            .at_step(40, on(72))
            .at_step(90, [off(60), off(64)].concat())
            .at_step(100, off(61))
            .at_step(110, [off(67), off(72)].concat())
            .at_step(140, [on(57), on(60), on(64)].concat())
            .at_step(150, [0xF8, super::NOTE_ON, 69])
            .at_step(151, [100])
            .at_step(220, [off(57), off(60), off(64), off(69)].concat())
    }
}

impl ByteSource for ScriptedSource {
    fn begin_poll(&mut self, step: u64) {
        while let Some((due, _)) = self.schedule.front() {
            if *due > step {
                break;
            }
            if let Some((_, bytes)) = self.schedule.pop_front() {
                self.buffer.extend(bytes);
            }
        }
    }

    fn available(&mut self) -> usize {
        self.buffer.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let count = buf.len().min(self.buffer.len());
        for (slot, byte) in buf.iter_mut().zip(self.buffer.drain(..count)) {
            *slot = byte;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_bytes_appear_at_their_step() {
        let mut source = ScriptedSource::new().at_step(3, [144, 60, 1]).at_step(5, [128]);

        source.begin_poll(1);
        assert_eq!(source.available(), 0);

        source.begin_poll(4);
        assert_eq!(source.available(), 3);

        let mut buf = [0u8; 2];
        assert_eq!(source.read(&mut buf), 2);
        assert_eq!(buf, [144, 60]);
        assert_eq!(source.available(), 1);

        source.begin_poll(5);
        assert_eq!(source.available(), 2);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn missing_device_is_reported() {
        let err = DeviceSource::open("/nonexistent/midi-device").unwrap_err();
        assert!(matches!(err, VisualiserError::DeviceUnavailable { .. }));
    }

    #[test]
    fn device_bytes_are_forwarded() {
        let path = std::env::temp_dir().join(format!(
            "interval-visualiser-device-{}",
            std::process::id()
        ));
        std::fs::write(&path, [144u8, 60, 100]).unwrap();

        let mut source = DeviceSource::open(&path).unwrap();
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while source.available() < 3 && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        let mut buf = [0u8; 8];
        assert_eq!(source.read(&mut buf), 3);
        assert_eq!(&buf[..3], &[144, 60, 100]);
        std::fs::remove_file(&path).unwrap();
    }
}
