use crate::error::ScanError;
use crate::ports::{HashProgress, HashedFile, HashingPort};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

/// Progress is reported at most once per this many bytes, or once per ~5%
/// of the file, whichever is smaller.
const PROGRESS_QUANTUM: u64 = 64 * MIB;

/// Streaming MD5 engine. Reads strictly front to back, sizes its buffer
/// from the file size, and gives up once the wall-clock ceiling passes.
pub struct Md5Hasher {
    buffer_override: Option<usize>,
}

impl Md5Hasher {
    pub fn new() -> Self {
        Self {
            buffer_override: None,
        }
    }

    /// Pin the read buffer to a fixed size instead of the adaptive step
    /// function. The digest is identical either way.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_override = Some(size);
        self
    }

    fn buffer_size_for(&self, file_size: u64) -> usize {
        if let Some(size) = self.buffer_override {
            return size.max(1);
        }
        let size = match file_size {
            0..=4_194_304 => 64 * KIB,            // <= 4 MiB
            4_194_305..=67_108_864 => 256 * KIB,  // <= 64 MiB
            67_108_865..=536_870_912 => MIB,      // <= 512 MiB
            536_870_913..=2_147_483_648 => 4 * MIB, // <= 2 GiB
            _ => 8 * MIB,
        };
        size as usize
    }
}

impl Default for Md5Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl HashingPort for Md5Hasher {
    fn hash_file(
        &self,
        path: &Path,
        timeout: Duration,
        progress: &dyn HashProgress,
    ) -> Result<HashedFile, ScanError> {
        let total = std::fs::metadata(path)
            .map_err(|source| ScanError::Stat {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        let mut file = File::open(path).map_err(|source| ScanError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        progress.on_file_start(&name, total);

        let buffer_size = self.buffer_size_for(total);
        debug!(file = %name, total, buffer_size, "hashing");

        // Report every ~5% or every fixed quantum, whichever comes first.
        let report_every = (total / 20).clamp(1, PROGRESS_QUANTUM);

        let mut context = md5::Context::new();
        let mut buffer = vec![0u8; buffer_size];
        let mut bytes_read: u64 = 0;
        let mut reported_at: u64 = 0;
        let mut last_percent: u8 = 0;
        let started = Instant::now();

        loop {
            if started.elapsed() > timeout {
                return Err(ScanError::HashTimeout {
                    path: path.to_path_buf(),
                    limit: timeout,
                });
            }

            let n = file.read(&mut buffer).map_err(|source| ScanError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            if n == 0 {
                break;
            }
            context.consume(&buffer[..n]);
            bytes_read += n as u64;

            if bytes_read - reported_at >= report_every && bytes_read < total {
                let percent = ((bytes_read * 100) / total.max(1)).min(99) as u8;
                if percent > last_percent {
                    trace!(file = %name, percent, bytes_read, "hash progress");
                    progress.on_progress(percent, bytes_read, total);
                    last_percent = percent;
                }
                reported_at = bytes_read;
            }
        }

        progress.on_progress(100, bytes_read, total);
        progress.on_file_done();

        Ok(HashedFile {
            digest: format!("{:x}", context.compute()),
            size: bytes_read,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::SilentProgress;
    use std::cell::RefCell;
    use std::fs;

    /// Records every callback so tests can assert on the sequence.
    struct RecordingProgress {
        calls: RefCell<Vec<(u8, u64, u64)>>,
        done: RefCell<bool>,
    }

    impl RecordingProgress {
        fn new() -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                done: RefCell::new(false),
            }
        }
    }

    impl HashProgress for RecordingProgress {
        fn on_file_start(&self, _name: &str, _total_bytes: u64) {}
        fn on_progress(&self, percent: u8, bytes_read: u64, total_bytes: u64) {
            self.calls.borrow_mut().push((percent, bytes_read, total_bytes));
        }
        fn on_file_done(&self) {
            *self.done.borrow_mut() = true;
        }
    }

    const LONG: Duration = Duration::from_secs(60);

    #[test]
    fn digest_matches_known_vector() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.bin");
        fs::write(&path, b"abc").unwrap();

        let hashed = Md5Hasher::new()
            .hash_file(&path, LONG, &SilentProgress)
            .unwrap();
        assert_eq!(hashed.digest, "900150983cd24fb0d6963f7d28e17f72");
        assert_eq!(hashed.size, 3);
    }

    #[test]
    fn digest_is_independent_of_buffer_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        let data: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        fs::write(&path, &data).unwrap();

        let mut digests = Vec::new();
        for buffer_size in [1, 7, 512, 8192, 1 << 20] {
            let hashed = Md5Hasher::new()
                .with_buffer_size(buffer_size)
                .hash_file(&path, LONG, &SilentProgress)
                .unwrap();
            digests.push(hashed.digest);
        }
        assert!(digests.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(digests[0].len(), 32);
    }

    #[test]
    fn progress_is_monotone_and_ends_at_100() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        fs::write(&path, vec![0xAB; 50_000]).unwrap();

        let progress = RecordingProgress::new();
        Md5Hasher::new()
            .with_buffer_size(1024)
            .hash_file(&path, LONG, &progress)
            .unwrap();

        let calls = progress.calls.borrow();
        assert!(!calls.is_empty());
        assert!(calls.windows(2).all(|pair| pair[0].0 <= pair[1].0));
        assert!(calls.windows(2).all(|pair| pair[0].1 <= pair[1].1));
        let last = calls.last().unwrap();
        assert_eq!(last.0, 100);
        assert_eq!(last.1, 50_000);
        assert!(*progress.done.borrow());
    }

    #[test]
    fn empty_file_still_reports_completion() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.bin");
        fs::write(&path, b"").unwrap();

        let progress = RecordingProgress::new();
        let hashed = Md5Hasher::new()
            .hash_file(&path, LONG, &progress)
            .unwrap();

        // MD5 of the empty input.
        assert_eq!(hashed.digest, "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(progress.calls.borrow().last(), Some(&(100, 0, 0)));
    }

    #[test]
    fn missing_file_is_a_stat_error() {
        let err = Md5Hasher::new()
            .hash_file(Path::new("/nope/missing.sfc"), LONG, &SilentProgress)
            .unwrap_err();
        assert!(matches!(err, ScanError::Stat { .. }));
    }

    #[test]
    fn zero_timeout_trips_before_any_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow.bin");
        fs::write(&path, vec![0u8; 4096]).unwrap();

        // A sub-microsecond ceiling trips on the first loop check.
        let err = Md5Hasher::new()
            .hash_file(&path, Duration::from_nanos(1), &SilentProgress)
            .unwrap_err();
        assert!(matches!(err, ScanError::HashTimeout { .. }));
    }
}
