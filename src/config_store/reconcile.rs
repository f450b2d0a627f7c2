use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader},
};

use tracing::{debug, trace};

use super::{
    ChangeSource, ConfigChange, LineError, ReloadError, ReloadOutcome, ScanStats, UpdateEvent,
    line::split_line,
    store::{Shared, State},
};

impl Shared {
    /// Re-reads the source file if it was modified after the last applied scan.
    ///
    /// Must be called with the write lock held; `state` is the locked state.
    /// Every applied change is appended to `changes` so the caller can
    /// broadcast them once the lock is released.
    pub(super) fn reconcile(
        &self,
        state: &mut State,
        changes: &mut Vec<ConfigChange>,
    ) -> ReloadOutcome {
        let path = state.source_path.clone();

        let modified = match fs::metadata(&path).and_then(|metadata| metadata.modified()) {
            Ok(modified) => modified,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!("{} does not exist", path.display());
                return ReloadOutcome::SourceMissing;
            }
            Err(source) => return self.fail(ReloadError::Stat { path, source }),
        };

        if modified <= state.last_applied {
            return ReloadOutcome::Unchanged;
        }

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(source) => return self.fail(ReloadError::Open { path, source }),
        };

        let mut reader = BufReader::new(file);
        let mut stats = ScanStats::default();
        let mut buffer = Vec::new();

        loop {
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => break,
                Ok(_) => stats.lines += 1,
                Err(source) => {
                    let line = stats.lines + 1;
                    return self.fail(ReloadError::Read { path, line, source });
                }
            }

            let line = String::from_utf8_lossy(&buffer);
            match split_line(&line) {
                Ok((key, value)) => {
                    if let Some(change) =
                        self.apply(&mut state.parameters, key, value, ChangeSource::File)
                    {
                        stats.changed += 1;
                        changes.push(change);
                    }
                }
                Err(LineError::Empty) => {}
                Err(error) => {
                    stats.rejected += 1;
                    if self.log_updates() {
                        self.sink.record(&UpdateEvent::MalformedLine {
                            path: path.clone(),
                            line_number: stats.lines,
                            line: line.trim().to_string(),
                            error,
                        });
                    }
                }
            }
        }

        state.last_applied = modified;
        debug!(
            lines = stats.lines,
            changed = stats.changed,
            rejected = stats.rejected,
            "reloaded {}",
            path.display()
        );

        ReloadOutcome::Reloaded(stats)
    }

    fn fail(&self, error: ReloadError) -> ReloadOutcome {
        self.sink.record(&UpdateEvent::FileError {
            path: error.path().to_path_buf(),
            details: error.to_string(),
        });

        ReloadOutcome::Failed(error)
    }
}
