use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::PathBuf,
    sync::Arc,
    thread,
};

use crossbeam_channel::{unbounded, Receiver, Sender};
use predprey_core::{Frame, Landscape};
use thiserror::Error;

use crate::{averages, ppm};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to create output directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path:?}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Background writer for the two run artifacts.
///
/// Frames cross an unbounded channel to a worker thread that appends a CSV
/// row and writes a density map per frame, so the engine never waits on
/// disk. If a write fails the worker exits early; later frames are quietly
/// discarded and the error surfaces from [`close`](Self::close).
pub struct Reporter {
    sender: Sender<Frame>,
    worker: thread::JoinHandle<Result<u64, ReportError>>,
}

impl Reporter {
    /// Create the output directory, write the CSV header, and start the
    /// worker.
    pub fn spawn(
        output_dir: impl Into<PathBuf>,
        landscape: Arc<Landscape>,
    ) -> Result<Self, ReportError> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|source| ReportError::CreateDir {
            path: output_dir.clone(),
            source,
        })?;

        let csv_path = output_dir.join(averages::AVERAGES_FILE_NAME);
        let file = File::create(&csv_path).map_err(|source| ReportError::Write {
            path: csv_path.clone(),
            source,
        })?;
        let mut csv = BufWriter::new(file);
        averages::write_averages_header(&mut csv).map_err(|source| ReportError::Write {
            path: csv_path.clone(),
            source,
        })?;
        tracing::debug!(
            target: "predprey::report",
            dir = %output_dir.display(),
            "report.started"
        );

        let (sender, receiver) = unbounded::<Frame>();
        let worker =
            thread::spawn(move || write_frames(receiver, csv, csv_path, output_dir, landscape));
        Ok(Self { sender, worker })
    }

    /// A cloned channel handle, usable directly as a frame sink.
    pub fn sink(&self) -> Sender<Frame> {
        self.sender.clone()
    }

    /// Disconnect, let the worker drain, and join it.
    ///
    /// Returns the number of frames fully written, or the first write
    /// error the worker hit.
    pub fn close(self) -> Result<u64, ReportError> {
        let Self { sender, worker } = self;
        drop(sender);
        worker.join().expect("report writer thread panicked")
    }
}

fn write_frames(
    receiver: Receiver<Frame>,
    mut csv: BufWriter<File>,
    csv_path: PathBuf,
    output_dir: PathBuf,
    landscape: Arc<Landscape>,
) -> Result<u64, ReportError> {
    let mut frames = 0u64;
    while let Ok(frame) = receiver.recv() {
        averages::write_averages_row(&mut csv, &frame).map_err(|source| ReportError::Write {
            path: csv_path.clone(),
            source,
        })?;

        let map_path = output_dir.join(ppm::map_file_name(frame.step));
        let file = File::create(&map_path).map_err(|source| ReportError::Write {
            path: map_path.clone(),
            source,
        })?;
        let mut map = BufWriter::new(file);
        ppm::write_density_map(&mut map, &landscape, &frame).map_err(|source| {
            ReportError::Write {
                path: map_path.clone(),
                source,
            }
        })?;
        map.flush().map_err(|source| ReportError::Write {
            path: map_path,
            source,
        })?;
        frames += 1;
    }
    csv.flush().map_err(|source| ReportError::Write {
        path: csv_path,
        source,
    })?;
    tracing::debug!(target: "predprey::report", frames, "report.closed");
    Ok(frames)
}
