//! Line-oriented input and output for envelope files.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};

/// Yields input lines, without their line terminator, until EOF.
#[async_trait]
pub trait LineSource: Send {
    async fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Append-only destination for output lines.
#[async_trait]
pub trait LineSink: Send {
    /// Append `line` followed by a newline.
    async fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Flush buffered lines and make them durable.
    async fn finish(&mut self) -> io::Result<()>;
}

/// Reads lines from a file.
pub struct FileLineSource {
    lines: Lines<BufReader<File>>,
}

impl FileLineSource {
    pub async fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path).await?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
        })
    }
}

#[async_trait]
impl LineSource for FileLineSource {
    async fn next_line(&mut self) -> io::Result<Option<String>> {
        self.lines.next_line().await
    }
}

/// Writes lines to a freshly truncated file.
pub struct FileLineSink {
    writer: BufWriter<File>,
}

impl FileLineSink {
    pub async fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path).await?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

#[async_trait]
impl LineSink for FileLineSink {
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await
    }

    async fn finish(&mut self) -> io::Result<()> {
        self.writer.flush().await?;
        self.writer.get_ref().sync_all().await
    }
}

/// Errors opening the batch's input and output files.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("failed to open payouts input file {}: {source}", path.display())]
    Input { path: PathBuf, source: io::Error },

    #[error("failed to open payouts output file {}: {source}", path.display())]
    Output { path: PathBuf, source: io::Error },

    #[error("output file {} is the input file", .0.display())]
    SameFile(PathBuf),
}

/// Open `input`, then create `output`.
///
/// Paths are compared after resolving them, so the input is never truncated
/// through a different spelling of its path.
pub async fn open_batch_files(input: &Path, output: &Path) -> Result<(FileLineSource, FileLineSink), OpenError> {
    let input_err = |source| OpenError::Input {
        path: input.to_path_buf(),
        source,
    };
    let source = FileLineSource::open(input).await.map_err(input_err)?;
    let resolved_input = tokio::fs::canonicalize(input).await.map_err(input_err)?;

    if let Ok(resolved_output) = tokio::fs::canonicalize(output).await {
        if resolved_output == resolved_input {
            return Err(OpenError::SameFile(output.to_path_buf()));
        }
    }

    let sink = FileLineSink::create(output).await.map_err(|source| OpenError::Output {
        path: output.to_path_buf(),
        source,
    })?;
    Ok((source, sink))
}
