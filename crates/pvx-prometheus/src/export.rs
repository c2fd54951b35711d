use std::fs;
use std::io;
use std::path::Path;

use prometheus::{Encoder, TextEncoder};
use thiserror::Error;

use crate::PrometheusMetrics;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to encode metrics: {0}")]
    Encode(#[from] prometheus::Error),

    #[error("failed to write metrics file: {0}")]
    Io(#[from] io::Error),

    #[error("metrics are not valid utf-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl PrometheusMetrics {
    /// Encode the registry in the text exposition format.
    pub fn encode_text(&self) -> Result<String, ExportError> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Write the registry to `path` for the node-exporter textfile collector.
    ///
    /// The file is written next to `path` and renamed into place, so the
    /// collector never reads a partial file.
    pub fn write_textfile(&self, path: &Path) -> Result<(), ExportError> {
        let text = self.encode_text()?;
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");

        fs::write(&tmp, text)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
