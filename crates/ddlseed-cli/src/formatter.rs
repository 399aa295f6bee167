use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

use crate::config::FormatterSettings;

#[derive(Debug, Error)]
pub enum FormatterError {
    #[error("unable to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to run formatter {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("formatter {command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("formatter output is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// DDL text for `path`, normalized by the external formatter unless it is
/// disabled.
pub fn load_script(path: &Path, settings: &FormatterSettings) -> Result<String, FormatterError> {
    if !settings.enabled {
        return std::fs::read_to_string(path).map_err(|source| FormatterError::Read {
            path: path.to_path_buf(),
            source,
        });
    }

    debug!(command = %settings.command, args = ?settings.args, file = %path.display(), "running formatter");
    let output = Command::new(&settings.command)
        .args(&settings.args)
        .arg(path)
        .output()
        .map_err(|source| FormatterError::Spawn {
            command: settings.command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(FormatterError::Failed {
            command: settings.command.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8(output.stdout)?)
}
