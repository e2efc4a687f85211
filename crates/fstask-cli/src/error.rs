use std::process::ExitCode;

use clap::error::ErrorKind as ClapErrorKind;
use fstask::FstaskError;
use thiserror::Error;

const EX_OK: u8 = 0;
const EX_USAGE: u8 = 64;
const EX_DATAERR: u8 = 65;
const EX_SOFTWARE: u8 = 70;
const EX_OSERR: u8 = 71;
const EX_CONFIG: u8 = 78;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Ok,
    Usage,
    Data,
    Io,
    Config,
    Software,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Ok => EX_OK,
            ExitStatus::Usage => EX_USAGE,
            ExitStatus::Data => EX_DATAERR,
            ExitStatus::Io => EX_OSERR,
            ExitStatus::Config => EX_CONFIG,
            ExitStatus::Software => EX_SOFTWARE,
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    message: String,
    status: ExitStatus,
}

impl CliError {
    pub fn new(message: impl Into<String>, status: ExitStatus) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    pub fn status(&self) -> ExitStatus {
        self.status
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.status.code())
    }

    pub fn print(&self) {
        if !self.message.is_empty() {
            eprintln!("{}", self.message);
        }
    }
}

impl From<FstaskError> for CliError {
    fn from(err: FstaskError) -> Self {
        let status = match &err {
            FstaskError::Invocation(_)
            | FstaskError::Violations(_)
            | FstaskError::Serialization(_) => ExitStatus::Data,
            FstaskError::UnknownTask(_) => ExitStatus::Usage,
            FstaskError::Schema(_) => ExitStatus::Config,
            FstaskError::Io(_) => ExitStatus::Io,
        };
        CliError::new(err.to_string(), status)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> Self {
        let status = match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => ExitStatus::Ok,
            _ => ExitStatus::Usage,
        };
        if status == ExitStatus::Ok {
            let _ = err.print();
            CliError::new(String::new(), status)
        } else {
            CliError::new(err.to_string(), status)
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::new(err.to_string(), ExitStatus::Io)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::new(err.to_string(), ExitStatus::Software)
    }
}
