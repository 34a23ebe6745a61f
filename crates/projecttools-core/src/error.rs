//! Structured error taxonomy for ProjectTools.
//!
//! Every failure carries an [`ErrorCode`], a `(Domain, ErrorKind)` pair. The
//! numeric form (`domain base + kind value`, e.g. `201` for a missing profile)
//! is derived for display and never parsed back.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, PtError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Aggregate an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Config,
    Profile,
    Workspace,
    Project,
    General,
}

impl Domain {
    /// Base of the numeric code range for this domain.
    pub fn base(self) -> u16 {
        match self {
            Domain::Config => 100,
            Domain::Profile => 200,
            Domain::Workspace => 300,
            Domain::Project => 400,
            Domain::General => 500,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Domain::Config => "Config",
            Domain::Profile => "Profile",
            Domain::Workspace => "Workspace",
            Domain::Project => "Project",
            Domain::General => "General",
        }
    }

    /// Placeholder values used when the caller does not supply one.
    fn default_context(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Domain::Config => &[("resource", "configuration"), ("field", "configuration")],
            Domain::Profile => &[("resource", "Profile"), ("field", "Profile name")],
            Domain::Workspace => &[("resource", "Workspace"), ("field", "Workspace name")],
            Domain::Project => &[("resource", "Project"), ("field", "Project name")],
            Domain::General => &[],
        }
    }
}

/// Failure category, shared by every domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // Resource
    NotFound,
    AlreadyExists,
    AccessDenied,

    // Validation
    EmptyRequiredField,
    InvalidFormat,
    InvalidValue,
    ValidationFailed,

    // I/O
    ReadError,
    WriteError,
    PermissionDenied,
    DiskFull,

    // Parsing
    InvalidJson,
    ParseError,

    // Operations
    InitializationFailed,
    OperationFailed,
    RestoreFailed,
    BackupFailed,
}

impl ErrorKind {
    pub fn value(self) -> u16 {
        match self {
            ErrorKind::NotFound => 1,
            ErrorKind::AlreadyExists => 2,
            ErrorKind::AccessDenied => 3,
            ErrorKind::EmptyRequiredField => 20,
            ErrorKind::InvalidFormat => 21,
            ErrorKind::InvalidValue => 22,
            ErrorKind::ValidationFailed => 23,
            ErrorKind::ReadError => 40,
            ErrorKind::WriteError => 41,
            ErrorKind::PermissionDenied => 42,
            ErrorKind::DiskFull => 43,
            ErrorKind::InvalidJson => 60,
            ErrorKind::ParseError => 61,
            ErrorKind::InitializationFailed => 80,
            ErrorKind::OperationFailed => 81,
            ErrorKind::RestoreFailed => 82,
            ErrorKind::BackupFailed => 83,
        }
    }

    /// Generic message template for this category.
    pub fn template(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "{resource} not found",
            ErrorKind::AlreadyExists => "{resource} already exists",
            ErrorKind::AccessDenied => "Access denied to {resource}",
            ErrorKind::EmptyRequiredField => "{field} cannot be empty",
            ErrorKind::InvalidFormat => "Invalid {field} format",
            ErrorKind::InvalidValue => "Invalid {field} value",
            ErrorKind::ValidationFailed => "{resource} validation failed",
            ErrorKind::ReadError => "Failed to read {resource}",
            ErrorKind::WriteError => "Failed to write {resource}",
            ErrorKind::PermissionDenied => "Permission denied accessing {resource}",
            ErrorKind::DiskFull => "Insufficient disk space for {resource}",
            ErrorKind::InvalidJson => "{resource} contains invalid JSON",
            ErrorKind::ParseError => "Failed to parse {resource}",
            ErrorKind::InitializationFailed => "Failed to initialize {resource}",
            ErrorKind::OperationFailed => "{operation} operation failed",
            ErrorKind::RestoreFailed => "Failed to restore {resource}",
            ErrorKind::BackupFailed => "Failed to backup {resource}",
        }
    }
}

/// Tagged error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    pub domain: Domain,
    pub kind: ErrorKind,
}

impl ErrorCode {
    pub const fn new(domain: Domain, kind: ErrorKind) -> Self {
        Self { domain, kind }
    }

    /// Numeric representation, e.g. `101` for a missing configuration file.
    pub fn as_u16(self) -> u16 {
        self.domain.base() + self.kind.value()
    }

    /// Code-specific template that takes precedence over the generic one
    /// when every placeholder in it can be filled.
    fn template(self) -> Option<&'static str> {
        use Domain::*;
        use ErrorKind::*;

        match (self.domain, self.kind) {
            (Config, NotFound) => Some("Configuration file not found"),
            (Config, PermissionDenied) => Some("Permission denied accessing configuration file"),
            (Config, InvalidJson) => Some("Configuration file contains invalid JSON"),
            (Config, InvalidValue) => Some("Invalid configuration object"),
            (Config, ValidationFailed) => Some("Existing configuration validation failed"),
            (Config, RestoreFailed) => Some("Failed to restore configuration backup"),
            (Profile, InvalidValue) => Some("Profile is already active"),
            (Profile | Workspace | Project, NotFound) => Some("{resource} '{name}' not found"),
            (Profile | Workspace | Project, AlreadyExists) => {
                Some("{resource} '{name}' already exists")
            }
            (Profile | Workspace | Project, InvalidFormat) => {
                Some("Invalid {resource} name '{name}'")
            }
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Named codes, one per domain failure the application raises.
pub mod codes {
    use super::{Domain, ErrorCode, ErrorKind};

    pub const CONFIG_NOT_FOUND: ErrorCode = ErrorCode::new(Domain::Config, ErrorKind::NotFound);
    pub const CONFIG_PERMISSION_DENIED: ErrorCode =
        ErrorCode::new(Domain::Config, ErrorKind::PermissionDenied);
    pub const CONFIG_LOAD_ERROR: ErrorCode = ErrorCode::new(Domain::Config, ErrorKind::ReadError);
    pub const CONFIG_SAVE_ERROR: ErrorCode = ErrorCode::new(Domain::Config, ErrorKind::WriteError);
    pub const CONFIG_DISK_FULL: ErrorCode = ErrorCode::new(Domain::Config, ErrorKind::DiskFull);
    pub const CONFIG_INVALID_JSON: ErrorCode =
        ErrorCode::new(Domain::Config, ErrorKind::InvalidJson);
    pub const CONFIG_INVALID_CONFIG: ErrorCode =
        ErrorCode::new(Domain::Config, ErrorKind::InvalidValue);
    pub const CONFIG_INVALID_EXISTING: ErrorCode =
        ErrorCode::new(Domain::Config, ErrorKind::ValidationFailed);
    pub const CONFIG_INIT_ERROR: ErrorCode =
        ErrorCode::new(Domain::Config, ErrorKind::InitializationFailed);
    pub const CONFIG_RESTORE_ERROR: ErrorCode =
        ErrorCode::new(Domain::Config, ErrorKind::RestoreFailed);

    pub const PROFILE_NOT_FOUND: ErrorCode = ErrorCode::new(Domain::Profile, ErrorKind::NotFound);
    pub const PROFILE_EMPTY_NAME: ErrorCode =
        ErrorCode::new(Domain::Profile, ErrorKind::EmptyRequiredField);
    pub const PROFILE_ALREADY_EXISTS: ErrorCode =
        ErrorCode::new(Domain::Profile, ErrorKind::AlreadyExists);
    pub const PROFILE_ALREADY_ACTIVE: ErrorCode =
        ErrorCode::new(Domain::Profile, ErrorKind::InvalidValue);
    pub const PROFILE_INVALID_FORMAT: ErrorCode =
        ErrorCode::new(Domain::Profile, ErrorKind::InvalidFormat);

    pub const WORKSPACE_NOT_FOUND: ErrorCode =
        ErrorCode::new(Domain::Workspace, ErrorKind::NotFound);
    pub const WORKSPACE_EMPTY_NAME: ErrorCode =
        ErrorCode::new(Domain::Workspace, ErrorKind::EmptyRequiredField);
    pub const WORKSPACE_ALREADY_EXISTS: ErrorCode =
        ErrorCode::new(Domain::Workspace, ErrorKind::AlreadyExists);
    pub const WORKSPACE_EMPTY_PATH: ErrorCode =
        ErrorCode::new(Domain::Workspace, ErrorKind::EmptyRequiredField);
    pub const WORKSPACE_INVALID_PATH: ErrorCode =
        ErrorCode::new(Domain::Workspace, ErrorKind::InvalidValue);
    pub const WORKSPACE_INVALID_FORMAT: ErrorCode =
        ErrorCode::new(Domain::Workspace, ErrorKind::InvalidFormat);

    pub const PROJECT_NOT_FOUND: ErrorCode = ErrorCode::new(Domain::Project, ErrorKind::NotFound);
    pub const PROJECT_EMPTY_NAME: ErrorCode =
        ErrorCode::new(Domain::Project, ErrorKind::EmptyRequiredField);
    pub const PROJECT_ALREADY_EXISTS: ErrorCode =
        ErrorCode::new(Domain::Project, ErrorKind::AlreadyExists);
    pub const PROJECT_EMPTY_PATH: ErrorCode =
        ErrorCode::new(Domain::Project, ErrorKind::EmptyRequiredField);
    pub const PROJECT_INVALID_PATH: ErrorCode =
        ErrorCode::new(Domain::Project, ErrorKind::InvalidValue);
    pub const PROJECT_INVALID_FORMAT: ErrorCode =
        ErrorCode::new(Domain::Project, ErrorKind::InvalidFormat);
    /// A bare project name matched more than one workspace
    pub const PROJECT_AMBIGUOUS: ErrorCode =
        ErrorCode::new(Domain::Project, ErrorKind::ValidationFailed);
}

/// The single error type surfaced by the core
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PtError {
    code: ErrorCode,
    message: String,
    custom_message: bool,
    context: BTreeMap<String, String>,
    source: Option<BoxedSource>,
}

impl PtError {
    /// Create an error whose message comes from the code's template.
    pub fn new(code: ErrorCode) -> Self {
        let mut err = Self {
            code,
            message: String::new(),
            custom_message: false,
            context: BTreeMap::new(),
            source: None,
        };
        err.render();
        err
    }

    /// Create an error with a caller-supplied message.
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            custom_message: true,
            context: BTreeMap::new(),
            source: None,
        }
    }

    /// Add a context entry; placeholders in the template are re-rendered.
    pub fn context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        if !self.custom_message {
            self.render();
        }
        self
    }

    /// Attach the underlying cause.
    pub fn caused_by<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Classify an I/O failure: permission and disk-full errors get their own
    /// kinds, everything else falls back to `fallback`.
    pub fn from_io(domain: Domain, fallback: ErrorKind, err: io::Error) -> Self {
        let kind = match err.kind() {
            io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied,
            io::ErrorKind::StorageFull => ErrorKind::DiskFull,
            _ => fallback,
        };
        Self::new(ErrorCode::new(domain, kind)).caused_by(err)
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn domain(&self) -> Domain {
        self.code.domain
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }

    /// Error name in the `<Domain>Error` form.
    pub fn name(&self) -> String {
        format!("{}Error", self.code.domain.name())
    }

    /// Check whether this error carries the given code.
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == code
    }

    fn render(&mut self) {
        let lookup = |key: &str| {
            self.context.get(key).map(String::as_str).or_else(|| {
                self.code
                    .domain
                    .default_context()
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| *v)
            })
        };

        self.message = match self
            .code
            .template()
            .map(|t| interpolate(t, &lookup))
        {
            Some((message, true)) => message,
            _ => interpolate(self.code.kind.template(), &lookup).0,
        };
    }
}

/// Replace `{key}` placeholders; unknown keys are left as-is. The flag is
/// false when any placeholder stayed unfilled.
fn interpolate<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> (String, bool) {
    let mut out = String::with_capacity(template.len());
    let mut complete = true;
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match lookup(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        complete = false;
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    (out, complete)
}
