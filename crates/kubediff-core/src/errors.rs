use kubediff_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using DiffError
pub type Result<T> = std::result::Result<T, DiffError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that log pipelines, CLI output and
/// tests can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    MalformedTree,
    DuplicateIdentity,

    // Decoding
    /// A rendered manifest stream could not be decoded into resource documents
    InvalidManifest,
    /// A configuration-value document could not be decoded
    InvalidValues,
    /// An options file is unreadable as TOML or names unknown keys
    InvalidConfig,

    // Integration/IO
    Io,
    Serialization,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::MalformedTree => "ERR_MALFORMED_TREE",
            ExErrorKind::DuplicateIdentity => "ERR_DUPLICATE_IDENTITY",
            ExErrorKind::InvalidManifest => "ERR_INVALID_MANIFEST",
            ExErrorKind::InvalidValues => "ERR_INVALID_VALUES",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification of a [`DiffError`] together with the context
/// needed to correlate it with a comparison run.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    identity: Option<String>,
    path: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            identity: None,
            path: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add resource identity context
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    /// Add tree path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(identity) = &self.identity {
            write!(f, " (identity: {})", identity)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for comparison and reconciliation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffError {
    /// A tree contains a node the comparator cannot address
    #[error("Malformed tree at {path}: {reason}")]
    MalformedTree { path: String, reason: String },

    /// More than one document in a set normalizes to the same identity
    #[error("Identity {identity} appears {count} times in set {side}")]
    DuplicateIdentity {
        identity: String,
        side: String,
        count: usize,
    },

    /// A document in a rendered manifest stream failed to decode
    #[error("Failed to decode manifest document {index}: {reason}")]
    ManifestDecode { index: usize, reason: String },

    /// A configuration-value document failed to decode
    #[error("Failed to decode values: {reason}")]
    ValuesDecode { reason: String },

    /// An options file failed to parse
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("IO error during {operation}: {reason}")]
    Io { operation: String, reason: String },

    #[error("Serialization failed: {message}")]
    Serialization { message: String },
}

impl DiffError {
    /// Classification of this error in the canonical taxonomy
    pub fn kind(&self) -> ExErrorKind {
        match self {
            DiffError::MalformedTree { .. } => ExErrorKind::MalformedTree,
            DiffError::DuplicateIdentity { .. } => ExErrorKind::DuplicateIdentity,
            DiffError::ManifestDecode { .. } => ExErrorKind::InvalidManifest,
            DiffError::ValuesDecode { .. } => ExErrorKind::InvalidValues,
            DiffError::InvalidConfig { .. } => ExErrorKind::InvalidConfig,
            DiffError::Io { .. } => ExErrorKind::Io,
            DiffError::Serialization { .. } => ExErrorKind::Serialization,
        }
    }

    /// Stable error code, shorthand for `self.kind().code()`
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

impl From<&DiffError> for ExError {
    fn from(err: &DiffError) -> Self {
        let base = ExError::new(err.kind()).with_message(err.to_string());
        match err {
            DiffError::MalformedTree { path, .. } => base.with_path(path.clone()),
            DiffError::DuplicateIdentity { identity, .. } => base
                .with_identity(identity.clone())
                .with_op("reconcile"),
            DiffError::ManifestDecode { .. } => base.with_op("decode_manifest"),
            DiffError::ValuesDecode { .. } => base.with_op("decode_values"),
            DiffError::InvalidConfig { .. } => base.with_op("load_config"),
            DiffError::Io { operation, .. } => base.with_op(operation.clone()),
            DiffError::Serialization { .. } => base,
        }
    }
}

impl From<DiffError> for ExError {
    fn from(err: DiffError) -> Self {
        ExError::from(&err)
    }
}

impl From<serde_json::Error> for DiffError {
    fn from(err: serde_json::Error) -> Self {
        DiffError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for DiffError {
    fn from(err: toml::de::Error) -> Self {
        DiffError::InvalidConfig {
            reason: err.to_string(),
        }
    }
}
