use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

/// Broad classification of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A row in the input could not be parsed into the sales schema.
    MalformedRecord,
    /// User provided input (arguments, options, file layout) is invalid.
    InvalidInput,
    /// Underlying IO failure.
    Io,
    /// Everything else.
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MalformedRecord => "malformed record",
            Self::InvalidInput => "invalid input",
            Self::Io => "io",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug)]
struct ErrorField {
    key: Cow<'static, str>,
    value: String,
}

#[derive(Debug)]
struct DbErrorInner {
    kind: ErrorKind,
    msg: Cow<'static, str>,
    source: Option<Box<dyn Error + Send + Sync>>,
    fields: Vec<ErrorField>,
    backtrace: Backtrace,
}

pub struct DbError {
    inner: Box<DbErrorInner>,
}

impl DbError {
    pub fn new(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::Other, msg)
    }

    pub fn malformed_record(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::MalformedRecord, msg)
    }

    pub fn invalid_input(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::with_kind(ErrorKind::InvalidInput, msg)
    }

    pub fn with_kind(kind: ErrorKind, msg: impl Into<Cow<'static, str>>) -> Self {
        DbError {
            inner: Box::new(DbErrorInner {
                kind,
                msg: msg.into(),
                source: None,
                fields: Vec::new(),
                backtrace: Backtrace::capture(),
            }),
        }
    }

    /// Create a new error wrapping `source`.
    ///
    /// The kind is inherited from the source if the source is itself a
    /// `DbError`, or is an IO error.
    pub fn with_source(
        msg: impl Into<Cow<'static, str>>,
        source: Box<dyn Error + Send + Sync>,
    ) -> Self {
        let kind = if let Some(err) = source.downcast_ref::<DbError>() {
            err.kind()
        } else if source.is::<std::io::Error>() {
            ErrorKind::Io
        } else {
            ErrorKind::Other
        };

        let mut err = Self::with_kind(kind, msg);
        err.inner.source = Some(source);
        err
    }

    /// Attach a key/value field to the error, printed alongside the message.
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<Cow<'static, str>>,
        V: fmt::Display,
    {
        self.inner.fields.push(ErrorField {
            key: key.into(),
            value: value.to_string(),
        });
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }

    pub fn message(&self) -> &str {
        self.inner.msg.as_ref()
    }

    /// Get the value of a previously attached field.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.inner
            .fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    pub fn backtrace(&self) -> &Backtrace {
        &self.inner.backtrace
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.msg)?;

        if !self.inner.fields.is_empty() {
            write!(f, " (")?;
            for (idx, field) in self.inner.fields.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", field.key, field.value)?;
            }
            write!(f, ")")?;
        }

        if let Some(source) = &self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl fmt::Debug for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self, self.inner.kind)?;
        if self.inner.backtrace.status() == BacktraceStatus::Captured {
            write!(f, "\n\nBacktrace:\n{}", self.inner.backtrace)?;
        }
        Ok(())
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.inner.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<std::io::Error> for DbError {
    fn from(err: std::io::Error) -> Self {
        DbError::with_source("IO error", Box::new(err))
    }
}

impl From<fmt::Error> for DbError {
    fn from(err: fmt::Error) -> Self {
        DbError::with_source("Format error", Box::new(err))
    }
}

impl From<csv::Error> for DbError {
    fn from(err: csv::Error) -> Self {
        let kind = match err.kind() {
            csv::ErrorKind::Io(_) => ErrorKind::Io,
            csv::ErrorKind::Utf8 { .. } | csv::ErrorKind::UnequalLengths { .. } => {
                ErrorKind::MalformedRecord
            }
            _ => ErrorKind::Other,
        };
        let line = err.position().map(|pos| pos.line());

        let mut out = DbError::with_source("CSV error", Box::new(err));
        out.inner.kind = kind;
        match line {
            Some(line) => out.with_field("line", line),
            None => out,
        }
    }
}

/// Extension trait for wrapping foreign errors with some context.
pub trait ResultExt<T, E> {
    fn context(self, msg: &'static str) -> Result<T>;

    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn context(self, msg: &'static str) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(DbError::with_source(msg, Box::new(e))),
        }
    }

    fn context_fn<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(DbError::with_source(f(), Box::new(e))),
        }
    }
}

pub trait OptionExt<T> {
    /// Return an error if the option is None.
    fn required(self, what: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, what: &'static str) -> Result<T> {
        match self {
            Some(v) => Ok(v),
            None => Err(DbError::new(format!("Missing required value: {what}"))),
        }
    }
}
