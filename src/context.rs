//! Row/column cursor and error capture shared by the read and write paths.
//!
//! A reader or writer owns exactly one [`ProcessContext`] and reuses it for
//! every row. Its state is only valid until the next `new_row`/`new_column`
//! call, so inspect (or snapshot with [`ProcessContext::error`]) before
//! moving on.
//!
//! ```rust
//! use serde_dsv::{CsvValue, ProcessContext, Stage};
//!
//! let mut ctx = ProcessContext::new();
//! ctx.new_row();
//! ctx.new_column();
//! ctx.set_original(CsvValue::from("abc"));
//! ctx.fail(Stage::Conversion, "integer", "'{original_value}' is not an integer", None);
//!
//! let err = ctx.error().unwrap();
//! assert_eq!(err.message(), "'abc' is not an integer");
//! ```

use crate::{CsvValue, Error};
use std::fmt;
use std::sync::Arc;

/// Pipeline stage that rejected a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Mandatory,
    Precondition,
    Conversion,
    Postcondition,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Mandatory => "mandatory",
            Stage::Precondition => "precondition",
            Stage::Conversion => "conversion",
            Stage::Postcondition => "postcondition",
        })
    }
}

/// The operation that marked the context failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedOperation {
    pub stage: Stage,
    pub name: String,
    pub template: String,
    pub detail: Option<String>,
}

/// Mutable per-operation cursor. Not thread-safe.
#[derive(Clone, Debug)]
pub struct ProcessContext {
    row: i64,
    column: i64,
    original: CsvValue,
    processed: CsvValue,
    failure: Option<FailedOperation>,
    headers: Option<Arc<[String]>>,
}

impl Default for ProcessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessContext {
    /// Cursor before the first row and column.
    #[must_use]
    pub fn new() -> Self {
        ProcessContext {
            row: -1,
            column: -1,
            original: CsvValue::Null,
            processed: CsvValue::Null,
            failure: None,
            headers: None,
        }
    }

    /// Advances to the next row, resetting the column and any error.
    pub fn new_row(&mut self) {
        self.row += 1;
        self.column = -1;
        self.clear();
    }

    /// Advances to the next column.
    pub fn new_column(&mut self) {
        self.column += 1;
    }

    /// Resets values and error state without moving the cursor.
    pub fn clear(&mut self) {
        self.original = CsvValue::Null;
        self.processed = CsvValue::Null;
        self.failure = None;
    }

    #[must_use]
    pub const fn row(&self) -> i64 {
        self.row
    }

    #[must_use]
    pub const fn column(&self) -> i64 {
        self.column
    }

    /// Column names used in diagnostics.
    pub fn set_headers(&mut self, headers: Arc<[String]>) {
        self.headers = Some(headers);
    }

    #[must_use]
    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    /// Header name of the current column, if known.
    #[must_use]
    pub fn column_name(&self) -> Option<&str> {
        let index = usize::try_from(self.column).ok()?;
        self.headers
            .as_deref()
            .and_then(|headers| headers.get(index))
            .map(String::as_str)
    }

    pub fn set_original(&mut self, value: CsvValue) {
        self.original = value;
    }

    #[must_use]
    pub fn original(&self) -> &CsvValue {
        &self.original
    }

    pub fn set_processed(&mut self, value: CsvValue) {
        self.processed = value;
    }

    #[must_use]
    pub fn processed(&self) -> &CsvValue {
        &self.processed
    }

    /// Records the failed operation. The first failure wins.
    pub fn fail(&mut self, stage: Stage, name: &str, template: &str, detail: Option<String>) {
        if self.failure.is_some() {
            return;
        }
        self.failure = Some(FailedOperation {
            stage,
            name: name.to_string(),
            template: template.to_string(),
            detail,
        });
    }

    /// `true` iff a failed operation is set.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.failure.is_some()
    }

    #[must_use]
    pub fn failed_operation(&self) -> Option<&FailedOperation> {
        self.failure.as_ref()
    }

    /// Snapshot of the current error. The message is rendered only when
    /// requested.
    #[must_use]
    pub fn error(&self) -> Option<ProcessError> {
        let failure = self.failure.as_ref()?;
        Some(ProcessError {
            row: self.row,
            column: self.column,
            column_name: self.column_name().map(str::to_string),
            operation: failure.clone(),
            original: self.original.clone(),
            processed: self.processed.clone(),
        })
    }
}

/// Detached description of a field-level data error.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessError {
    pub row: i64,
    pub column: i64,
    pub column_name: Option<String>,
    pub operation: FailedOperation,
    pub original: CsvValue,
    pub processed: CsvValue,
}

impl ProcessError {
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.operation.stage
    }

    /// Renders the operation's message template.
    ///
    /// Placeholders: `{column_name}`, `{original_value}`, `{converted_value}`,
    /// `{row}`, `{column}` and `{detail}`. Unknown placeholders are kept.
    #[must_use]
    pub fn message(&self) -> String {
        let template = &self.operation.template;
        let mut out = String::with_capacity(template.len() + 32);
        let mut rest = template.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                return out;
            };
            let key = &after[..end];
            match key {
                "column_name" => match &self.column_name {
                    Some(name) => out.push_str(name),
                    None => out.push_str(&self.column.to_string()),
                },
                "original_value" => out.push_str(&self.original.to_string()),
                "converted_value" => out.push_str(&self.processed.to_string()),
                "row" => out.push_str(&self.row.to_string()),
                "column" => out.push_str(&self.column.to_string()),
                "detail" => out.push_str(self.operation.detail.as_deref().unwrap_or_default()),
                _ => {
                    out.push('{');
                    out.push_str(key);
                    out.push('}');
                }
            }
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failure at row {}, column {}",
            self.operation.stage, self.row, self.column
        )?;
        if let Some(name) = &self.column_name {
            write!(f, " ({})", name)?;
        }
        write!(f, " [{}]: {}", self.operation.name, self.message())
    }
}

impl std::error::Error for ProcessError {}

/// Result of processing one row: a value, or the first data error.
///
/// ```rust
/// use serde_dsv::Outcome;
///
/// let mut seen = 0;
/// let outcome = Outcome::success(5)
///     .on_success(|v| seen = *v)
///     .on_error(|_| unreachable!())
///     .then(|| ());
/// assert!(outcome.is_ok());
/// assert_eq!(seen, 5);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[must_use = "an outcome may carry a data error"]
pub struct Outcome<T>(std::result::Result<T, ProcessError>);

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Outcome(Ok(value))
    }

    pub fn failure(error: ProcessError) -> Self {
        Outcome(Err(error))
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.0.is_err()
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        self.0.as_ref().ok()
    }

    #[must_use]
    pub fn error(&self) -> Option<&ProcessError> {
        self.0.as_ref().err()
    }

    /// Runs `f` with the value on success.
    pub fn on_success<F: FnOnce(&T)>(self, f: F) -> Self {
        if let Ok(value) = &self.0 {
            f(value);
        }
        self
    }

    /// Runs `f` with the error on failure.
    pub fn on_error<F: FnOnce(&ProcessError)>(self, f: F) -> Self {
        if let Err(error) = &self.0 {
            f(error);
        }
        self
    }

    /// Runs `f` in either case.
    pub fn then<F: FnOnce()>(self, f: F) -> Self {
        f();
        self
    }

    /// Maps the success value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        Outcome(self.0.map(f))
    }

    /// Converts into a standard result.
    ///
    /// # Errors
    ///
    /// Returns the data error if the row failed.
    pub fn into_result(self) -> std::result::Result<T, ProcessError> {
        self.0
    }

    /// Converts into a crate result, wrapping data errors in [`Error::Data`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Data`] if the row failed.
    pub fn strict(self) -> crate::Result<T> {
        self.0.map_err(Error::Data)
    }
}
