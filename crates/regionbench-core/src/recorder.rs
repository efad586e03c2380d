//! Metrics recorder
//!
//! Every scenario reports its observations through a [`MetricsRecorder`]
//! bound to that scenario's output file. One call to
//! [`MetricsRecorder::record`] appends exactly one [`MetricRow`]:
//! - with a transaction reference, the execution cost (transaction gas) and
//!   confirmation cost (enclosing block gas used) are looked up first
//! - without one, only the action, attribute and optional timing are written

use crate::error::RecorderError;
use crate::remote::LedgerClient;
use crate::types::TxHash;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Column names, in order
pub const HEADER: [&str; 5] = [
    "action",
    "attribute",
    "executionCost",
    "confirmationCost",
    "elapsedMillis",
];

/// Cost pair resolved from one transaction lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Costs {
    /// Cost of the unit of work
    pub execution: u64,
    /// Aggregate cost of the enclosing block
    pub confirmation: u64,
}

/// One observed action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow {
    /// Operation category
    pub action: String,
    /// Instance within the category
    pub attribute: String,
    /// Present only when a transaction was resolved
    pub costs: Option<Costs>,
    /// Present only when timing was requested
    pub elapsed_millis: Option<u64>,
}

impl MetricRow {
    /// Render as one newline-terminated CSV line
    #[must_use]
    pub fn to_csv_line(&self) -> String {
        let mut line = String::with_capacity(self.action.len() + self.attribute.len() + 32);
        line.push_str(&self.action);
        line.push(',');
        line.push_str(&self.attribute);
        line.push(',');
        if let Some(costs) = self.costs {
            let _ = write!(line, "{},{}", costs.execution, costs.confirmation);
        } else {
            line.push(',');
        }
        line.push(',');
        if let Some(ms) = self.elapsed_millis {
            let _ = write!(line, "{ms}");
        }
        line.push('\n');
        line
    }
}

/// Header line as written at the top of every output file
#[must_use]
pub fn header_line() -> String {
    let mut line = HEADER.join(",");
    line.push('\n');
    line
}

/// Options for one `record` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRequest {
    /// Operation category
    pub action: String,
    /// Instance within the category
    pub attribute: String,
    /// Transaction whose costs should be recorded
    pub transaction: Option<TxHash>,
    /// Start of the measured interval; `Some` requests timing
    pub started_at: Option<Instant>,
}

impl RecordRequest {
    /// Create a bare request
    #[inline]
    #[must_use]
    pub fn new(action: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            attribute: attribute.into(),
            transaction: None,
            started_at: None,
        }
    }

    /// Resolve costs from this transaction
    #[inline]
    #[must_use]
    pub fn with_transaction(mut self, hash: TxHash) -> Self {
        self.transaction = Some(hash);
        self
    }

    /// Record elapsed time since `started_at`
    #[inline]
    #[must_use]
    pub fn timed_from(mut self, started_at: Instant) -> Self {
        self.started_at = Some(started_at);
        self
    }
}

#[derive(Debug)]
struct Sink {
    file: File,
    rows: u64,
}

/// Appends metric rows to one scenario's output file
pub struct MetricsRecorder {
    path: PathBuf,
    client: Arc<dyn LedgerClient>,
    sink: Mutex<Sink>,
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl MetricsRecorder {
    /// Create (or truncate) the output file and write the header
    ///
    /// # Errors
    /// `RecorderError::Io` if the file cannot be created or written
    pub async fn create(
        path: impl Into<PathBuf>,
        client: Arc<dyn LedgerClient>,
    ) -> Result<Self, RecorderError> {
        let path = path.into();
        let mut file = File::create(&path)
            .await
            .map_err(|e| RecorderError::io_error(&path, e))?;
        write_line(&mut file, &path, &header_line()).await?;
        tracing::debug!(path = %path.display(), "output file created");

        Ok(Self {
            path,
            client,
            sink: Mutex::new(Sink { file, rows: 0 }),
        })
    }

    /// Record one action
    ///
    /// Elapsed time is taken on entry, before any cost lookup.
    ///
    /// # Errors
    /// - `RecorderError::Lookup` if the transaction or its block cannot be resolved
    /// - `RecorderError::Pending` if the transaction has no block yet
    /// - `RecorderError::Io` if the row cannot be appended
    ///
    /// No row is written when an error is returned.
    pub async fn record(&self, request: RecordRequest) -> Result<(), RecorderError> {
        let elapsed_millis = request.started_at.map(elapsed_millis_since);

        let costs = match &request.transaction {
            Some(hash) => Some(self.resolve_costs(hash).await?),
            None => None,
        };

        let row = MetricRow {
            action: request.action,
            attribute: request.attribute,
            costs,
            elapsed_millis,
        };
        self.append(&row).await
    }

    /// Transaction gas, then the gas used by its block
    async fn resolve_costs(&self, hash: &TxHash) -> Result<Costs, RecorderError> {
        let tx = self.client.transaction(hash).await?;
        let block_number = tx
            .block_number
            .ok_or_else(|| RecorderError::Pending(hash.clone()))?;
        let block = self.client.block(block_number).await?;
        Ok(Costs {
            execution: tx.gas,
            confirmation: block.gas_used,
        })
    }

    /// Append a pre-built row
    pub async fn append(&self, row: &MetricRow) -> Result<(), RecorderError> {
        let line = row.to_csv_line();
        let mut sink = self.sink.lock().await;
        write_line(&mut sink.file, &self.path, &line).await?;
        sink.rows += 1;
        tracing::trace!(path = %self.path.display(), action = %row.action, attribute = %row.attribute, "row recorded");
        Ok(())
    }

    /// Output file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far (header excluded)
    pub async fn rows_written(&self) -> u64 {
        self.sink.lock().await.rows
    }
}

async fn write_line(file: &mut File, path: &Path, line: &str) -> Result<(), RecorderError> {
    file.write_all(line.as_bytes())
        .await
        .map_err(|e| RecorderError::io_error(path, e))?;
    file.flush()
        .await
        .map_err(|e| RecorderError::io_error(path, e))
}

/// Whole milliseconds since `started_at`, saturating at `u64::MAX`
pub(crate) fn elapsed_millis_since(started_at: Instant) -> u64 {
    u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_matches_columns() {
        assert_eq!(
            header_line(),
            "action,attribute,executionCost,confirmationCost,elapsedMillis\n"
        );
    }

    #[test]
    fn bare_row_renders_empty_fields() {
        let row = MetricRow {
            action: "lookup".into(),
            attribute: "u4pruy".into(),
            costs: None,
            elapsed_millis: None,
        };
        assert_eq!(row.to_csv_line(), "lookup,u4pruy,,,\n");
    }

    #[test]
    fn full_row_renders_bare_integers() {
        let row = MetricRow {
            action: "add-cells".into(),
            attribute: "harbor".into(),
            costs: Some(Costs {
                execution: 6_721_975,
                confirmation: 143_250,
            }),
            elapsed_millis: Some(0),
        };
        assert_eq!(row.to_csv_line(), "add-cells,harbor,6721975,143250,0\n");
    }

    #[test]
    fn timing_only_row() {
        let row = MetricRow {
            action: "query".into(),
            attribute: "d1".into(),
            costs: None,
            elapsed_millis: Some(12),
        };
        assert_eq!(row.to_csv_line(), "query,d1,,,12\n");
    }

    #[test]
    fn elapsed_millis_counts_whole_milliseconds() {
        let Some(started) = Instant::now().checked_sub(std::time::Duration::from_millis(1_500))
        else {
            return;
        };
        let millis = elapsed_millis_since(started);
        assert!((1_500..60_000).contains(&millis));
    }

    #[test]
    fn request_builder() {
        let now = Instant::now();
        let req = RecordRequest::new("move", "d7")
            .with_transaction(TxHash::new("0x01"))
            .timed_from(now);
        assert_eq!(req.transaction, Some(TxHash::new("0x01")));
        assert_eq!(req.started_at, Some(now));

        let bare = RecordRequest::new("lookup", "c");
        assert!(bare.transaction.is_none() && bare.started_at.is_none());
    }
}
