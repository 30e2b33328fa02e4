//! # Calculation History Records
//!
//! One record per completed run, in the shape an external store receives.
//! Persistence itself is the collaborator's concern; this crate only
//! defines what it hands over.
//!
//! ## Example
//!
//! ```rust
//! use rail_core::calculations::ToolKind;
//! use rail_core::history::HistoryRecord;
//! use serde_json::json;
//!
//! let record = HistoryRecord::new(
//!     ToolKind::AxleLoad,
//!     json!({ "wheel_diameter_mm": 920.0, "grade": "880 N/mm²" }),
//!     json!({ "qmax_kn": 243.09, "qmax_t": 24.79 }),
//! )
//! .with_label("920 mm wheel, standard grade");
//!
//! assert_eq!(record.tool, ToolKind::AxleLoad);
//! assert!(record.label.is_some());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::calculations::ToolKind;

/// One completed calculation, ready for the history store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRecord {
    /// Unique record id
    pub id: Uuid,

    /// Tool that produced the record
    pub tool: ToolKind,

    /// Optional user-facing name for the run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// When the calculation completed (UTC)
    pub created_at: DateTime<Utc>,

    /// Input snapshot, exactly as validated
    pub input: Value,

    /// Output record, exactly as returned to the caller
    pub output: Value,
}

impl HistoryRecord {
    /// Create a record for a completed run, stamped now.
    pub fn new(tool: ToolKind, input: Value, output: Value) -> Self {
        HistoryRecord {
            id: Uuid::new_v4(),
            tool,
            label: None,
            created_at: Utc::now(),
            input,
            output,
        }
    }

    /// Attach a user-facing name.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}
