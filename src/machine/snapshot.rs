//! Serializable point-in-time view of a machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Diagnostic snapshot of a [`StateMachine`](crate::StateMachine).
///
/// States and triggers are rendered with their `Debug` representation, so
/// the snapshot serializes without placing serde bounds on the key types.
/// The permitted triggers are sorted for stable output.
///
/// # Example
///
/// ```rust
/// use statecraft::StateMachine;
///
/// let mut machine = StateMachine::new("off");
/// machine.configure("off").permit("toggle", "on").unwrap();
///
/// let snapshot = machine.snapshot();
/// assert_eq!(snapshot.state, "\"off\"");
/// assert_eq!(snapshot.permitted_triggers, ["\"toggle\""]);
///
/// let json = serde_json::to_string(&snapshot).unwrap();
/// assert!(json.contains("permitted_triggers"));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    /// Identity of the machine the snapshot was taken from
    pub id: Uuid,
    /// Debug rendering of the current state
    pub state: String,
    /// Debug renderings of the currently permitted triggers, sorted
    pub permitted_triggers: Vec<String>,
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
}
