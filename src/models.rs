use serde::{Deserialize, Serialize};

/// One row of the exported snapshot. The CSV columns and the JSON object
/// keys share this five-field layout, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub id: String,
    pub repo_name: String,
    pub owner: String,
    pub stars: u32,
    pub last_updated: String,
}
