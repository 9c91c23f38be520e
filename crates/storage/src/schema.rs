//! Posture record table layout

/// Table holding every posture record
pub const TABLE: &str = "posture_record";

/// Columns in select order, matching the fields of `PostureRecord`
pub const COLUMNS: &str = "id, user_id, neck_angle, posture_state, recorded_at";

/// Idempotent table bootstrap.
///
/// AUTOINCREMENT keeps ids from being reused after rows are removed out of band.
pub const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS posture_record (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT,
    neck_angle REAL NOT NULL,
    posture_state TEXT,
    recorded_at TEXT NOT NULL
)";

pub fn insert_returning() -> String {
    format!(
        "INSERT INTO {TABLE} (user_id, neck_angle, posture_state, recorded_at) \
         VALUES (?, ?, ?, ?) RETURNING {COLUMNS}"
    )
}

pub fn select_all() -> String {
    format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY id ASC")
}

pub fn select_by_user() -> String {
    format!("SELECT {COLUMNS} FROM {TABLE} WHERE user_id = ? ORDER BY id ASC")
}
