//! `SQLite` schema definitions for kocem dataset files.

/// SQL statement to create the datasets table.
///
/// One row per named dataset; `columns` holds the column names as a JSON array.
pub const CREATE_DATASETS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS datasets (
    name TEXT PRIMARY KEY,
    columns TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
)
";

/// SQL statement to create the rows table.
///
/// `cells` holds a JSON object keyed by column name, with sorted keys and
/// empty cells left out. `row_hash` is the BLAKE3 hash of `cells`.
pub const CREATE_ROWS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS rows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    dataset TEXT NOT NULL REFERENCES datasets(name) ON DELETE CASCADE,
    cells TEXT NOT NULL,
    row_hash TEXT NOT NULL,
    UNIQUE (dataset, row_hash)
)
";

/// SQL statement to create an index on dataset for ordered reads.
pub const CREATE_DATASET_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_rows_dataset ON rows(dataset, id)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_DATASETS_TABLE,
    CREATE_ROWS_TABLE,
    CREATE_DATASET_INDEX,
    CREATE_METADATA_TABLE,
];
