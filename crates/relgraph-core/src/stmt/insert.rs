use super::Value;

/// Single-row `INSERT`, optionally turned into an upsert by `on_conflict`.
#[derive(Debug, Clone)]
pub struct Insert {
    pub table: String,

    pub columns: Vec<String>,

    /// One value per column
    pub values: Vec<Value>,

    pub on_conflict: Option<OnConflict>,

    /// Columns to return from the written row
    pub returning: Vec<String>,
}

/// `ON CONFLICT (target) DO UPDATE SET c = excluded.c, ...`
#[derive(Debug, Clone)]
pub struct OnConflict {
    pub target: Vec<String>,

    /// Columns overwritten from the proposed row. Must not be empty.
    pub update: Vec<String>,
}
