#![forbid(unsafe_code)]

/// Column id under which label paths are pushed into the hosting table's filter.
pub const LABELS_COLUMN: &str = "labels";

/// The hosting table's filter state.
pub trait TableFilter {
    fn set_table_filter(&mut self, column_id: &str, values: Vec<String>);
}
