#![forbid(unsafe_code)]

use lt_core::TableFilter;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// Column filters of the hosting resource table, kept in memory for the lifetime of the server.
#[derive(Clone, Debug, Default)]
pub(crate) struct TableFilterState {
    columns: BTreeMap<String, Vec<String>>,
}

impl TableFilterState {
    pub(crate) fn clear(&mut self) {
        self.columns.clear();
    }

    pub(crate) fn to_json(&self) -> Value {
        let columns = self
            .columns
            .iter()
            .map(|(column, values)| json!({ "column": column, "values": values }))
            .collect::<Vec<_>>();
        Value::Array(columns)
    }
}

impl TableFilter for TableFilterState {
    fn set_table_filter(&mut self, column_id: &str, values: Vec<String>) {
        tracing::debug!(column = column_id, values = values.len(), "table filter set");
        if values.is_empty() {
            self.columns.remove(column_id);
        } else {
            self.columns.insert(column_id.to_string(), values);
        }
    }
}
