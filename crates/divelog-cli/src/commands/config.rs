//! Config command: effective settings and their sources

use crate::output::OutputWriter;
use crate::output_types::ConfigRow;
use anyhow::Result;
use divelog_core::config::LayeredConfig;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let mut rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow {
            key,
            value,
            source: format!("{:?}", source),
        })
        .collect();
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    if output.is_json() {
        return output.result(rows);
    }

    output.section("Configuration");
    output.table(rows);
    if let Err(e) = config.validate() {
        output.warning(e);
    }
    Ok(())
}
