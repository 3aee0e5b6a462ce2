//! CSV output with a UTF-8 byte-order marker.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{CarelogError, Result};
use crate::input::{DataTable, UTF8_BOM};

/// Write `table` as comma-separated UTF-8 with a leading BOM.
pub fn write_csv(table: &DataTable, path: &Path) -> Result<()> {
    let io_err = |e: std::io::Error| CarelogError::Io {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }

    let file = File::create(path).map_err(io_err)?;
    let mut out = BufWriter::new(file);
    out.write_all(UTF8_BOM).map_err(io_err)?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b',')
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer.flush().map_err(io_err)?;
    Ok(())
}
