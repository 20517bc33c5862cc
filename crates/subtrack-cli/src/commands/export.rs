//! Export command implementation

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use subtrack_core::ExportFormat;

use super::Session;

/// Export to `output`, or stdout when no path is given
pub fn cmd_export(session: &Session, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let tracker = session.tracker();

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            let count = tracker.export(session.user_id, session.entitlement, format, &mut writer)?;
            writer.flush().context("Failed to write export")?;

            println!(
                "✅ Exported {} subscription(s) to {} ({})",
                count,
                path.display(),
                format.extension()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            tracker.export(session.user_id, session.entitlement, format, &mut writer)?;
            writer.flush().context("Failed to write export")?;
        }
    }

    Ok(())
}
