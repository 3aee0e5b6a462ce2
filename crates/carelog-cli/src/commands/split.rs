//! Split command - filter a facility export and write one CSV per floor.

use std::path::PathBuf;

use carelog::{SplitConfig, Splitter};

pub fn run(
    file: PathBuf,
    output_dir: Option<PathBuf>,
    suffix: String,
) -> Result<(), Box<dyn std::error::Error>> {
    let splitter = Splitter::with_config(SplitConfig {
        output_dir,
        suffix,
        ..Default::default()
    });

    let paths = splitter.run(&file)?;
    if paths.is_empty() {
        tracing::warn!(file = %file.display(), "no rows left after filtering; nothing written");
    }

    for path in paths {
        println!("{}", path.display());
    }

    Ok(())
}
