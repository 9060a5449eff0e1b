use std::io::{BufRead, Write};
use std::path::PathBuf;

use fiche_core::error::FicheError;
use fiche_core::extraction::Backend;
use fiche_core::inspect::inspect_file;

use crate::output;

pub fn run(input_file: Option<PathBuf>, backend: &str, output_format: &str) -> Result<(), FicheError> {
    let path = match input_file {
        Some(path) => path,
        None => match prompt_path()? {
            Some(path) => path,
            None => {
                println!("No file given.");
                return Ok(());
            }
        },
    };

    let extractor = Backend::from_name(backend)?.build();
    let structure = inspect_file(&path, extractor.as_ref())?;

    match output_format {
        "json" => output::json::print(&structure)?,
        _ => output::table::print_structure(&structure),
    }
    Ok(())
}

/// Ask for a path on stdin. An empty answer means nothing to do.
fn prompt_path() -> Result<Option<PathBuf>, FicheError> {
    print!("PDF file path: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let answer = line.trim().trim_matches('"');
    Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
}
