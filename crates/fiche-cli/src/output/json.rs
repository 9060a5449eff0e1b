use fiche_core::error::FicheError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), FicheError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
