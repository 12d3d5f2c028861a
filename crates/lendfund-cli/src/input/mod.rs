pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Resolve a typed input from `--input <path>` or piped stdin.
///
/// Returns `None` when neither source is present, so callers can fall back
/// to individual flags or report what is missing.
pub fn resolve<T: DeserializeOwned>(
    input_path: &Option<String>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    if let Some(ref path) = input_path {
        return Ok(Some(file::read_typed(path)?));
    }
    if let Some(data) = stdin::read_stdin()? {
        return Ok(Some(serde_json::from_value(data)?));
    }
    Ok(None)
}
