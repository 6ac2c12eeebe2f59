// CLI module
// Command-line interface, argument parsing and batch file loading

mod args;

pub use args::{CliArgs, Command, LogCommand, MovementArgs, StrategyType};

use crate::types::{InventoryError, MovementRequest};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Parse command-line arguments using clap
///
/// On invalid arguments or `--help`, clap prints the message and exits the
/// process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}

/// Movement requests described by `args`
///
/// Either the single inline movement or every entry of the JSON batch file.
///
/// # Errors
///
/// - `InventoryError::Io` if the batch file cannot be opened
/// - `InventoryError::Parse` if it is not a JSON array of movement objects
pub fn load_requests(args: &MovementArgs) -> Result<Vec<MovementRequest>, InventoryError> {
    if let Some(path) = &args.file {
        return read_batch_file(path);
    }

    Ok(vec![MovementRequest {
        kind: args.kind.clone(),
        product: args.product.clone().map(serde_json::Value::String),
        quantity: args.quantity.map(serde_json::Value::from),
    }])
}

fn read_batch_file(path: &Path) -> Result<Vec<MovementRequest>, InventoryError> {
    let file = File::open(path).map_err(|e| InventoryError::Io {
        message: format!("Failed to open file '{}': {}", path.display(), e),
    })?;

    let requests: Vec<MovementRequest> =
        serde_json::from_reader(BufReader::new(file)).map_err(|e| InventoryError::Parse {
            line: Some(e.line() as u64),
            message: format!("{}: {}", path.display(), e),
        })?;

    tracing::debug!(path = %path.display(), entries = requests.len(), "read batch file");
    Ok(requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn batch_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_inline_movement() {
        let args = MovementArgs {
            kind: Some("Sortie".to_string()),
            product: Some("P1".to_string()),
            quantity: Some(4),
            file: None,
        };

        assert_eq!(
            load_requests(&args).unwrap(),
            vec![MovementRequest::new("Sortie", "P1", 4)]
        );
    }

    #[test]
    fn test_batch_file_keeps_loose_values() {
        let file = batch_file(
            r#"[
                {"type": "Entree", "product": "P1", "quantity": 5},
                {"type": "Sortie", "product": 42, "quantity": "3"},
                {"product": "P2"}
            ]"#,
        );
        let args = MovementArgs {
            kind: None,
            product: None,
            quantity: None,
            file: Some(file.path().to_path_buf()),
        };

        let requests = load_requests(&args).unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].product_key().as_deref(), Some("42"));
        assert_eq!(requests[1].quantity, Some(Value::from("3")));
        assert_eq!(requests[2].kind, None);
    }

    #[test]
    fn test_batch_file_not_an_array() {
        let file = batch_file("{\n  \"type\": \"Entree\"\n}");
        let error = read_batch_file(file.path()).unwrap_err();

        assert!(matches!(error, InventoryError::Parse { line: Some(_), .. }));
    }

    #[test]
    fn test_batch_file_missing() {
        let error = read_batch_file(Path::new("no-such-batch.json")).unwrap_err();
        assert!(error.to_string().contains("Failed to open file"));
    }
}
