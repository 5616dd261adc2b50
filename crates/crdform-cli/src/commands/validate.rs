//! Validate command - check a configuration block against a type's schema

use console::style;
use crdform_provider::Provider;
use serde_json::json;
use std::path::Path;

use crate::display::{print_diagnostics, success};
use crate::error::{CliError, Result};
use crate::util::{read_document, to_json};

pub fn run(type_name: &str, file: &Path, json_output: bool) -> Result<()> {
    let provider = Provider::new();
    let schema = provider.type_schema(type_name)?;
    let config = read_document(file)?;
    let diags = schema.validate_config(&config);

    if json_output {
        let report = json!({
            "type": type_name,
            "valid": !diags.has_error(),
            "diagnostics": &diags,
        });
        println!("{}", to_json(&report)?);
    } else {
        println!(
            "{} Validating {} against {}",
            style("→").blue(),
            file.display(),
            style(type_name).cyan()
        );
        print_diagnostics(&diags);
        if !diags.has_error() {
            success("Validation passed");
        }
    }

    if diags.has_error() {
        return Err(CliError::validation(&diags));
    }
    Ok(())
}
