//! Types command - list registered resource and data source types

use console::style;
use crdform_provider::Provider;
use serde_json::json;

use crate::error::Result;
use crate::util::to_json;

pub fn run(json_output: bool) -> Result<()> {
    let provider = Provider::new();

    if json_output {
        let listing = json!({
            "resources": provider.resource_types().collect::<Vec<_>>(),
            "data_sources": provider.data_source_types().collect::<Vec<_>>(),
        });
        println!("{}", to_json(&listing)?);
        return Ok(());
    }

    println!("{}", style("Resources:").bold());
    for name in provider.resource_types() {
        println!("  {}", style(name).cyan());
    }
    println!();
    println!("{}", style("Data sources:").bold());
    for name in provider.data_source_types() {
        println!("  {}", style(name).cyan());
    }
    Ok(())
}
