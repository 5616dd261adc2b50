//! Schema command - print the attribute tree of a type

use crdform_core::Schema;
use crdform_provider::Provider;

use crate::error::Result;
use crate::util::{to_json, to_yaml};

/// Name under which the provider configuration block is printed
const PROVIDER_SCHEMA: &str = "provider";

/// Print the schema as JSON, or an example configuration as YAML
pub fn run(type_name: &str, example: bool) -> Result<()> {
    let provider = Provider::new();
    let provider_schema: Schema;
    let schema = if type_name == PROVIDER_SCHEMA {
        provider_schema = Provider::schema();
        &provider_schema
    } else {
        provider.type_schema(type_name)?
    };

    if example {
        print!("{}", to_yaml(&schema.example_state())?);
    } else {
        println!("{}", to_json(schema)?);
    }
    Ok(())
}
