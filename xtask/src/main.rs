use std::env;
use std::error::Error;
use std::fs;
use std::path::Path;

use hub_runtime::{rules_config_schema, HubRulesConfig};
use jsonschema::JSONSchema;

const RULES_CONFIG_GLOBS: [&str; 2] = [
    "hub_runtime/src/data/*.json",
    "integration_tests/tests/fixtures/*.json",
];

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("validate-config") => validate_config(args.next()),
        Some("print-schema") => print_schema(),
        Some("help") | None => {
            print_usage();
            Ok(())
        }
        Some(cmd) => {
            eprintln!("Unknown xtask '{cmd}'.");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: cargo xtask validate-config [path]");
    eprintln!("       cargo xtask print-schema");
    eprintln!("       cargo xtask help");
}

fn print_schema() -> Result<(), Box<dyn Error>> {
    let schema = serde_json::to_string_pretty(&rules_config_schema())?;
    println!("{schema}");
    Ok(())
}

fn validate_config(path: Option<String>) -> Result<(), Box<dyn Error>> {
    let schema_value = serde_json::to_value(rules_config_schema())?;
    let schema = JSONSchema::compile(&schema_value)
        .map_err(|err| format!("rules schema does not compile: {err}"))?;

    let paths = match path {
        Some(path) => vec![path.into()],
        None => {
            let mut paths = Vec::new();
            for pattern in RULES_CONFIG_GLOBS {
                for entry in glob::glob(pattern)? {
                    paths.push(entry?);
                }
            }
            paths
        }
    };
    if paths.is_empty() {
        return Err("no hub rules files found".into());
    }

    let mut failed = 0;
    for path in &paths {
        match validate_file(&schema, path) {
            Ok(()) => println!("ok      {}", path.display()),
            Err(problems) => {
                failed += 1;
                println!("invalid {}", path.display());
                for problem in problems {
                    println!("    {problem}");
                }
            }
        }
    }

    if failed > 0 {
        return Err(format!("{failed} of {} hub rules files failed validation", paths.len()).into());
    }
    Ok(())
}

fn validate_file(schema: &JSONSchema, path: &Path) -> Result<(), Vec<String>> {
    let raw = fs::read_to_string(path).map_err(|err| vec![err.to_string()])?;
    let instance: serde_json::Value =
        serde_json::from_str(&raw).map_err(|err| vec![err.to_string()])?;

    if let Err(errors) = schema.validate(&instance) {
        return Err(errors
            .map(|err| format!("{}: {err}", err.instance_path))
            .collect());
    }

    let config = HubRulesConfig::from_json_str(&raw).map_err(|err| vec![err.to_string()])?;
    config.validate().map_err(|err| vec![err.to_string()])
}
