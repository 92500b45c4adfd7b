mod cli;

use std::collections::HashMap;
use std::path::Path;

use typedprops_core::{ConfigRegistry, Error, Result};

use crate::cli::{Cli, Command, KindArg, ShapeArg};

fn main() {
    let args = Cli::parse_args();
    typedprops_core::logging::init_tracing(&args.log_level);

    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Cli) -> Result<()> {
    let raw = load_raw_properties(Path::new(&args.config))?;
    tracing::debug!(count = raw.len(), config = args.config.as_str(), "loaded raw properties");

    match args.command {
        Command::Names => {
            let mut names: Vec<_> = raw.into_keys().collect();
            names.sort();
            for name in names {
                println!("{name}");
            }
        }
        Command::Get { name, kind, shape } => {
            let registry = ConfigRegistry::with_properties(raw);
            let rendered = render_value(&registry, &name, kind, shape)?;
            println!("{rendered}");
        }
    }

    Ok(())
}

fn load_raw_properties(path: &Path) -> Result<HashMap<String, String>> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        Error::Config(format!("failed to read config '{}': {err}", path.display()))
    })?;
    parse_raw_properties(&content)
        .map_err(|err| Error::Config(format!("invalid config '{}': {err}", path.display())))
}

fn parse_raw_properties(content: &str) -> Result<HashMap<String, String>> {
    let table: toml::Table = toml::from_str(content)
        .map_err(|err| Error::Config(format!("not a TOML table: {err}")))?;

    let mut raw = HashMap::with_capacity(table.len());
    for (name, value) in table {
        match value {
            toml::Value::String(text) => {
                raw.insert(name, text);
            }
            other => {
                return Err(Error::Config(format!(
                    "property '{name}' must be a string, got {}",
                    other.type_str()
                )));
            }
        }
    }

    Ok(raw)
}

fn render_value(
    registry: &ConfigRegistry,
    name: &str,
    kind: KindArg,
    shape: ShapeArg,
) -> Result<String> {
    match (shape, kind) {
        (ShapeArg::Scalar, KindArg::String) => {
            to_json(&registry.string_property(name).required()?)
        }
        (ShapeArg::Scalar, KindArg::Double) => {
            to_json(&registry.double_property(name).required()?)
        }
        (ShapeArg::Scalar, KindArg::Long) => to_json(&registry.long_property(name).required()?),
        (ShapeArg::Scalar, KindArg::Int) => to_json(&registry.int_property(name).required()?),
        (ShapeArg::Scalar, KindArg::Duration) => {
            to_json(&format!("{:?}", registry.duration_property(name).required()?))
        }
        (ShapeArg::List, KindArg::String) => {
            to_json(&registry.string_list_property(name).required()?)
        }
        (ShapeArg::List, KindArg::Double) => {
            to_json(&registry.double_list_property(name).required()?)
        }
        (ShapeArg::List, KindArg::Long) => {
            to_json(&registry.long_list_property(name).required()?)
        }
        (ShapeArg::List, KindArg::Int) => to_json(&registry.int_list_property(name).required()?),
        (ShapeArg::List, KindArg::Duration) => {
            let values: Vec<String> = registry
                .duration_list_property(name)
                .required()?
                .into_iter()
                .map(|value| format!("{value:?}"))
                .collect();
            to_json(&values)
        }
        (ShapeArg::Multimap, KindArg::String) => {
            to_json(&registry.string_multimap_property(name).required()?)
        }
        (ShapeArg::Multimap, KindArg::Double) => {
            to_json(&registry.double_multimap_property(name).required()?)
        }
        (ShapeArg::Multimap, KindArg::Long) => {
            to_json(&registry.long_multimap_property(name).required()?)
        }
        (ShapeArg::Multimap, KindArg::Int) => {
            to_json(&registry.int_multimap_property(name).required()?)
        }
        (ShapeArg::Multimap, KindArg::Duration) => {
            let value = registry.duration_multimap_property(name).required()?;
            let mut rendered = serde_json::Map::new();
            for (key, values) in value.iter() {
                let values: Vec<String> =
                    values.iter().map(|value| format!("{value:?}")).collect();
                rendered.insert(key.to_owned(), serde_json::Value::from(values));
            }
            Ok(serde_json::Value::Object(rendered).to_string())
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|err| Error::Config(format!("failed to render value: {err}")))
}
