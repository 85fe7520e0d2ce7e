use std::fmt::Display;

use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::context::Context;
use crate::error::Result;

/// Keys whose values are hidden when redaction is on.
const SENSITIVE_KEYS: [&str; 4] = ["serial_number", "asset_tag", "uuid", "mac_address"];
const REDACTED: &str = "redacted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Yaml,
    Json,
}

/// Render `data` in the requested format. Structured formats wrap it under `key`.
pub fn render<T: Serialize + Display>(
    ctx: &Context,
    key: &str,
    data: &T,
    format: Format,
    pretty: bool,
) -> Result<String> {
    match format {
        Format::Text => Ok(data.to_string()),
        Format::Yaml => to_yaml(ctx, key, data),
        Format::Json => to_json(ctx, key, data, pretty),
    }
}

pub fn to_yaml<T: Serialize>(ctx: &Context, key: &str, data: &T) -> Result<String> {
    let wrapped = wrap(ctx, key, data)?;
    Ok(serde_yaml::to_string(&wrapped)?)
}

pub fn to_json<T: Serialize>(ctx: &Context, key: &str, data: &T, pretty: bool) -> Result<String> {
    let wrapped = wrap(ctx, key, data)?;
    if pretty {
        Ok(serde_json::to_string_pretty(&wrapped)?)
    } else {
        Ok(serde_json::to_string(&wrapped)?)
    }
}

/// `{ key: data }`, with sensitive values masked if the context asks for it.
fn wrap<T: Serialize>(ctx: &Context, key: &str, data: &T) -> Result<Value> {
    let mut inner = serde_json::to_value(data)?;
    if ctx.redact() {
        redact(&mut inner);
    }

    let mut map = Map::new();
    map.insert(key.to_string(), inner);
    Ok(Value::Object(map))
}

fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if SENSITIVE_KEYS.contains(&key.as_str()) && !v.is_null() {
                    *v = Value::String(REDACTED.to_string());
                } else {
                    redact(v);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

pub fn print_error(message: &str) {
    eprintln!("\x1b[31m❌ Error: {}\x1b[0m", message);
}
