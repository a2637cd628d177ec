//! JSON schema generation for the shared `schema` crate types

use anyhow::{Context, Result};
use schemars::schema::RootSchema;
use schemars::schema_for;
use std::fs;
use std::path::Path;

pub fn run() -> Result<()> {
    let out_dir = Path::new("schemas");
    fs::create_dir_all(out_dir).context("create schemas directory")?;

    write_schema(
        out_dir,
        "launcher-config.schema.json",
        &schema_for!(schema::LauncherConfig),
    )?;
    write_schema(
        out_dir,
        "tunnel-info.schema.json",
        &schema_for!(schema::TunnelInfo),
    )?;
    write_schema(
        out_dir,
        "tunnel-event.schema.json",
        &schema_for!(schema::TunnelEvent),
    )?;

    println!("Schemas written to {}", out_dir.display());
    Ok(())
}

fn write_schema(out_dir: &Path, name: &str, schema: &RootSchema) -> Result<()> {
    let json = serde_json::to_string_pretty(schema).context("serialize schema")?;
    let path = out_dir.join(name);
    fs::write(&path, json + "\n").with_context(|| format!("write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}
