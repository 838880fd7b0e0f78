//! CLI entrypoint for lualink
//!
//! Runs a script in a fresh engine, then optionally dumps globals and
//! calls into a script function with scalar arguments. Exists to exercise
//! the binding layer end-to-end from a real host process.

use anyhow::Result;
use clap::Parser;
use lualink_bridge::{EngineOptions, LuaEngine};
use lualink_domain::ScriptValue;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
use config::ConfigLoader;

/// CLI arguments for lualink
#[derive(Parser, Debug)]
#[command(name = "lualink")]
#[command(author, version, about = "Run Lua scripts and marshal their values across the host boundary")]
#[command(long_about = r#"
Runs a Lua 5.4 script, then inspects the state it left behind.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./lualink.toml      Project-level config
3. ~/.config/lualink/config.toml   Global config

Example:
  lualink demos/devices.lua --dump g_table
  lualink demos/devices.lua --call calc --arg 11 --arg 31 --arg __tail__
"#)]
pub struct Cli {
    /// Script file to run
    pub script: PathBuf,

    /// Global function to call after the script has run
    #[arg(short, long, value_name = "NAME")]
    pub call: Option<String>,

    /// Argument for --call; parsed as nil/bool/int/float, else passed as a
    /// string (can be specified multiple times)
    #[arg(short, long, value_name = "VALUE")]
    pub arg: Vec<String>,

    /// Global to dump after the script has run (can be specified multiple times)
    #[arg(short, long, value_name = "NAME")]
    pub dump: Vec<String>,

    /// Dump the whole globals table
    #[arg(long)]
    pub dump_globals: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,
}

/// Best-effort scalar parse for --arg values.
fn parse_scalar(text: &str) -> ScriptValue {
    if text == "nil" {
        return ScriptValue::Nil;
    }
    if let Ok(b) = text.parse::<bool>() {
        return ScriptValue::Boolean(b);
    }
    if let Ok(n) = text.parse::<i64>() {
        return ScriptValue::Integer(n);
    }
    if let Ok(n) = text.parse::<f64>() {
        return ScriptValue::Float(n);
    }
    ScriptValue::from(text)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?
    };

    let mut engine = LuaEngine::with_options(EngineOptions {
        strict: config.strict,
        max_depth: config.max_depth,
        include_functions: config.include_functions,
    })?;

    if !config.script_paths.is_empty() {
        engine.set_lua_path(&config.script_paths)?;
    }

    info!(script = %cli.script.display(), "running script");
    engine.run_script(&cli.script)?;

    for name in &cli.dump {
        println!("{}", engine.dump_global(name, config.max_depth)?);
    }
    if cli.dump_globals {
        println!("{}", engine.dump_globals(config.max_depth)?);
    }

    if let Some(name) = &cli.call {
        let args: Vec<ScriptValue> = cli.arg.iter().map(|a| parse_scalar(a)).collect();
        let results = engine.call(name, &args, None)?;
        for (i, value) in results.iter().enumerate() {
            match value {
                ScriptValue::Table(t) => println!("{}", t.render(&format!("result[{}]", i), 0)),
                other => println!("result[{}]({}):{}", i, other.type_name(), other),
            }
        }
    }

    if engine.check_stack_size(0)? {
        warn!("interpreter stack not balanced after run");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar_precedence() {
        assert_eq!(parse_scalar("nil"), ScriptValue::Nil);
        assert_eq!(parse_scalar("true"), ScriptValue::Boolean(true));
        assert_eq!(parse_scalar("42"), ScriptValue::Integer(42));
        assert_eq!(parse_scalar("2.5"), ScriptValue::Float(2.5));
        assert_eq!(parse_scalar("__the_end__"), ScriptValue::from("__the_end__"));
        // Numeric-looking text with a sign still parses as a number.
        assert_eq!(parse_scalar("-7"), ScriptValue::Integer(-7));
    }

    #[test]
    fn test_cli_parses_repeated_flags() {
        let cli = Cli::parse_from([
            "lualink",
            "script.lua",
            "--call",
            "calc",
            "--arg",
            "1",
            "--arg",
            "tail",
            "--dump",
            "g_table",
        ]);
        assert_eq!(cli.script, PathBuf::from("script.lua"));
        assert_eq!(cli.call.as_deref(), Some("calc"));
        assert_eq!(cli.arg, vec!["1", "tail"]);
        assert_eq!(cli.dump, vec!["g_table"]);
    }
}
