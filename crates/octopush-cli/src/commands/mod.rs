pub mod replay;

use anyhow::Result;
use octopush_cli::AppConfig;

use crate::output::print_field;

pub fn show_config(cfg: &AppConfig, source: Option<&str>) -> Result<()> {
    print_field(
        "Source",
        source.unwrap_or(octopush_cli::config::loader::DEFAULT_CONFIG_FILE),
    );
    println!();
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
