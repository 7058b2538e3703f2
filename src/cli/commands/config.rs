use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ui::messages::warning;
use std::fs;

pub fn handle(cmd: &Commands, _cfg: &Config) -> AppResult<()> {
    if let Commands::Config { print_config } = cmd {
        if *print_config {
            let path = Config::config_file();
            if path.exists() {
                println!("📄 {}\n", path.display());
                println!("{}", fs::read_to_string(&path)?);
            } else {
                warning(format!(
                    "No configuration file at {} (run `eventboard init` to create it)",
                    path.display()
                ));
            }
        }
    }
    Ok(())
}
