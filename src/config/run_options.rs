use std::{env, path::PathBuf};

use getopts::Options;
use tracing::warn;

use crate::config::CONFIG_FILE;

#[derive(Clone, Debug, Default)]
pub struct Args {
    pub cfg_file: PathBuf,
    // test helper
    pub cfg_str: Option<String>,
}

pub fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} [options] [config_file]", program);
    print!("{}", opts.usage(&brief));
}

/// Parses the process arguments. `None` means usage was requested and printed.
pub fn get_args() -> Option<Args> {
    let args: Vec<String> = env::args().collect();
    parse_args(&args)
}

pub fn parse_args(args: &[String]) -> Option<Args> {
    let program = args.first().cloned().unwrap_or_else(|| "geomock".to_owned());
    let mut opts = Options::new();
    opts.optflag("h", "help", "print this help menu");

    let default_args = Args { cfg_file: default_cfg_file(), cfg_str: None };
    let matches = match opts.parse(args.iter().skip(1)) {
        Ok(m) => m,
        Err(f) => {
            warn!("Error parsing arguments: {}", f);
            warn!("Proceeding with defaults.");
            print_usage(&program, &opts);
            return Some(default_args);
        }
    };
    if matches.opt_present("h") {
        print_usage(&program, &opts);
        return None;
    }

    let Some(config_file_path) = matches.free.first() else {
        return Some(default_args);
    };
    Some(Args { cfg_file: PathBuf::from(config_file_path), cfg_str: None })
}

pub fn default_cfg_file() -> PathBuf {
    let mut config_path = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    config_path.push(CONFIG_FILE);
    config_path
}
