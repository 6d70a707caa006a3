use std::process::exit;

use tcd_cli::{Pipeline, PipelineConfig, TcdError, TcdResult};

fn main() {
    let mut args = std::env::args().skip(1);
    let config_path = match args.next() {
        Some(path) => path,
        None => {
            eprintln!("Usage: tcd <config.toml>");
            exit(2);
        }
    };

    if let Err(err) = run(&config_path) {
        eprintln!("Error: {}", err);
        exit(1);
    }
}

fn run(config_path: &str) -> TcdResult<()> {
    let config = PipelineConfig::load_toml(config_path)?;
    tcd_core::init_thread_pool(config.n_threads)
        .map_err(|e| TcdError::Config(format!("thread pool: {}", e)))?;
    Pipeline::new(config)?.run()
}
