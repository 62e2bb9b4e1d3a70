mod cmdline;
mod console;

use clap::Parser;
use log::info;
use simple_logger::SimpleLogger;

use std::process;

fn main() {
    // Parse command line arguments.
    let args = cmdline::Args::parse();

    // Set up the logger. Everything goes to stderr; stdout carries the game or the protocol.
    SimpleLogger::new()
        .with_level(args.log_level)
        .init()
        .unwrap();

    info!("logger initialized");

    process::exit(cmdline::cmdline(args));
}
