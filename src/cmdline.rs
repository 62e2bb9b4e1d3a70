use crate::console::Console;

use clap::Parser;
use control::config::default_engine_path;
use control::server;
use control::transport::{Child, Local, Transport};
use control::{Config, Controller, Players, Side};
use engine::Limits;
use log::{error, info, LevelFilter};

use std::io;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Serve the engine line protocol on stdin/stdout instead of playing
    #[clap(short, long)]
    pub serve: bool,

    /// Play against an engine executable speaking the line protocol [default path: out/chess]
    #[clap(short, long, value_name = "PATH")]
    pub engine: Option<Option<PathBuf>>,

    /// The side you play: white or black. Asked for when absent
    #[clap(short, long, value_name = "SIDE")]
    pub color: Option<Side>,

    /// Let the in-process engine play both sides
    #[clap(long, conflicts_with_all = &["hotseat", "color", "engine"])]
    pub auto: bool,

    /// Two humans share the board
    #[clap(long, conflicts_with_all = &["color", "engine"])]
    pub hotseat: bool,

    /// Maximum search depth in plies
    #[clap(short, long, default_value_t = engine::search::params::DEFAULT_MAX_DEPTH)]
    pub depth: u8,

    /// Search time limit in seconds
    #[clap(short, long, value_name = "SECS", default_value_t = 5)]
    pub time: u64,

    /// How long to wait for each reply from an engine process, in milliseconds
    #[clap(long, value_name = "MS", default_value_t = 5000)]
    pub timeout: u64,

    /// Print the engine's search debug output
    #[clap(long)]
    pub debug: bool,

    /// Log level on stderr: off, error, warn, info, debug or trace
    #[clap(long, default_value = "warn")]
    pub log_level: LevelFilter,
}

impl Args {
    fn limits(&self) -> Limits {
        Limits::new(self.depth, Duration::from_secs(self.time)).with_debug(self.debug)
    }
}

/// Run the mode selected on the command line and return the process exit code.
pub fn cmdline(args: Args) -> i32 {
    if args.serve {
        let stdin = io::stdin();
        let stdout = io::stdout();
        return match server::serve(stdin.lock(), stdout.lock(), args.limits()) {
            Ok(()) => 0,
            Err(err) => {
                error!("engine server failed: {}", err);
                1
            }
        };
    }

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());
    match play(&args, &mut console) {
        Ok(code) => code,
        Err(err) => {
            error!("console failed: {}", err);
            1
        }
    }
}

fn play<R, W>(args: &Args, console: &mut Console<R, W>) -> io::Result<i32>
where
    R: io::BufRead,
    W: io::Write,
{
    let players = if args.auto {
        Players::engine_only()
    } else if args.hotseat {
        Players::hotseat()
    } else {
        let side = match args.color {
            Some(side) => side,
            None => match console.ask_side()? {
                Some(side) => side,
                None => return Ok(0),
            },
        };
        Players::versus_engine(side)
    };

    let config = Config {
        players,
        limits: args.limits(),
        reply_timeout: Duration::from_millis(args.timeout),
    };

    let transport: Box<dyn Transport> = match &args.engine {
        Some(path) => {
            let path = path.clone().unwrap_or_else(default_engine_path);
            info!("using engine process {}", path.display());
            match Child::spawn(&path, config.reply_timeout) {
                Ok(child) => Box::new(child),
                Err(err) => {
                    console.say(&format!("Could not start the engine: {}", err))?;
                    return Ok(1);
                }
            }
        }
        None => Box::new(Local::new()),
    };

    let mut ctl = Controller::new(transport, config);
    let code = console.play(&mut ctl)?;
    ctl.finish();
    Ok(code)
}
