extern crate pagecal as lib;

use chrono::Local;
use flexi_logger::{FileSpec, Logger};
use lib::config::Orientation;
use lib::events::Dispatcher;
use lib::ui::{render_text, App, Context};
use nix::sys::{signal, termios};
use std::io::stdout;
use std::path::PathBuf;
use structopt::StructOpt;
use unsegen::base::Terminal;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "pagecal",
    about = "Pagecal - A paged month calendar for the terminal."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(
        long = "vertical",
        help = "page months vertically",
        conflicts_with = "horizontal"
    )]
    pub vertical: bool,

    #[structopt(long = "horizontal", help = "page months horizontally")]
    pub horizontal: bool,

    #[structopt(
        short = "s",
        long = "show",
        help = "only print the current month non-interactively"
    )]
    pub show: bool,

    #[structopt(
        short = "n",
        long = "months",
        default_value = "1",
        help = "number of months printed by --show"
    )]
    pub months: usize,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    logger.start()?;

    let mut config = lib::config::load_suitable_config(args.configfile.as_deref())?;
    if args.vertical {
        config.orientation = Orientation::Vertical;
    } else if args.horizontal {
        config.orientation = Orientation::Horizontal;
    }

    let today = Local::now().date_naive();

    if args.show {
        println!("{}", render_text(&Context::new(&config, today), args.months));
        return Ok(());
    }

    const STDIN: std::os::unix::io::RawFd = 0;
    let orig_attr = std::sync::Mutex::new(termios::tcgetattr(STDIN)?);

    std::panic::set_hook(Box::new(move |info| {
        // Back to the main screen before printing anything
        println!("{}{}", termion::screen::ToMainScreen, termion::cursor::Show);

        if let Ok(attr) = orig_attr.lock() {
            let _ = termios::tcsetattr(STDIN, termios::SetArg::TCSANOW, &attr);
        }

        println!("Pagecal ran into a fatal error!");
        println!("Consider filing an issue with a log file and the backtrace below.");

        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let mut signals_to_wait = signal::SigSet::empty();
    signals_to_wait.add(signal::SIGWINCH);

    let dispatcher = Dispatcher::from_config(&config, signals_to_wait);
    // Setup unsegen terminal
    let stdout = stdout();
    let term = Terminal::new(stdout.lock())?;

    let mut app = App::new(&config, today);

    app.run(dispatcher, term)
}
