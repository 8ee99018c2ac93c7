mod dto;
mod error;
mod midi;
mod shared;
mod sweep;
mod tune;

use std::fmt;
use std::fmt::Debug;
use std::fmt::Display;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::PathBuf;

use midi::MidiOptions;
use structopt::StructOpt;
use sweep::SweepOptions;
use tune::StatsOptions;
use tune::TuneOptions;

#[derive(StructOpt)]
struct MainOptions {
    /// Write output to a file instead of stdout
    #[structopt(long = "--of")]
    output_file: Option<PathBuf>,

    #[structopt(subcommand)]
    command: MainCommand,
}

#[derive(StructOpt)]
enum MainCommand {
    /// Tune a score and print the bends of every voice as YAML
    #[structopt(name = "tune")]
    Tune(TuneOptions),

    /// Print drift and retuning statistics of every chord change as CSV
    #[structopt(name = "stats")]
    Stats(StatsOptions),

    /// Tune a score and write it to a Standard MIDI File
    #[structopt(name = "midi")]
    Midi(MidiOptions),

    /// Compare the cumulative drift and tie retuning of several tolerance settings
    #[structopt(name = "sweep")]
    Sweep(SweepOptions),
}

impl MainOptions {
    fn run(self) -> CliResult<()> {
        let stdout = io::stdout();
        let output: Box<dyn Write> = match self.output_file {
            Some(output_file) => Box::new(File::create(output_file)?),
            None => Box::new(stdout.lock()),
        };

        let mut app = App { output };

        self.command.run(&mut app)
    }
}

impl MainCommand {
    fn run(self, app: &mut App) -> CliResult<()> {
        match self {
            MainCommand::Tune(options) => options.run(app),
            MainCommand::Stats(options) => options.run(app),
            MainCommand::Midi(options) => options.run(app),
            MainCommand::Sweep(options) => options.run(app),
        }
    }
}

pub fn run_in_shell_env(args: impl IntoIterator<Item = String>) -> CliResult<()> {
    let options = match MainOptions::from_iter_safe(args) {
        Err(err) => {
            return if err.use_stderr() {
                Err(CliError::CommandError(err.message))
            } else {
                println!("{err}");
                Ok(())
            };
        }
        Ok(options) => options,
    };

    options.run()
}

struct App<'a> {
    output: Box<dyn 'a + Write>,
}

impl App<'_> {
    pub fn write(&mut self, message: impl Display) -> io::Result<()> {
        write!(&mut self.output, "{message}")
    }

    pub fn writeln(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(&mut self.output, "{message}")
    }
}

pub type CliResult<T> = Result<T, CliError>;

pub enum CliError {
    IoError(io::Error),
    CommandError(String),
}

impl Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::IoError(err) => write!(f, "IO error / {err}"),
            CliError::CommandError(err) => write!(f, "The command failed / {err}"),
        }
    }
}

impl From<String> for CliError {
    fn from(v: String) -> Self {
        CliError::CommandError(v)
    }
}

impl From<io::Error> for CliError {
    fn from(v: io::Error) -> Self {
        CliError::IoError(v)
    }
}
