use std::fs::File;
use std::path::Path;
use std::path::PathBuf;

use barbershop::chord::ChordType;
use barbershop::chord::Song;
use barbershop::score;
use barbershop::table::IntervalTable;
use barbershop::table::TuningTables;
use barbershop::tuner::BarbershopTuner;
use barbershop::tuner::Priority;
use barbershop::tuner::TunedSong;
use barbershop::tuner::TunerOptions;
use log::info;
use structopt::StructOpt;

use crate::error::ResultExt;
use crate::CliResult;

#[derive(StructOpt)]
pub struct ScoreArgs {
    /// Score file with one chord per line, e.g. EnM(en3t,bn3 ,en4t,g#4 )280
    pub score_file: PathBuf,

    #[structopt(flatten)]
    pub tuner: TunerArgs,
}

impl ScoreArgs {
    pub fn load_song(&self) -> CliResult<Song> {
        load_song(&self.score_file)
    }

    pub fn tune(&self) -> CliResult<(Song, TunedSong)> {
        let song = self.load_song()?;
        let tuned = self
            .tuner
            .create_tuner()?
            .tune_song(&song)
            .handle_error::<String>("Could not tune song")?;
        Ok((song, tuned))
    }
}

#[derive(StructOpt)]
pub struct TunerArgs {
    /// Size of a 12-EDO semitone in bend units
    #[structopt(long = "half-step", default_value = "1.0")]
    pub half_step_size: f64,

    /// How far a held note may retune across a chord change
    #[structopt(long = "tie-radius", default_value = "0.03")]
    pub tie_radius: f64,

    /// How far the lead may move between consecutive chords
    #[structopt(long = "lead-radius", default_value = "0.15")]
    pub lead_radius: f64,

    /// Constraint that wins in case of a conflict: ties-first (t) or lead-first (l)
    #[structopt(long = "priority", default_value = "ties-first")]
    pub priority: Priority,

    #[structopt(flatten)]
    pub tables: TablesArg,
}

#[derive(StructOpt)]
pub struct TablesArg {
    /// Directory containing tuning tables (major.txt, minor.txt, dominant7.txt, diminished7.txt, half-diminished7.txt).
    /// Missing files fall back to the built-in tables.
    #[structopt(long = "tables")]
    pub tables_dir: Option<PathBuf>,
}

impl TablesArg {
    pub fn load(&self) -> CliResult<TuningTables> {
        match &self.tables_dir {
            Some(tables_dir) => load_tables(tables_dir),
            None => Ok(TuningTables::default()),
        }
    }
}

impl TunerArgs {
    pub fn options(&self) -> TunerOptions {
        TunerOptions {
            half_step_size: self.half_step_size,
            tie_radius: self.tie_radius,
            lead_radius: self.lead_radius,
            priority: self.priority,
        }
    }

    pub fn create_tuner(&self) -> CliResult<BarbershopTuner> {
        Ok(BarbershopTuner::new(self.options(), self.tables.load()?))
    }
}

pub fn load_song(file_name: &Path) -> CliResult<Song> {
    let file = File::open(file_name)
        .map_err(|io_err| format!("Could not read score file: {io_err}"))?;
    Ok(score::import(file).handle_error::<String>("Could not import score file")?)
}

fn load_tables(tables_dir: &Path) -> CliResult<TuningTables> {
    let mut tables = TuningTables::default();
    for chord_type in ChordType::ALL {
        let file_name = tables_dir.join(format!("{}.txt", chord_type.file_stem()));
        if !file_name.exists() {
            continue;
        }
        info!("Loading tuning table {}", file_name.display());

        let file = File::open(&file_name)
            .map_err(|io_err| format!("Could not read tuning table: {io_err}"))?;
        let table = IntervalTable::import(file).handle_error::<String>(&format!(
            "Could not import tuning table {}",
            file_name.display()
        ))?;
        tables = tables.with_table(chord_type, table);
    }
    Ok(tables)
}
