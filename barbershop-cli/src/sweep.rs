use std::path::PathBuf;

use barbershop::chord::Song;
use barbershop::table::TuningTables;
use barbershop::tuner::BarbershopTuner;
use barbershop::tuner::Priority;
use barbershop::tuner::TunedSong;
use barbershop::tuner::TunerOptions;
use structopt::StructOpt;

use crate::error::ResultExt;
use crate::shared;
use crate::shared::TablesArg;
use crate::App;
use crate::CliResult;

#[derive(StructOpt)]
pub(crate) struct SweepOptions {
    /// Score file with one chord per line
    score_file: PathBuf,

    /// Comma-separated tie radii to try
    #[structopt(
        long = "tie-radii",
        use_delimiter = true,
        default_value = "0.0,0.01,0.03,0.05,0.1"
    )]
    tie_radii: Vec<f64>,

    /// Comma-separated lead radii to try
    #[structopt(
        long = "lead-radii",
        use_delimiter = true,
        default_value = "0.05,0.15,0.3"
    )]
    lead_radii: Vec<f64>,

    /// Size of a 12-EDO semitone in bend units
    #[structopt(long = "half-step", default_value = "1.0")]
    half_step_size: f64,

    #[structopt(flatten)]
    tables: TablesArg,
}

impl SweepOptions {
    pub fn run(&self, app: &mut App) -> CliResult<()> {
        let song = shared::load_song(&self.score_file)?;
        let tables = self.tables.load()?;

        app.writeln("tie_radius,lead_radius,priority,cumulative_drift,max_tie_retuning")?;
        for &tie_radius in &self.tie_radii {
            for &lead_radius in &self.lead_radii {
                for priority in [Priority::TiesFirst, Priority::LeadFirst] {
                    let options = TunerOptions {
                        half_step_size: self.half_step_size,
                        tie_radius,
                        lead_radius,
                        priority,
                    };
                    let tuned = tune(options, tables.clone(), &song)?;
                    app.writeln(format_args!(
                        "{},{},{},{:.6},{:.6}",
                        tie_radius,
                        lead_radius,
                        priority,
                        tuned.cumulative_drift(),
                        max_tie_retuning(&tuned)
                    ))?;
                }
            }
        }

        Ok(())
    }
}

fn tune(options: TunerOptions, tables: TuningTables, song: &Song) -> CliResult<TunedSong> {
    BarbershopTuner::new(options, tables)
        .tune_song(song)
        .handle_error::<String>("Could not tune song")
        .map_err(Into::into)
}

/// Largest retuning of a held note over the whole song, 0 if no note is held.
fn max_tie_retuning(tuned: &TunedSong) -> f64 {
    tuned
        .statistics()
        .iter()
        .filter_map(|stats| stats.max_tie_retuning)
        .map(|retuning| retuning.amount.abs())
        .fold(0.0, f64::max)
}
