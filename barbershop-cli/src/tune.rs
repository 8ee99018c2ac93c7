use barbershop::bend;
use barbershop::tuner::ResolutionOutcome;
use barbershop::tuner::TransitionStatistics;
use structopt::StructOpt;

use crate::dto::BarbershopDto;
use crate::dto::TunedSongDto;
use crate::error::ResultExt;
use crate::shared::ScoreArgs;
use crate::App;
use crate::CliResult;

#[derive(StructOpt)]
pub(crate) struct TuneOptions {
    #[structopt(flatten)]
    score: ScoreArgs,
}

impl TuneOptions {
    pub fn run(&self, app: &mut App) -> CliResult<()> {
        let (song, tuned) = self.score.tune()?;
        let options = self.score.tuner.options();
        let encoded = bend::encode_song(&song, &tuned, options.half_step_size)
            .handle_error::<String>("Could not encode bends")?;

        let dto = BarbershopDto::TunedSong(TunedSongDto::new(&options, &song, &tuned, &encoded));
        app.write(
            serde_yaml::to_string(&dto).handle_error::<String>("Could not serialize tuned song")?,
        )?;
        Ok(())
    }
}

#[derive(StructOpt)]
pub(crate) struct StatsOptions {
    #[structopt(flatten)]
    score: ScoreArgs,
}

impl StatsOptions {
    pub fn run(&self, app: &mut App) -> CliResult<()> {
        let (_, tuned) = self.score.tune()?;

        app.writeln("chord,drift,max_tie_retuning,tie_voice,lead_deviation,outcome")?;
        for stats in tuned.statistics() {
            app.writeln(format_statistics(stats))?;
        }
        app.writeln(format_args!("cumulative_drift,{:.6}", tuned.cumulative_drift()))?;

        Ok(())
    }
}

fn format_statistics(stats: &TransitionStatistics) -> String {
    let (max_tie_retuning, tie_voice) = match stats.max_tie_retuning {
        Some(retuning) => (format!("{:.6}", retuning.amount), retuning.voice.to_string()),
        None => (String::new(), String::new()),
    };
    format!(
        "{},{:.6},{},{},{:.6},{}",
        stats.chord_index,
        stats.drift,
        max_tie_retuning,
        tie_voice,
        stats.lead_deviation,
        outcome_label(stats.outcome)
    )
}

fn outcome_label(outcome: ResolutionOutcome) -> String {
    match outcome {
        ResolutionOutcome::ZeroDrift => "zero-drift".to_owned(),
        ResolutionOutcome::AllSatisfied => "all-satisfied".to_owned(),
        ResolutionOutcome::Compromised { unmet } => format!("sacrificed {unmet}"),
    }
}

#[cfg(test)]
mod test {
    use barbershop::chord::Voice;
    use barbershop::tuner::ConstraintSource;
    use barbershop::tuner::TieRetuning;

    use super::*;

    #[test]
    fn format_statistics_line() {
        let stats = TransitionStatistics {
            chord_index: 3,
            drift: -0.07,
            max_tie_retuning: Some(TieRetuning {
                voice: Voice::Bass,
                amount: 0.03,
            }),
            lead_deviation: 0.1,
            outcome: ResolutionOutcome::Compromised {
                unmet: ConstraintSource::Lead,
            },
        };
        assert_eq!(
            format_statistics(&stats),
            "3,-0.070000,0.030000,bass,0.100000,sacrificed lead"
        );
    }

    #[test]
    fn format_statistics_without_ties() {
        let stats = TransitionStatistics {
            chord_index: 1,
            drift: 0.0,
            max_tie_retuning: None,
            lead_deviation: -0.02,
            outcome: ResolutionOutcome::ZeroDrift,
        };
        assert_eq!(
            format_statistics(&stats),
            "1,0.000000,,,-0.020000,zero-drift"
        );
    }
}
