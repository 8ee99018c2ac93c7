//! Standard MIDI File output with one track per voice.

use std::path::PathBuf;

use barbershop::bend;
use barbershop::chord::Voice;
use barbershop::midi::ChannelMessageType;
use barbershop::midi::TimedMessage;
use log::info;
use midly::num::u14;
use midly::num::u15;
use midly::num::u24;
use midly::num::u28;
use midly::num::u4;
use midly::num::u7;
use midly::Format;
use midly::Header;
use midly::MetaMessage;
use midly::MidiMessage;
use midly::PitchBend;
use midly::Smf;
use midly::Timing;
use midly::Track;
use midly::TrackEvent;
use midly::TrackEventKind;
use structopt::StructOpt;

use crate::error::ResultExt;
use crate::shared::ScoreArgs;
use crate::App;
use crate::CliResult;

#[derive(StructOpt)]
pub(crate) struct MidiOptions {
    #[structopt(flatten)]
    score: ScoreArgs,

    /// Location of the MIDI file to write
    #[structopt(long = "out")]
    out_file: PathBuf,

    /// Score duration units per quarter note
    #[structopt(long = "ticks-per-quarter", default_value = "480")]
    ticks_per_quarter: u16,

    /// Tempo in quarter notes per minute
    #[structopt(long = "bpm", default_value = "90")]
    beats_per_minute: u32,
}

impl MidiOptions {
    pub fn run(&self, app: &mut App) -> CliResult<()> {
        let (song, tuned) = self.score.tune()?;
        let half_step_size = self.score.tuner.half_step_size;
        let encoded = bend::encode_song(&song, &tuned, half_step_size)
            .handle_error::<String>("Could not encode bends")?;
        let messages = barbershop::midi::render_song(&song, &encoded);

        let smf = self.create_smf(&messages)?;
        smf.save(&self.out_file)?;

        info!("Wrote {} MIDI messages", messages.len());
        app.writeln(format_args!(
            "MIDI output written to {}",
            self.out_file.display()
        ))?;
        Ok(())
    }

    fn create_smf<'a>(&self, messages: &[TimedMessage]) -> CliResult<Smf<'a>> {
        let ticks_per_quarter = u15::try_from(self.ticks_per_quarter)
            .ok_or_else(|| "Ticks per quarter note must be below 32768".to_owned())?;
        if self.beats_per_minute == 0 {
            return Err("Tempo must be positive".to_owned().into());
        }
        let micros_per_quarter = u24::try_from(60_000_000 / self.beats_per_minute)
            .ok_or_else(|| "Tempo is too slow".to_owned())?;

        let mut smf = Smf::new(Header::new(
            Format::Parallel,
            Timing::Metrical(ticks_per_quarter),
        ));

        smf.tracks.push(vec![
            TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(MetaMessage::Tempo(micros_per_quarter)),
            },
            end_of_track(),
        ]);

        for voice in Voice::ALL {
            smf.tracks.push(create_voice_track(voice, messages)?);
        }

        Ok(smf)
    }
}

fn create_voice_track<'a>(voice: Voice, messages: &[TimedMessage]) -> CliResult<Track<'a>> {
    let channel = voice.index() as u8;
    let mut track = vec![TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(voice.name().as_bytes())),
    }];

    let mut last_tick = 0;
    for timed in messages
        .iter()
        .filter(|timed| timed.message.channel() == channel)
    {
        let delta = u32::try_from(timed.tick - last_tick)
            .ok()
            .and_then(u28::try_from)
            .ok_or_else(|| format!("Time overflow at tick {}", timed.tick))?;
        last_tick = timed.tick;

        track.push(TrackEvent {
            delta,
            kind: TrackEventKind::Midi {
                channel: u4::from(channel),
                message: to_midi_message(timed.message.message_type()),
            },
        });
    }

    track.push(end_of_track());
    Ok(track)
}

fn to_midi_message(message_type: ChannelMessageType) -> MidiMessage {
    match message_type {
        ChannelMessageType::NoteOff { key, velocity } => MidiMessage::NoteOff {
            key: u7::from(key),
            vel: u7::from(velocity),
        },
        ChannelMessageType::NoteOn { key, velocity } => MidiMessage::NoteOn {
            key: u7::from(key),
            vel: u7::from(velocity),
        },
        ChannelMessageType::PitchBendChange { value } => MidiMessage::PitchBend {
            bend: PitchBend(u14::from(value)),
        },
    }
}

fn end_of_track<'a>() -> TrackEvent<'a> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}
