use barbershop::bend::EncodedBend;
use barbershop::chord::Song;
use barbershop::chord::Voice;
use barbershop::chord::NUM_VOICES;
use barbershop::tuner::TunedSong;
use barbershop::tuner::TunerOptions;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type")]
pub enum BarbershopDto {
    TunedSong(TunedSongDto),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TunedSongDto {
    pub half_step_size: f64,
    pub tie_radius: f64,
    pub lead_radius: f64,
    pub priority: String,
    pub cumulative_drift: f64,
    pub chords: Vec<ChordDto>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChordDto {
    pub start_time: u64,
    pub duration: u32,
    pub root: u8,
    pub chord_type: char,
    pub master_bend: f64,
    /// Only sounding voices are listed.
    pub voices: Vec<VoiceDto>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct VoiceDto {
    pub voice: String,
    pub midi_number: i32,
    pub tied: bool,
    pub individual_bend: f64,
    pub posterior_bend: f64,
    pub wire_value: u16,
    pub corrected_midi_number: u8,
}

impl TunedSongDto {
    pub fn new(
        options: &TunerOptions,
        song: &Song,
        tuned: &TunedSong,
        encoded: &[[EncodedBend; NUM_VOICES]],
    ) -> Self {
        let chords = song
            .chords()
            .iter()
            .zip(song.start_times())
            .zip(tuned.chords().iter().zip(encoded))
            .map(|((chord, start_time), (resolved, bends))| ChordDto {
                start_time,
                duration: chord.duration(),
                root: chord.root(),
                chord_type: chord.chord_type().symbol(),
                master_bend: resolved.master_bend(),
                voices: Voice::ALL
                    .into_iter()
                    .filter_map(|voice| {
                        let note = chord.voice(voice)?;
                        let encoded = bends[voice.index()];
                        Some(VoiceDto {
                            voice: voice.name().to_owned(),
                            midi_number: note.midi_number(),
                            tied: note.is_tied(),
                            individual_bend: resolved.individual_bend(voice),
                            posterior_bend: resolved.posterior_bend(voice),
                            wire_value: encoded.wire_value,
                            corrected_midi_number: encoded.midi_number?,
                        })
                    })
                    .collect(),
            })
            .collect();

        Self {
            half_step_size: options.half_step_size,
            tie_radius: options.tie_radius,
            lead_radius: options.lead_radius,
            priority: options.priority.to_string(),
            cumulative_drift: tuned.cumulative_drift(),
            chords,
        }
    }
}
