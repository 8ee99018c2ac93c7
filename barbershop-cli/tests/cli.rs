use std::fs;
use std::process::Command;
use std::process::Output;

use assert_approx_eq::assert_approx_eq;
use pretty_assertions::assert_eq;
use serde_yaml::Value;

fn call_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bstune"))
        .args(args)
        .output()
        .unwrap()
}

fn stdout_of(output: &Output) -> String {
    assert!(
        output.status.success(),
        "bstune failed:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn voice<'a>(chord: &'a Value, name: &str) -> &'a Value {
    chord["voices"]
        .as_sequence()
        .unwrap()
        .iter()
        .find(|voice| voice["voice"].as_str() == Some(name))
        .unwrap()
}

#[test]
fn tune_tag_ending() {
    let output = call_cli(&["tune", "tests/data/tag.txt"]);
    let yaml: Value = serde_yaml::from_str(&stdout_of(&output)).unwrap();

    assert_eq!(yaml["type"].as_str(), Some("TunedSong"));
    assert_eq!(yaml["priority"].as_str(), Some("ties-first"));

    let chords = yaml["chords"].as_sequence().unwrap();
    assert_eq!(chords.len(), 5);
    assert_eq!(chords[4]["start_time"].as_u64(), Some(1920));
    assert_eq!(chords[4]["chord_type"].as_str(), Some("o"));

    let first_lead = voice(&chords[0], "lead");
    assert_eq!(first_lead["midi_number"].as_i64(), Some(64));
    assert_eq!(first_lead["tied"].as_bool(), Some(true));
    assert_approx_eq!(first_lead["posterior_bend"].as_f64().unwrap(), 0.0);
    assert_approx_eq!(first_lead["individual_bend"].as_f64().unwrap(), -0.136863, 1e-6);

    let first_bass = voice(&chords[0], "bass");
    assert_approx_eq!(first_bass["posterior_bend"].as_f64().unwrap(), 0.136863, 1e-6);
}

#[test]
fn tune_with_custom_tables() {
    let output = call_cli(&["tune", "tests/data/tag.txt", "--tables", "tests/data/tables"]);
    let yaml: Value = serde_yaml::from_str(&stdout_of(&output)).unwrap();

    let first_lead = voice(&yaml["chords"][0], "lead");
    assert_approx_eq!(first_lead["individual_bend"].as_f64().unwrap(), 0.078200, 1e-6);
}

#[test]
fn tune_omits_silent_voices() {
    let output = call_cli(&["tune", "tests/data/silent.txt"]);
    let yaml: Value = serde_yaml::from_str(&stdout_of(&output)).unwrap();

    let voices = |index: usize| {
        yaml["chords"][index]["voices"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|voice| voice["voice"].as_str().unwrap().to_owned())
            .collect::<Vec<_>>()
    };
    assert_eq!(voices(0), ["bass", "baritone", "tenor"]);
    assert_eq!(voices(1), ["bass", "lead", "tenor"]);
}

#[test]
fn stats_of_tag_ending() {
    let output = call_cli(&["stats", "tests/data/tag.txt", "--priority", "l"]);
    let stdout = stdout_of(&output);
    let lines: Vec<_> = stdout.lines().collect();

    assert_eq!(lines.len(), 6);
    assert_eq!(
        lines[0],
        "chord,drift,max_tie_retuning,tie_voice,lead_deviation,outcome"
    );
    assert!(lines[1].starts_with("1,"));
    assert!(lines[4].starts_with("4,"));
    assert!(lines[5].starts_with("cumulative_drift,"));
}

#[test]
fn sweep_prints_one_line_per_setting() {
    let output = call_cli(&[
        "sweep",
        "tests/data/tag.txt",
        "--tie-radii",
        "0.01,0.03",
        "--lead-radii",
        "0.15",
    ]);
    let stdout = stdout_of(&output);
    let lines: Vec<_> = stdout.lines().collect();

    assert_eq!(
        lines[0],
        "tie_radius,lead_radius,priority,cumulative_drift,max_tie_retuning"
    );
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("0.01,0.15,ties-first,"));
    assert!(lines[4].starts_with("0.03,0.15,lead-first,"));
}

#[test]
fn write_midi_file() {
    let out_file = format!("{}/tag.mid", env!("CARGO_TARGET_TMPDIR"));
    let output = call_cli(&["midi", "tests/data/tag.txt", "--out", &out_file]);
    assert!(stdout_of(&output).starts_with("MIDI output written to"));

    let smf = fs::read(&out_file).unwrap();
    assert_eq!(&smf[..4], b"MThd");
    // Tempo track plus one track per voice
    assert_eq!(&smf[10..12], &[0, 5]);
}

#[test]
fn dangling_tie_is_rejected() {
    let output = call_cli(&["tune", "tests/data/dangling.txt"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Could not import score file"));
}

#[test]
fn missing_score_file_is_reported() {
    let output = call_cli(&["stats", "tests/data/missing.txt"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Could not read score file"));
}

#[test]
fn sweep_uses_custom_tables() {
    let args = ["sweep", "tests/data/tag.txt", "--tie-radii", "0.03", "--lead-radii", "0.15"];

    let output = call_cli(&[&args[..], &["--tables", "tests/data/tables"][..]].concat());
    assert_eq!(stdout_of(&output).lines().count(), 3);

    let output = call_cli(&[&args[..], &["--tables", "tests/data/broken_tables"][..]].concat());
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Could not import tuning table"));
}
