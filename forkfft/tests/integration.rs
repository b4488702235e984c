//! Integration tests for forkfft
//!
//! These drive the real binary, so every multi-sample case below builds an
//! actual process tree.

use forkfft::{
    ComplexSample, ExecutionMode, NOISE_FLOOR, NodeConfig, Orchestrator, Precision, dft,
    encode_line, inverse_dft, max_abs_error, read_all_samples,
};
use proptest::prelude::*;
use std::io::Write;
use std::process::{Command, Output, Stdio};

/// Run the binary with `args`, feeding `input` on stdin.
fn forkfft(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_forkfft"))
        .args(args)
        .env_remove("FORKFFT_NODE_DEPTH")
        .env_remove("FORKFFT_LOG")
        .env_remove("FORKFFT_WAIT_TIMEOUT")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn forkfft");
    {
        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(input.as_bytes()).unwrap();
    }
    child.wait_with_output().expect("wait for forkfft")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8(output.stderr.clone()).unwrap()
}

fn samples_to_text(samples: &[ComplexSample]) -> String {
    samples
        .iter()
        .map(|s| format!("{}\n", encode_line(*s)))
        .collect()
}

fn parse(text: &str) -> Vec<ComplexSample> {
    read_all_samples(text.as_bytes()).unwrap()
}

fn in_process_text(input: &str, precision: Precision) -> String {
    let mut config = NodeConfig::root("forkfft");
    config.mode = ExecutionMode::InProcess;
    config.precision = precision;
    let mut out = Vec::new();
    Orchestrator::new(config)
        .run(input.as_bytes(), &mut out)
        .unwrap();
    String::from_utf8(out).unwrap()
}

fn c(re: f64, im: f64) -> ComplexSample {
    ComplexSample::new(re, im)
}

/// A single sample is printed back, after noise-floor correction
#[test]
fn test_single_sample_is_echoed() {
    let output = forkfft(&[], "3.25 -1.5\n");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "3.250000 -1.500000*i\n");

    let output = forkfft(&[], "-0.001 7\n");
    assert!(output.status.success());
    assert_eq!(stdout(&output), "0.000000 7.000000*i\n");
}

/// Two trivial children, 1+0i and 0+0i
#[test]
fn test_two_samples() {
    let output = forkfft(&[], "1.0 0.0\n0.0 0.0\n");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "1.000000 0.000000*i\n1.000000 0.000000*i\n"
    );
}

#[test]
fn test_four_samples_match_direct_dft() {
    let input = "1 0\n0 0\n-1 0\n0 0\n";
    let output = forkfft(&[], input);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let result = parse(&stdout(&output));
    let expected = dft(&parse(input));
    assert!(max_abs_error(&result, &expected) < NOISE_FLOOR);
    assert_eq!(
        stdout(&output),
        "0.000000 0.000000*i\n2.000000 0.000000*i\n0.000000 0.000000*i\n2.000000 0.000000*i\n"
    );
}

/// First N/2 lines are sums in increasing k, last N/2 differences in increasing k
#[test]
fn test_output_order_for_eight_samples() {
    let input = samples_to_text(&[
        c(0.0, 0.0),
        c(1.0, 0.0),
        c(0.0, 0.0),
        c(0.0, 0.0),
        c(0.0, 0.0),
        c(0.0, 0.0),
        c(0.0, 0.0),
        c(0.0, 0.0),
    ]);
    let output = forkfft(&[], &input);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let result = parse(&stdout(&output));
    assert_eq!(result.len(), 8);
    let expected = dft(&parse(&input));
    assert!(max_abs_error(&result, &expected) < 1e-5);
}

#[test]
fn test_round_trip_through_inverse() {
    let signals: [&[ComplexSample]; 3] = [
        &[c(2.0, 1.0), c(-1.0, 3.0)],
        &[c(1.0, 0.0), c(2.0, -1.0), c(0.0, 4.0), c(-3.0, 0.5)],
        &[
            c(1.0, 1.0),
            c(-2.0, 0.0),
            c(3.0, -1.0),
            c(0.0, 2.0),
            c(-1.0, -1.0),
            c(4.0, 0.0),
            c(0.5, 0.5),
            c(-2.5, 3.0),
        ],
    ];

    for signal in signals {
        let output = forkfft(&[], &samples_to_text(signal));
        assert!(output.status.success(), "stderr: {}", stderr(&output));
        let recovered = inverse_dft(&parse(&stdout(&output)));
        assert!(
            max_abs_error(&recovered, signal) < NOISE_FLOOR,
            "N = {}",
            signal.len()
        );
    }
}

#[test]
fn test_short_precision() {
    let output = forkfft(&["-p"], "1 0\n2 0\n3 0\n4 0\n");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "10.000 0.000*i\n-2.000 2.000*i\n-2.000 0.000*i\n-2.000 -2.000*i\n"
    );
}

#[test]
fn test_process_and_in_process_agree() {
    let input = samples_to_text(&[
        c(0.3, -1.7),
        c(2.2, 0.0),
        c(-4.1, 1.25),
        c(0.0, 0.9),
        c(1.0, 1.0),
        c(-0.6, 0.6),
        c(3.3, -2.2),
        c(0.125, 0.0),
    ]);

    let spawned = forkfft(&[], &input);
    assert!(spawned.status.success(), "stderr: {}", stderr(&spawned));
    assert_eq!(stdout(&spawned), in_process_text(&input, Precision::Full));

    let flagged = forkfft(&["--mode", "in-process"], &input);
    assert!(flagged.status.success());
    assert_eq!(stdout(&flagged), stdout(&spawned));
}

#[test]
fn test_odd_count_fails_without_output() {
    let output = forkfft(&[], "1 0\n2 0\n3 0\n");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let err = stderr(&output);
    assert_eq!(err.lines().count(), 1);
    assert!(err.contains("uneven input"), "stderr: {err}");
}

#[test]
fn test_empty_input_fails() {
    let output = forkfft(&[], "");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("no input"));
}

#[test]
fn test_invalid_character_aborts() {
    let output = forkfft(&[], "1 0\n2 0\nhello 1\n4 0\n");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("illegal character 'h'"));
}

#[test]
fn test_too_many_values_aborts() {
    let output = forkfft(&[], "1 0 3\n2 0\n");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("too many floating point numbers"));
}

#[test]
fn test_blank_line_aborts() {
    let output = forkfft(&[], "1 0\n\n");
    assert!(!output.status.success());
    assert!(stderr(&output).contains("blank or malformed"));
}

/// Six samples pass the root's check but leave each child with three
#[test]
fn test_child_failure_reaches_root() {
    let output = forkfft(&[], &"1 0\n".repeat(6));
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());

    let err = stderr(&output);
    assert!(err.contains("uneven input: 3 samples"), "stderr: {err}");
    assert!(err.contains("child exited with"), "stderr: {err}");
}

#[test]
fn test_repeated_p_is_rejected() {
    let output = forkfft(&["-p", "-p"], "1 0\n");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_wait_timeout_and_verbose_keep_stdout_clean() {
    let output = forkfft(&["--wait-timeout", "30s", "-v"], "1.0 0.0\n0.0 0.0\n");
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "1.000000 0.000000*i\n1.000000 0.000000*i\n"
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_inverse_recovers_integer_signals(
        values in prop::collection::vec((-5i32..=5, -5i32..=5), 8),
        log_n in 1usize..=3,
    ) {
        let n = 1 << log_n;
        let signal: Vec<ComplexSample> = values[..n]
            .iter()
            .map(|&(re, im)| c(re as f64, im as f64))
            .collect();

        let out = in_process_text(&samples_to_text(&signal), Precision::Full);
        let recovered = inverse_dft(&parse(&out));
        prop_assert!(max_abs_error(&recovered, &signal) < NOISE_FLOOR);
    }

    #[test]
    fn prop_odd_counts_are_rejected(n in 1usize..8) {
        let count = 2 * n + 1;
        let mut config = NodeConfig::root("forkfft");
        config.mode = ExecutionMode::InProcess;
        let mut out = Vec::new();
        let result = Orchestrator::new(config).run("1 0\n".repeat(count).as_bytes(), &mut out);
        let rejected = matches!(result, Err(forkfft::NodeError::OddInputCount(got)) if got == count);
        prop_assert!(rejected);
        prop_assert!(out.is_empty());
    }
}
