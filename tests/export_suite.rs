#[allow(dead_code)]
#[path = "../src/bin/export_frames.rs"]
mod export_frames;

use clap::Parser;
use std::path::{Path, PathBuf};

#[test]
fn parse_args_defaults_are_stable() {
    let args = export_frames::Cli::try_parse_from(["export_frames"]).expect("parse should succeed");

    assert_eq!(args.answers, None);
    assert_eq!(args.schema, None);
    assert_eq!(args.out, PathBuf::from("frames"));
    assert_eq!(args.width, 640);
    assert_eq!(args.height, 360);
    assert_eq!(args.fps, 30);
    assert_eq!(args.frames, 120);
    assert_eq!(args.particles, 2048);
    assert!(!args.trails);
    assert!(!args.full_res);
    assert_eq!(args.seed, None);
    assert_eq!(args.orbit, 0.0);
}

#[test]
fn parse_args_overrides_work() {
    let args = export_frames::Cli::try_parse_from([
        "export_frames",
        "--answers",
        "me.json",
        "--schema",
        "onboarding.json",
        "--out",
        "clips/run1",
        "--width",
        "320",
        "--height",
        "200",
        "--fps",
        "24",
        "--frames",
        "48",
        "--particles",
        "512",
        "--trails",
        "--full-res",
        "--seed",
        "17.5",
        "--seed-phrase",
        "north star",
        "--orbit",
        "-2.5",
    ])
    .expect("parse should succeed");

    assert_eq!(args.answers, Some(PathBuf::from("me.json")));
    assert_eq!(args.schema, Some(PathBuf::from("onboarding.json")));
    assert_eq!(args.out, PathBuf::from("clips/run1"));
    assert_eq!((args.width, args.height), (320, 200));
    assert_eq!(args.fps, 24);
    assert_eq!(args.frames, 48);
    assert_eq!(args.particles, 512);
    assert!(args.trails);
    assert!(args.full_res);
    assert_eq!(args.seed, Some(17.5));
    assert_eq!(args.seed_phrase.as_deref(), Some("north star"));
    assert_eq!(args.orbit, -2.5);
}

#[test]
fn validation_rejects_zero_sizes() {
    for (flag, value) in [
        ("--width", "0"),
        ("--height", "0"),
        ("--fps", "0"),
        ("--frames", "0"),
        ("--particles", "0"),
    ] {
        let args = export_frames::Cli::try_parse_from(["export_frames", flag, value])
            .expect("parse should succeed");
        let err = export_frames::validate_args(&args).expect_err("zero must fail validation");
        assert!(err.to_string().contains(flag), "{flag}: {err}");
    }

    let ok = export_frames::Cli::try_parse_from(["export_frames"]).expect("parse should succeed");
    assert!(export_frames::validate_args(&ok).is_ok());
}

#[test]
fn frame_times_are_synthetic() {
    assert_eq!(export_frames::frame_time(0, 30), 0.0);
    assert_eq!(export_frames::frame_time(30, 30), 1.0);
    assert_eq!(export_frames::frame_time(45, 30), 1.5);
    assert_eq!(
        export_frames::frame_path(Path::new("out"), 7),
        PathBuf::from("out/frame_00007.ppm")
    );
}

#[test]
fn orbit_pointer_drags_from_center() {
    let still = export_frames::orbit_pointer(5, 0.0, [100, 50]);
    assert!(!still.held);

    let p0 = export_frames::orbit_pointer(0, 3.0, [100, 50]);
    let p2 = export_frames::orbit_pointer(2, 3.0, [100, 50]);
    assert!(p0.held && p2.held);
    assert_eq!((p0.x, p0.y), (50.0, 25.0));
    assert_eq!(p2.x, 56.0);
}

#[test]
fn ppm_writer_drops_alpha() {
    let rgba = [10u8, 20, 30, 255, 40, 50, 60, 0];
    let mut out: Vec<u8> = Vec::new();
    export_frames::write_ppm(&mut out, 2, 1, &rgba).expect("write should succeed");
    let header = b"P6\n2 1\n255\n";
    assert_eq!(&out[..header.len()], header);
    assert_eq!(&out[header.len()..], &[10, 20, 30, 40, 50, 60]);

    let err = export_frames::write_ppm(&mut Vec::<u8>::new(), 4, 4, &rgba).expect_err("short frame");
    assert!(err.to_string().contains("need 64"));
}
