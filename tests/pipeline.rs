use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use fieldanim::config::{Config, RenderConfig};
use fieldanim::field::ModelKind;
use fieldanim::pipeline::{run_file_list, run_files, run_sweep, OutputDirs};
use fieldanim::render::{Colormap, FrameFormat, FrameRenderer};
use fieldanim::sequence::{order_by_modified, NoProgress};
use fieldanim::Error;
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, RgbImage, RgbaImage};

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "fieldanim_{name}_{}_{}",
        std::process::id(),
        SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn small_config() -> Config {
    let mut config = Config::default();
    config.grid.size = 20;
    config.render = RenderConfig {
        width: 240,
        height: 180,
        colormap: Colormap::Grayscale,
        format: FrameFormat::Png,
        ..RenderConfig::default()
    };
    config
}

fn dirs(root: &Path) -> OutputDirs {
    OutputDirs::new(root.join("imgs"), root.join("gifs"))
}

fn gif_frames(path: &Path) -> Vec<RgbaImage> {
    let reader = BufReader::new(fs::File::open(path).unwrap());
    GifDecoder::new(reader)
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap()
        .into_iter()
        .map(|f| f.into_buffer())
        .collect()
}

/// Red channel at the center of the plot area.
fn plot_center(frame: &RgbaImage) -> u8 {
    let renderer = FrameRenderer::new(small_config().render).unwrap();
    let (xs, ys) = renderer.plot_area();
    frame.get_pixel((xs.start + xs.end) / 2, (ys.start + ys.end) / 2).0[0]
}

/// Summed per-channel difference between a decoded GIF frame and a frame image.
fn distance(gif: &RgbaImage, frame: &RgbImage) -> u64 {
    assert_eq!(gif.dimensions(), frame.dimensions());
    gif.pixels()
        .zip(frame.pixels())
        .map(|(a, b)| {
            (0..3)
                .map(|c| (a.0[c] as i64 - b.0[c] as i64).unsigned_abs())
                .sum::<u64>()
        })
        .sum()
}

fn write_data(path: &Path, value: f64, age_secs: u64) {
    let mut text = String::new();
    for x in 0..4 {
        for y in 0..4 {
            text.push_str(&format!("{} {} {}\n", x as f64 / 4.0, y as f64 / 4.0, value));
        }
    }
    fs::write(path, text).unwrap();
    set_age(path, age_secs);
}

fn set_age(path: &Path, age_secs: u64) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::now() - Duration::from_secs(age_secs))
        .unwrap();
}

#[test]
fn sweep_of_two_steps_makes_two_frame_gif() {
    let root = temp_dir("sweep_two");
    let mut config = small_config();
    config.sweep.max_step = 400;
    config.sweep.stride = 200;

    let summary = run_sweep(ModelKind::Wave, &config, &dirs(&root), &mut NoProgress).unwrap();

    assert_eq!(
        summary.frames,
        vec![
            root.join("imgs").join("wave_000000.png"),
            root.join("imgs").join("wave_000200.png"),
        ]
    );
    assert!(summary.skipped.is_empty());
    assert_eq!(summary.animation, root.join("gifs").join("wave_1.gif"));

    let gifs: Vec<_> = fs::read_dir(root.join("gifs")).unwrap().collect();
    assert_eq!(gifs.len(), 1);

    let frames = gif_frames(&summary.animation);
    assert_eq!(frames.len(), 2);

    // Each GIF frame is closest to the frame image of its own step.
    let first = image::open(&summary.frames[0]).unwrap().to_rgb8();
    let second = image::open(&summary.frames[1]).unwrap().to_rgb8();
    assert_ne!(first, second);
    assert!(distance(&frames[0], &first) < distance(&frames[0], &second));
    assert!(distance(&frames[1], &second) < distance(&frames[1], &first));
}

#[test]
fn missing_and_malformed_files_are_skipped() {
    let root = temp_dir("skip");
    let input = root.join("data");
    fs::create_dir_all(&input).unwrap();

    let paths: Vec<PathBuf> = (1..=5).map(|k| input.join(format!("out_{k}.data"))).collect();
    write_data(&paths[0], 0.1, 50);
    write_data(&paths[1], 0.2, 40);
    // paths[2] never exists.
    fs::write(&paths[3], "0 0 1\n0.5 oops 1\n").unwrap();
    set_age(&paths[3], 20);
    write_data(&paths[4], 0.5, 10);

    let ordered = order_by_modified(paths.clone());
    let summary = run_file_list(&ordered, &small_config(), &dirs(&root), &mut NoProgress).unwrap();

    let imgs = root.join("imgs");
    assert_eq!(
        summary.frames,
        vec![imgs.join("out_1.png"), imgs.join("out_2.png"), imgs.join("out_5.png")]
    );
    assert_eq!(summary.skipped.len(), 2);
    assert!(summary.skipped.iter().all(|s| s.error.is_recoverable()));
    assert!(summary
        .skipped
        .iter()
        .any(|s| s.source == paths[2] && matches!(s.error, Error::MissingInput(_))));
    assert!(summary
        .skipped
        .iter()
        .any(|s| s.source == paths[3] && matches!(s.error, Error::MalformedData { .. })));

    assert_eq!(summary.animation, root.join("gifs").join("data_1.gif"));
    assert_eq!(gif_frames(&summary.animation).len(), 3);
}

#[test]
fn earlier_modified_file_comes_first() {
    let root = temp_dir("mtime");
    let input = root.join("data");
    fs::create_dir_all(&input).unwrap();

    // Name order and write order both disagree with modification order.
    write_data(&input.join("a_bright.data"), 1.0, 10);
    write_data(&input.join("z_dark.data"), 0.0, 100);

    let summary = run_files(&input, &small_config(), &dirs(&root), &mut NoProgress).unwrap();
    assert_eq!(
        summary.frames,
        vec![root.join("imgs").join("z_dark.png"), root.join("imgs").join("a_bright.png")]
    );

    let frames = gif_frames(&summary.animation);
    assert_eq!(frames.len(), 2);
    assert!(plot_center(&frames[0]) < 40);
    assert!(plot_center(&frames[1]) > 215);
}

#[test]
fn new_run_takes_next_number_without_overwriting() {
    let root = temp_dir("numbering");
    let gifs = root.join("gifs");
    fs::create_dir_all(&gifs).unwrap();
    fs::write(gifs.join("heart_1.gif"), b"first").unwrap();
    fs::write(gifs.join("heart_2.gif"), b"second").unwrap();

    let mut config = small_config();
    config.sweep.max_step = 200;

    let summary = run_sweep(ModelKind::Heart, &config, &dirs(&root), &mut NoProgress).unwrap();
    assert_eq!(summary.animation, gifs.join("heart_3.gif"));
    assert_eq!(fs::read(gifs.join("heart_1.gif")).unwrap(), b"first");
    assert_eq!(fs::read(gifs.join("heart_2.gif")).unwrap(), b"second");
}

#[test]
fn prefix_override_names_the_animation() {
    let root = temp_dir("prefix");
    let mut config = small_config();
    config.sweep.max_step = 200;
    config.animation.prefix = Some("cannon".to_string());

    let summary = run_sweep(ModelKind::Cone, &config, &dirs(&root), &mut NoProgress).unwrap();
    assert_eq!(summary.animation, root.join("gifs").join("cannon_1.gif"));
    assert_eq!(summary.frames, vec![root.join("imgs").join("cone_000000.png")]);
}

#[test]
fn invalid_config_aborts_before_writing() {
    let root = temp_dir("invalid");
    let mut config = small_config();
    config.cone.speed = 1.5;

    let err = run_sweep(ModelKind::Cone, &config, &dirs(&root), &mut NoProgress).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!root.join("imgs").exists());
    assert!(!root.join("gifs").exists());
}

#[test]
fn missing_input_dir_is_created_and_yields_no_animation() {
    let root = temp_dir("no_input");
    let input = root.join("data");
    assert!(!input.exists());

    let err = run_files(&input, &small_config(), &dirs(&root), &mut NoProgress).unwrap_err();
    assert!(matches!(err, Error::Animation(_)));
    assert!(err.to_string().contains("none of the 0 data files"));
    assert!(input.is_dir());
    assert!(!root.join("gifs").exists());
}

#[test]
fn all_frames_skipped_is_an_error() {
    let root = temp_dir("all_skipped");
    let input = root.join("data");
    fs::create_dir_all(&input).unwrap();
    fs::write(input.join("only.data"), "not numbers\n").unwrap();

    let err = run_files(&input, &small_config(), &dirs(&root), &mut NoProgress).unwrap_err();
    assert!(matches!(err, Error::Animation(_)));
    assert!(!root.join("gifs").exists());
}
