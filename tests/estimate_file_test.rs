use gcodemeter::{Config, FileShape, GcodeFileReader, MachineLimits, Units};
use std::fs;
use tempfile::TempDir;

const JOB: &str = "\
%
(pocket)
G21 G90 G17
T2 M6
S12000 M3
G0 X0 Y0 Z5
G1 Z-1 F300
G1 X40 F1200
G3 X40 Y20 I0 J10
G1 X0
G3 X0 Y0 I0 J-10
G0 Z5
G4 P2
M5
M30
%
";

#[test]
fn test_estimate_job_file_with_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let job_path = temp_dir.path().join("pocket.nc");
    fs::write(&job_path, JOB).expect("Failed to write job");

    let config_path = temp_dir.path().join("machine.toml");
    let mut config = Config::new();
    config.machine = MachineLimits::new(['X', 'Y', 'Z'])
        .with_max_feed(vec![6000.0, 6000.0, 1000.0])
        .with_acceleration(vec![500.0, 500.0, 100.0]);
    config.save_to_file(&config_path).expect("Failed to save config");

    let config = Config::load_from_file(&config_path).expect("Failed to load config");
    let reader = GcodeFileReader::new(&job_path).expect("Failed to open job");
    let result = reader
        .estimate(&config.processor_options())
        .expect("Estimation failed");

    assert_eq!(result.invalid_gcode, 0);
    assert_eq!(result.units, Units::Millimeters);
    assert_eq!(result.file_shape, FileShape::Standard);
    assert_eq!(result.tools.iter().copied().collect::<Vec<_>>(), vec![2]);
    assert_eq!(result.spindle_speed_values(), vec![12000.0]);
    assert_eq!(result.feed_rate_values(), vec![300.0, 1200.0]);
    assert!((result.dwell_time - 2.0).abs() < 1e-9);

    let x = result.bounding_box.get('X').expect("X extent");
    let y = result.bounding_box.get('Y').expect("Y extent");
    let z = result.bounding_box.get('Z').expect("Z extent");
    assert!(x.max > 49.9 && x.max <= 50.0 + 1e-9);
    assert!(x.min < -9.9 && x.min >= -10.0 - 1e-9);
    assert!((y.max - 20.0).abs() < 1e-9);
    assert_eq!((z.min, z.max), (-1.0, 5.0));

    // Two half circles of radius 10 plus 80 mm of straight cuts at 20 mm/s
    // set a lower bound once the plunge is added.
    let cutting = (80.0 + 20.0 * std::f64::consts::PI) / 20.0;
    assert!(result.total_time > cutting + 2.0);
}

#[test]
fn test_same_file_gives_same_result() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let job_path = temp_dir.path().join("pocket.nc");
    fs::write(&job_path, JOB).expect("Failed to write job");

    let reader = GcodeFileReader::new(&job_path).expect("Failed to open job");
    let options = Config::new().processor_options();
    let first = reader.estimate(&options).expect("Estimation failed");
    let second = reader.estimate(&options).expect("Estimation failed");

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
