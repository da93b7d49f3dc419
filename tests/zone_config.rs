use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use zonecount::zone::{AnchorPolicy, CountPolicy, Point, ZoneConfig};

#[test]
fn loads_example_config() {
    let cfg = ZoneConfig::load(Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/zones.example.toml"))).unwrap();
    assert_eq!(cfg.zones.len(), 2);
    assert_eq!(cfg.zones[1].name, "exit");
    assert_eq!(cfg.zones[1].color, [0, 128, 255]);
    assert_eq!(cfg.anchor, AnchorPolicy::Center);
    assert_eq!(cfg.count_policy, CountPolicy::ResetPerFrame);
    assert!(cfg.zones[0].contains(Point::new(300.0, 450.0)));
}

#[test]
fn loads_config_from_file() {
    let mut file = NamedTempFile::new().expect("temp config");
    write!(
        file,
        r#"
        count_policy = "accumulate"

        [[zones]]
        name = "lane"
        points = [[0.0, 0.0], [50.0, 0.0], [25.0, 40.0]]
        "#
    )
    .expect("write config");

    let cfg = ZoneConfig::load(file.path()).expect("load config");
    assert_eq!(cfg.count_policy, CountPolicy::Accumulate);
    assert_eq!(cfg.zones[0].polygon.vertices().len(), 3);
    assert_eq!(cfg.line_width, 2);
}

#[test]
fn missing_file_reports_path() {
    let err = ZoneConfig::load(Path::new("/no/such/zones.toml")).unwrap_err();
    assert!(err.to_string().contains("/no/such/zones.toml"));
}

#[test]
fn invalid_zone_in_file_is_rejected() {
    let mut file = NamedTempFile::new().expect("temp config");
    write!(file, "[[zones]]\npoints = [[0.0, 0.0], [1.0, 1.0]]\n").expect("write config");
    let err = ZoneConfig::load(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("3"));
}
