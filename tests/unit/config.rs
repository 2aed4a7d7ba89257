use std::collections::HashMap;

use super::*;

#[test]
fn empty_object_is_the_default_config() {
    let cfg = JournalConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, JournalConfig::default());
    assert_eq!(cfg.jpeg_quality, 85);
    assert_eq!(cfg.brand, "Aura");
    assert!(cfg.fonts.system_fallback);
}

#[test]
fn partial_config_keeps_other_defaults() {
    let cfg = JournalConfig::from_json_str(
        r##"{ "brand": "Lumen", "palette": { "paper": "#ffffff" }, "fetch": { "timeout_ms": 500 } }"##,
    )
    .unwrap();
    assert_eq!(cfg.brand, "Lumen");
    assert_eq!(cfg.palette.paper, Rgba8::rgb(255, 255, 255));
    assert_eq!(cfg.palette.accent, Palette::default().accent);
    assert_eq!(cfg.fetch.timeout(), Duration::from_millis(500));
    assert_eq!(cfg.fetch.max_bytes, FetchConfig::default().max_bytes);
}

#[test]
fn unknown_fields_and_bad_ranges_are_rejected() {
    assert!(JournalConfig::from_json_str(r#"{ "brnad": "x" }"#).is_err());
    assert!(JournalConfig::from_json_str(r#"{ "jpeg_quality": 0 }"#).is_err());
    assert!(JournalConfig::from_json_str(r#"{ "threading": { "threads": 0 } }"#).is_err());
    assert!(
        JournalConfig::from_json_str(r#"{ "canvas": { "width": 794, "height": 1123, "scale": 100 } }"#)
            .is_err()
    );
}

#[test]
fn env_overrides_apply_and_validate() {
    let env: HashMap<&str, &str> = [
        ("KEEPSAKE_FETCH_TIMEOUT_MS", "2500"),
        ("KEEPSAKE_JPEG_QUALITY", " 70 "),
        ("KEEPSAKE_THREADS", "3"),
    ]
    .into_iter()
    .collect();

    let mut cfg = JournalConfig::default();
    cfg.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(cfg.fetch.timeout_ms, 2500);
    assert_eq!(cfg.jpeg_quality, 70);
    assert_eq!(cfg.threading.threads, Some(3));

    let mut cfg = JournalConfig::default();
    let err = cfg
        .apply_overrides_from(|k| (k == "KEEPSAKE_JPEG_QUALITY").then(|| "high".to_string()))
        .unwrap_err();
    assert!(err.to_string().contains("KEEPSAKE_JPEG_QUALITY"));
}
