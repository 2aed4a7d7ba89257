use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        KeepsakeError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        KeepsakeError::environment("x")
            .to_string()
            .contains("rendering environment error:")
    );
    assert!(
        KeepsakeError::encoding("x")
            .to_string()
            .contains("encoding error:")
    );
    assert_eq!(
        KeepsakeError::Cancelled.to_string(),
        "journal generation cancelled"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = KeepsakeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_validation_is_not_retryable() {
    assert!(!KeepsakeError::validation("bad").is_retryable());
    assert!(KeepsakeError::environment("no surface").is_retryable());
    assert!(KeepsakeError::encoding("jpeg").is_retryable());
    assert!(KeepsakeError::Cancelled.is_retryable());
}
