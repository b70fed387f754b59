use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        GridError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(GridError::config("x").to_string().contains("config error:"));
    assert!(
        GridError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = GridError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde_variant() {
    let err: GridError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, GridError::Serde(_)));
}
