use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RaceError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        RaceError::invalid_config("x")
            .to_string()
            .contains("invalid configuration:")
    );
    assert!(
        RaceError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(RaceError::sink("x").to_string().contains("sink error:"));
}

#[test]
fn empty_selection_names_the_statistic() {
    let err = RaceError::empty_selection("assists");
    assert!(matches!(
        &err,
        RaceError::EmptySelection { statistic } if statistic == "assists"
    ));
    assert!(err.to_string().contains("'assists'"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RaceError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
