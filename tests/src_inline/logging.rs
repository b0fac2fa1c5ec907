use super::*;

#[test]
fn test_verbosity_levels() {
    assert_eq!(level_for_verbosity(0), "warn");
    assert_eq!(level_for_verbosity(1), "info");
    assert_eq!(level_for_verbosity(2), "debug");
    assert_eq!(level_for_verbosity(9), "trace");
}

#[test]
fn test_init_twice_is_harmless() {
    init_logging(0);
    init_logging(2);
    crate::info!("logging initialised twice");
}
