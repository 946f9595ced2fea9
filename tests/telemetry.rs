use fluxtable::telemetry::{self, TelemetryError};

#[test]
fn second_init_reports_already_initialized() {
    telemetry::try_init().unwrap();
    let err = telemetry::try_init().unwrap_err();
    assert!(matches!(err, TelemetryError::AlreadyInitialized));
}
