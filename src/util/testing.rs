//! Shared test setup: logging and sample diagrams.

use std::env;
use std::sync::Once;

use chrono::{TimeZone, Utc};
use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::{Bone, Diagram, Forest};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "fishbone=trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Two main bones, the first with two sub bones and one grandchild.
///
/// ```text
/// Machine [m]
/// ├── Wear [m1]
/// │   └── Bearings [m1a]
/// └── Calibration [m2]
/// People [p]
/// ```
pub fn sample_forest() -> Forest {
    let mut wear = Bone::new_child("m1", "Wear", "tester", "m");
    wear.children
        .push(Bone::new_child("m1a", "Bearings", "tester", "m1"));
    let mut machine = Bone::new_root("m", "Machine", "tester");
    machine.children.push(wear);
    machine
        .children
        .push(Bone::new_child("m2", "Calibration", "tester", "m"));
    vec![machine, Bone::new_root("p", "People", "tester")]
}

/// Diagram with a fixed creation time and the given bones.
pub fn sample_diagram(id: &str, title: &str, bones: Forest) -> Diagram {
    Diagram {
        id: id.to_string(),
        title: title.to_string(),
        created_by: "tester".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).single().unwrap_or_default(),
        updated_at: None,
        status: None,
        tags: Vec::new(),
        bones,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::forest;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
    }

    #[test]
    fn given_sample_forest_when_counting_then_has_five_bones() {
        assert_eq!(forest::count_nodes(&sample_forest()), 5);
    }
}
