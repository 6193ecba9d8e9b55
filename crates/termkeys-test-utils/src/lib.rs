pub mod clock;
pub mod fixtures;
pub mod harness;
pub mod recorder;
pub mod source;

pub use clock::ManualClock;
pub use harness::TestKeyboard;
pub use recorder::{Event, EventRecorder};
pub use source::ScriptedSource;

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("termkeys=debug,termkeys_input=debug")),
            )
            .with_test_writer()
            .init();
    });
}
