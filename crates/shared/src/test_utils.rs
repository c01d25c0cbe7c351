use std::sync::Once;

pub static INIT_TEST_ONCE: Once = Once::new();

/// Loads optional env files and installs logging once per test binary.
#[macro_export]
macro_rules! setup_test {
    () => {{
        $crate::test_utils::INIT_TEST_ONCE.call_once(|| {
            $crate::env::load_optional_env_files();
            $crate::logging::configure_logging("debug").unwrap();
        });
    }};
}
