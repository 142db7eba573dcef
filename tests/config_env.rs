//! Environment overrides for the configuration file.
//!
//! Kept in its own test binary: the variables are process-wide and would leak
//! into the file-based config tests running in parallel.

use bookshelf_search::config::load_config;
use bookshelf_search::PartialFailurePolicy;

#[test]
fn test_environment_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bookshelf-search.toml");
    std::fs::write(
        &path,
        r#"
[providers]
page_size = 3

[search]
failure_policy = "fail_fast"
"#,
    )
    .unwrap();

    let from_file = load_config(&path).unwrap();
    assert_eq!(from_file.search.failure_policy, PartialFailurePolicy::FailFast);
    assert_eq!(from_file.providers.page_size, 3);

    std::env::set_var("BOOKSHELF__SEARCH__FAILURE_POLICY", "tolerate");
    std::env::set_var("BOOKSHELF__PROVIDERS__PAGE_SIZE", "7");

    let result = load_config(&path);

    std::env::remove_var("BOOKSHELF__SEARCH__FAILURE_POLICY");
    std::env::remove_var("BOOKSHELF__PROVIDERS__PAGE_SIZE");

    let config = result.unwrap();
    assert_eq!(config.search.failure_policy, PartialFailurePolicy::Tolerate);
    assert_eq!(config.providers.page_size, 7);
}
