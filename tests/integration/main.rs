//! Integration tests for the archive mirror

mod crawl_tests;
mod http_tests;
