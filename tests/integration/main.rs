//! Integration tests for the scraper
//!
//! These tests use wiremock to stand in for the classifieds site and run
//! the pagination and batch pipelines end-to-end.

mod batch_tests;
mod common;
mod pagination_tests;
