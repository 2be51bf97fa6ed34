//! Integration test modules

mod import_scenarios;
mod session_tests;
