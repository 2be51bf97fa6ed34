//! Property test modules

mod classification_tests;
mod description_tests;
mod host_tests;
