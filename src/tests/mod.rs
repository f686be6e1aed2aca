//! Unit tests for the docket client.
//!
//! Session lifecycle tests drive the scripted mock transport; store tests
//! cover both credential store implementations.

mod session_test;
