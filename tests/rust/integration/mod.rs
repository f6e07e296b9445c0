//! Integration tests - Compile-then-execute flows over mocked connections
//!
//! These tests verify that assembled statements reach the connection intact,
//! that engine failures and cancellations surface unchanged, and that
//! translation failures never touch the connection.

mod executor_tests;
