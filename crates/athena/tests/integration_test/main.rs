//! Integration tests for apiwatch-athena.
//!
//! None of these touch AWS: the poller runs against an in-process
//! [`QueryService`](apiwatch_athena::QueryService) double.

mod config;
mod poller;
