//! Integration test suite for smrt-stress.
//!
//! These tests drive the generator, the worker pool and the aggregator
//! together and check the end-to-end guarantees: task counts and shape,
//! staging isolation, result ordering and failure accounting.
//!
//! # Test Categories
//!
//! - `scenarios`: Whole-run scenarios through `run::run`
//! - `generation`: Generator and staging behaviour across iterations
//! - `dispatch`: Generator feeding the pool directly
//! - `processes`: Real child processes against fake tool scripts
//!
//! # CI Compatibility
//!
//! Apart from `processes`, which only needs `/bin/sh`, every test uses a
//! scripted executor and never talks to a real service.


mod dispatch;
mod scenarios;
