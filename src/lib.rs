//! # nats-updates
//!
//! A producer and a consumer for a single NATS subject. The producer publishes one
//! message and exits; the consumer subscribes with a callback and stays up until
//! it is killed.
//!
//! Both binaries are thin: load [`config::Config`], call [`setup::setup`], then
//! hand off to [`producer::run`] or [`consumer::run`].

pub mod broker;
pub mod config;
pub mod consumer;
pub mod producer;
pub mod setup;
