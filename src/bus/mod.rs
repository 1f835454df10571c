//! Change signal bus
//!
//! In-process publish/subscribe channel for the three change topics. It decouples the
//! producers (clipboard poller, hardware watcher, brightness monitor) from the consumers (HUD
//! coordinator, renderer bridge), so a consumer never knows whether a topic is fed by a poll loop
//! or by an OS callback.
//!
//! # Delivery
//!
//! - `publish` is fire-and-forget and delivers synchronously on the calling thread
//! - Late subscribers miss earlier publishes (no persistence)
//! - No backpressure: handlers must be fast and defer heavy work
//!
//! Producers running on foreign threads never publish directly. They post through a
//! [`SignalSink`], which the controller implements by queueing the topic onto the coordinating
//! thread; the controller then publishes it there.

pub mod signal_bus;

pub use signal_bus::{SignalBus, SignalHandler, SignalSink, SubscriptionHandle, Topic};
