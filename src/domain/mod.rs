//! Domain layer: the click event model and the logic around it.
//!
//! # Architecture
//!
//! - [`request_context`] - Typed view of an inbound request
//! - [`click_event`] - Click event model and field extraction
//! - [`redirect`] - Redirect decision and its HTTP response
//! - [`click_worker`] - Asynchronous click delivery worker
//!
//! # Click Processing Flow
//!
//! 1. HTTP handler produces the [`redirect::RedirectDecision`] response
//! 2. [`click_event::ClickEvent`] is captured and sent to an async channel
//! 3. [`click_worker::run_click_worker`] delivers it once, with a timeout
//! 4. The collector's answer (or failure) is logged and discarded

pub mod click_event;
pub mod click_worker;
pub mod redirect;
pub mod request_context;
