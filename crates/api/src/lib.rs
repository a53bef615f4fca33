//! HTTP API: routing, request/response mapping, and error responses for the
//! put-away decision engine.

pub mod app;
