//! Integration tests for the DocRelay HTTP and WebSocket surface.

mod helpers;
mod notification_test;
mod presence_test;
mod ws_test;
