// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! HTTP layer for pinch
//!
//! Request execution with optional certificate pinning and a cookie jar
//! shared across requests.

mod client;
mod cookie;
mod request;
mod response;

pub use client::PinchClient;
pub use cookie::{Cookie, CookieJar};
pub use request::{PinSpec, RequestDescriptor};
pub use response::ResponseDescriptor;

/// Common HTTP headers
pub mod headers {
    pub const COOKIE: &str = "cookie";
    pub const SET_COOKIE: &str = "set-cookie";
}
