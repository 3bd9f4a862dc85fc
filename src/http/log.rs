//! Small inline modules so that request logging can be switched off
//! individually with our prefix based log filters, e.g.
//! `filters."project_tracker::http::log::headers" = "off"`.

use std::fmt::Write;
use hyper::{body::Incoming, Request};

use crate::prelude::*;


pub(super) mod req {
    use super::*;

    pub(in crate::http) fn log(req: &Request<Incoming>) {
        trace!(
            method = ?req.method(),
            path = req.uri().path_and_query().map_or("", |pq| pq.as_str()),
            "Incoming HTTP request",
        );
    }
}

pub(super) mod headers {
    use super::*;

    pub(in crate::http) fn log(req: &Request<Incoming>) {
        if !tracing::enabled!(tracing::Level::TRACE) {
            return;
        }

        let mut out = String::new();
        for (name, value) in req.headers() {
            // Writing into a `String` cannot fail.
            let _ = write!(out, "\n  {}: {}", name, String::from_utf8_lossy(value.as_bytes()));
        }
        trace!("HTTP Headers: {out}");
    }
}
