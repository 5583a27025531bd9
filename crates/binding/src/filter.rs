//! Header filter policy applied on both sides of the wire.
//!
//! The policy decides per header name/value pair whether it propagates. The
//! binding consults it for every outbound message header and every inbound
//! response header; rejected pairs are silently dropped.

use crate::headers::is_control_header;

/// Which way a header is travelling when the policy is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Message header about to be written to the wire request.
    Outbound,
    /// Wire response header about to be written back into the message.
    Inbound,
}

pub trait HeaderFilter: Send + Sync {
    fn keep_outbound(&self, name: &str, value: &str) -> bool;
    fn keep_inbound(&self, name: &str, value: &str) -> bool;
}

struct FnHeaderFilter<F: Fn(Direction, &str, &str) -> bool>(F);

impl<F: Fn(Direction, &str, &str) -> bool + Send + Sync> HeaderFilter for FnHeaderFilter<F> {
    fn keep_outbound(&self, name: &str, value: &str) -> bool {
        (self.0)(Direction::Outbound, name, value)
    }

    fn keep_inbound(&self, name: &str, value: &str) -> bool {
        (self.0)(Direction::Inbound, name, value)
    }
}

/// Wraps a predicate as a [`HeaderFilter`].
pub fn fn_filter<F>(f: F) -> impl HeaderFilter
where
    F: Fn(Direction, &str, &str) -> bool + Send + Sync,
{
    FnHeaderFilter(f)
}

/// Keeps every header in both directions.
pub struct KeepAll;

impl HeaderFilter for KeepAll {
    #[inline]
    fn keep_outbound(&self, _name: &str, _value: &str) -> bool {
        true
    }

    #[inline]
    fn keep_inbound(&self, _name: &str, _value: &str) -> bool {
        true
    }
}

/// Default policy: drops control headers in both directions, keeps the rest.
pub struct StandardHeaderFilter;

impl HeaderFilter for StandardHeaderFilter {
    fn keep_outbound(&self, name: &str, _value: &str) -> bool {
        !is_control_header(name)
    }

    fn keep_inbound(&self, name: &str, _value: &str) -> bool {
        !is_control_header(name)
    }
}

/// Header names the transport owns. Never propagated outbound unless the
/// configuration allow-list names them.
pub const RESTRICTED_HEADER_NAMES: [&str; 5] = ["Connection", "Content-Length", "Expect", "Host", "Upgrade"];

pub fn is_restricted_header(name: &str) -> bool {
    RESTRICTED_HEADER_NAMES.iter().any(|restricted| restricted.eq_ignore_ascii_case(name))
}
