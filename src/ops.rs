//! Operators.
//!
//! Every operator is available two ways: as a method on [`Observable`] and
//! as a free function returning a closure, so it can be chained with
//! [`Observable::pipe`] or the [`pipe!`](crate::pipe) macro.
//!
//! Operators never run anything when applied. Each returns a new observable
//! whose producer subscribes to the source through an intermediate observer
//! and registers the upstream subscription under the downstream one, so
//! unsubscribing downstream reaches all the way up.
//!
//! [`Observable`]: crate::observable::Observable

mod catch_error;
mod delay;
mod filter;
mod finalize;
mod map;
mod map_err;
mod merge;
mod multicast;
mod observe_on;
mod subscribe_on;
mod switch_map;
mod take;
mod zip;
pub use catch_error::*;
pub use delay::*;
pub use filter::*;
pub use finalize::*;
pub use map::*;
pub use map_err::*;
pub use merge::*;
pub use multicast::*;
pub use observe_on::*;
pub use subscribe_on::*;
pub use switch_map::*;
pub use take::*;
pub use zip::*;
