//! Inbound frame processing of the primary node.
//!
//! Every frame queued by the receive interrupt is classified by identifier
//! form, looked up in the route tables, decoded and committed. A successful
//! decode is evidence that the route's sensor is `enabled`; the route's
//! [`Evidence`] rule decides whether it is also `active`. Unknown identifiers
//! and payloads too short for their layout are dropped without side effects.
pub mod routes;

use crate::fusion::FusionContext;
use crate::infra::codec::validity::Validity;
use crate::protocol::transport::can_frame::{CanFrame, FrameKind};
use crate::protocol::transport::traits::frame_source::FrameSource;
use routes::{Evidence, Route};

/// Drain every frame currently queued and process it. Returns the number of
/// frames taken from the queue, routed or not.
///
/// Entry point for firmware that owns a bare [`FusionContext`]. Under
/// [`NodeRunner`](crate::node::runner::NodeRunner) the runner drains the
/// queue itself and feeds each frame to [`dispatch`] through the node.
pub fn process_all<S: FrameSource + ?Sized>(ctx: &mut FusionContext, source: &mut S) -> usize {
    let mut handled = 0;
    while let Some(frame) = source.try_recv() {
        dispatch(ctx, &frame);
        handled += 1;
    }
    handled
}

/// Process a single frame. Returns `true` when the frame matched a route and
/// decoded.
pub fn dispatch(ctx: &mut FusionContext, frame: &CanFrame) -> bool {
    let route = match frame.kind() {
        FrameKind::Short(id) => routes::short_route(id),
        FrameKind::Long(id) => routes::long_route(id.pgn()),
    };
    let Some(route) = route else {
        #[cfg(feature = "defmt")]
        defmt::trace!("Unrouted frame {:?}", frame.kind());
        return false;
    };

    match (route.handler)(ctx, frame.payload()) {
        Ok(validity) => {
            apply_evidence(ctx, route, validity);
            true
        }
        Err(_e) => {
            #[cfg(feature = "defmt")]
            defmt::trace!("Dropped frame {:?}: {}", frame.kind(), _e);
            false
        }
    }
}

fn apply_evidence(ctx: &mut FusionContext, route: &Route, validity: Validity) {
    let Some(sensor) = route.sensor else {
        return;
    };
    ctx.availability.reset_enabled(sensor);

    let active = match route.active {
        Evidence::Never => false,
        Evidence::Always => true,
        Evidence::AllValid(required) => validity.contains(required),
        Evidence::When(check) => check(ctx),
    };
    if active {
        ctx.availability.reset_active(sensor);
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
