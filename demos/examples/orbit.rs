// Copyright 2025 the Orrery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A sun, a planet and a moon, driven frame by frame.
//!
//! This example shows how to:
//! - nest nodes so that each one orbits its parent's rotation pivot,
//! - size children in percent of their parent,
//! - feed a moving pointer through [`FrameContext`] and react to hover edges,
//! - collect [`DrawItem`]s with a `Vec` sink.
//!
//! Run:
//! - `cargo run -p orrery_demos --example orbit`
//! - `RUST_LOG=orrery_tree=trace cargo run -p orrery_demos --example orbit`

use kurbo::{Point, Size};
use log::info;
use orrery_demos::{LoggingConfig, init_logging};
use orrery_tree::{
    DrawItem, FrameContext, NodeEvent, NodeKind, PointerState, Rgba8, SceneError, Tree,
    UnitValue, UpdateScope,
};

const FRAMES: u32 = 8;
const DELTA: f64 = 1.0 / 60.0;
/// Radians per second.
const SUN_SPIN: f64 = 0.9;
const PLANET_SPIN: f64 = 3.0;

fn main() -> Result<(), SceneError> {
    init_logging(LoggingConfig::default());

    let viewport = Size::new(800.0, 600.0);
    let mut tree = Tree::new(viewport);

    let sun = tree.insert(None, NodeKind::Circle);
    tree.edit(sun)
        .set_position(UnitValue::percent(0.5), UnitValue::percent(0.5))
        .set_size_uniform(80.0)
        .set_align_uniform(0.5)
        .set_rotation_origin_uniform(0.5)?
        .set_tint(Rgba8::rgb(255, 200, 0));

    let planet = tree.insert(Some(sun), NodeKind::Box);
    tree.edit(planet)
        .set_position(UnitValue::percent(2.5), UnitValue::percent(0.5))
        .set_size_uniform(UnitValue::percent(0.25))
        .set_align_uniform(0.5)
        .set_rotation_origin_uniform(0.5)?
        .set_tint(Rgba8::rgb(0, 120, 255))
        .set_interactive(true);

    let moon = tree.insert(Some(planet), NodeKind::Circle);
    tree.edit(moon)
        .set_position(UnitValue::percent(1.5), UnitValue::percent(0.5))
        .set_size_uniform(UnitValue::percent(0.3))
        .set_align_uniform(0.5)
        .set_opacity(0.8);

    // The beam from the sun's center to the planet's resting spot.
    let beam = tree.insert(Some(sun), NodeKind::Line);
    tree.edit(beam)
        .set_line_points(Point::new(40.0, 40.0), Point::new(200.0, 40.0))?
        .set_opacity(0.3);

    tree.subscribe(planet, NodeEvent::HoverEnter, || info!("pointer entered the planet"));
    tree.subscribe(planet, NodeEvent::HoverExit, || info!("pointer left the planet"));

    // Sweep the pointer along the planet's starting orbit.
    let mut pointer = PointerState::at(Point::new(560.0, 300.0));
    let mut items: Vec<DrawItem> = Vec::new();
    for frame in 0..FRAMES {
        let ctx = FrameContext::new(viewport)
            .with_delta(DELTA)
            .with_pointer(pointer);
        tree.update(sun, &ctx, UpdateScope::Subtree);

        items.clear();
        tree.render(sun, &mut items, ctx.delta, UpdateScope::Subtree);
        info!("frame {frame}: {} items", items.len());
        for item in &items {
            info!(
                "  {:?} at {:?} ({:.1} deg, opacity {:.2}, tint {:?})",
                item.kind,
                item.bounds.origin(),
                item.angle.to_degrees(),
                item.opacity,
                item.tint,
            );
        }

        tree.edit(sun).add_angle(SUN_SPIN * DELTA * 10.0);
        tree.edit(planet).add_angle(PLANET_SPIN * DELTA * 10.0);
        pointer.position.y += 12.0;
    }

    tree.dispose(sun);
    assert!(!tree.is_alive(moon));
    Ok(())
}
