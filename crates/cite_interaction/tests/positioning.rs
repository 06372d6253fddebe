use cite_core::config::InteractionConfig;
use cite_core::domain::{Citation, CitationGroup};
use cite_interaction::positioning::{
    clamp_horizontal, place_group_tooltip, place_hover_tooltip, sheet_insets, FloatingPlacement, Side, SheetInsets,
};
use cite_interaction::{
    Affordance, Document, HitRegion, InputEvent, MarkerController, MarkerId, Mode, Placement, Point, Rect, Size,
    Surface, Viewport,
};
use pretty_assertions::assert_eq;

const DESKTOP: Viewport = Viewport::new(1024.0, 768.0);
const PHONE: Viewport = Viewport::new(390.0, 844.0);
const TOOLTIP: Size = Size::new(320.0, 160.0);

fn cfg() -> InteractionConfig {
    InteractionConfig::default()
}

#[test]
fn hover_tooltip_centers_above_anchor() {
    let placed = place_hover_tooltip(Rect::new(500.0, 300.0, 20.0, 16.0), TOOLTIP, DESKTOP, &cfg());
    assert_eq!(
        placed,
        FloatingPlacement {
            x: 350.0,
            y: 100.0,
            width: 320.0,
            height: 160.0,
            side: Side::Above,
        }
    );
}

#[test]
fn hover_tooltip_flips_below_near_the_top() {
    let placed = place_hover_tooltip(Rect::new(500.0, 50.0, 20.0, 16.0), TOOLTIP, DESKTOP, &cfg());
    assert_eq!(placed.side, Side::Below);
    assert_eq!(placed.y, 106.0);
}

#[test]
fn edges_clamp_to_margin() {
    let left = place_hover_tooltip(Rect::new(10.0, 300.0, 20.0, 16.0), TOOLTIP, DESKTOP, &cfg());
    assert_eq!(left.x, 16.0);

    let right = place_hover_tooltip(Rect::new(1000.0, 300.0, 20.0, 16.0), TOOLTIP, DESKTOP, &cfg());
    assert_eq!(right.x, 688.0);
}

#[test]
fn clamp_keeps_box_inside_viewport() {
    let margin = 16.0;
    for vw in [240.0, 390.0, 768.0, 1024.0, 1920.0] {
        for width in [100.0, 300.0, 320.0, 600.0] {
            for desired in [-500.0, -1.0, 0.0, 16.0, 120.0, 700.0, 5000.0] {
                let (x, w) = clamp_horizontal(desired, width, vw, margin);
                assert!(x >= margin, "x={x} vw={vw} width={width} desired={desired}");
                assert!(x + w <= vw - margin + 1e-9, "x={x} w={w} vw={vw}");
                assert!(w <= width);
            }
        }
    }
}

#[test]
fn oversized_tooltip_shrinks_to_viewport() {
    assert_eq!(clamp_horizontal(-40.0, 320.0, 300.0, 16.0), (16.0, 268.0));
}

#[test]
fn group_tooltip_sits_below_badge() {
    let placed = place_group_tooltip(Rect::new(120.0, 300.0, 24.0, 18.0), Size::new(300.0, 200.0), PHONE, &cfg());
    assert_eq!(
        placed,
        FloatingPlacement {
            x: 16.0,
            y: 326.0,
            width: 300.0,
            height: 200.0,
            side: Side::Below,
        }
    );
}

#[test]
fn group_tooltip_flips_above_near_the_bottom() {
    let placed = place_group_tooltip(Rect::new(120.0, 760.0, 24.0, 18.0), Size::new(300.0, 200.0), PHONE, &cfg());
    assert_eq!(placed.side, Side::Above);
    assert_eq!(placed.y, 552.0);
}

#[test]
fn sheet_uses_fixed_insets() {
    assert_eq!(
        sheet_insets(&cfg()),
        SheetInsets {
            left: 16.0,
            right: 16.0,
            bottom: 90.0,
        }
    );
}

fn tooltip_marker() -> MarkerController {
    let doc = Document::shared();
    let group = CitationGroup::new(vec![
        Citation::new("a", "alpha.pdf"),
        Citation::new("b", "beta.pdf"),
    ])
    .unwrap();
    MarkerController::new(MarkerId(0), group, Surface::MobileTooltip, PHONE, cfg(), &doc)
}

fn tap(anchor: Option<Rect>) -> InputEvent {
    InputEvent::TouchStart {
        region: HitRegion::Marker,
        point: Point::new(130.0, 310.0),
        anchor,
    }
}

#[test]
fn unmeasurable_anchor_defers_then_resolves_on_next_frame() {
    let mut m = tooltip_marker();
    m.handle(&tap(Some(Rect::new(0.0, 0.0, 0.0, 0.0))));
    assert_eq!(m.affordance(), Some(Affordance::FloatingTooltip));
    assert_eq!(m.placement(), Some(Placement::Deferred));
    assert!(m.view().is_none());

    m.handle(&InputEvent::Frame {
        anchor: Some(Rect::new(120.0, 300.0, 24.0, 18.0)),
    });
    assert!(matches!(m.placement(), Some(Placement::Floating(_))));
    assert!(m.view().is_some());
}

#[test]
fn anchor_still_unmeasurable_after_frame_closes_without_rendering() {
    let mut m = tooltip_marker();
    m.handle(&tap(Some(Rect::new(f64::NAN, 300.0, 24.0, 18.0))));
    assert_eq!(m.placement(), Some(Placement::Deferred));

    let u = m.handle(&InputEvent::Frame { anchor: None });
    assert_eq!(u.mode_after, Mode::Idle);
    assert!(!m.holds_scope());
    assert!(m.view().is_none());
}

#[test]
fn resize_recomputes_floating_placement() {
    let mut m = tooltip_marker();
    m.handle(&tap(Some(Rect::new(300.0, 300.0, 24.0, 18.0))));
    let Some(Placement::Floating(before)) = m.placement() else {
        panic!("expected floating placement");
    };
    assert_eq!(before.x, 74.0);

    m.set_viewport(Viewport::new(320.0, 844.0));
    let Some(Placement::Floating(after)) = m.placement() else {
        panic!("expected floating placement");
    };
    assert_eq!(after.x, 16.0);
    assert_eq!(after.width, 288.0);
}
