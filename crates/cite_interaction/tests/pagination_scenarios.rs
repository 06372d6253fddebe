use cite_core::config::InteractionConfig;
use cite_core::domain::{Citation, CitationGroup};
use cite_interaction::{
    Affordance, Direction, Document, GestureAction, HitRegion, InputEvent, MarkerController, MarkerId, Mode, NavPolicy,
    Pager, Point, Rect, Surface, Viewport,
};
use pretty_assertions::assert_eq;

fn three() -> CitationGroup {
    CitationGroup::new(vec![
        Citation::new("a", "alpha.pdf").with_page(1),
        Citation::new("b", "beta.docx"),
        Citation::new("c", "https://example.org/gamma"),
    ])
    .unwrap()
}

fn controller(surface: Surface) -> MarkerController {
    let doc = Document::shared();
    MarkerController::new(
        MarkerId(0),
        three(),
        surface,
        Viewport::new(1024.0, 768.0),
        InteractionConfig::default(),
        &doc,
    )
}

fn click() -> InputEvent {
    InputEvent::Click {
        anchor: Some(Rect::new(500.0, 300.0, 20.0, 16.0)),
    }
}

#[test]
fn wrap_policy_cycles_through_the_group() {
    let mut pager = Pager::new(3);
    let mut seen = vec![pager.index()];
    for _ in 0..3 {
        pager.next(NavPolicy::Wrap);
        seen.push(pager.index());
    }
    assert_eq!(seen, vec![0, 1, 2, 0]);
    assert_eq!(pager.label(), "1 / 3");
}

#[test]
fn clamp_policy_stops_at_both_ends() {
    let mut pager = Pager::new(3);
    assert!(!pager.can_prev(NavPolicy::Clamp));
    assert!(pager.next(NavPolicy::Clamp));
    assert!(pager.next(NavPolicy::Clamp));
    assert!(!pager.next(NavPolicy::Clamp));
    assert_eq!(pager.index(), 2);
    assert!(!pager.can_next(NavPolicy::Clamp));
    assert!(pager.can_prev(NavPolicy::Clamp));
}

#[test]
fn go_to_ignores_out_of_range() {
    let mut pager = Pager::new(3);
    assert!(pager.go_to(2));
    assert!(!pager.go_to(3));
    assert_eq!(pager.index(), 2);
    assert_eq!(pager.label(), "3 / 3");
}

#[test]
fn card_next_button_wraps_from_last_to_first() {
    let mut m = controller(Surface::Desktop);
    m.handle(&click());
    assert_eq!(m.mode(), Mode::ExpandedCard);

    let mut seen = vec![m.active_index()];
    for _ in 0..3 {
        m.handle(&InputEvent::Navigate {
            direction: Direction::Next,
        });
        seen.push(m.active_index());
    }
    assert_eq!(seen, vec![0, 1, 2, 0]);

    let view = m.view().unwrap();
    let pager = view.pager.unwrap();
    assert_eq!(pager.label, "1 / 3");
    assert!(pager.can_prev);
    assert!(pager.can_next);
    assert_eq!(view.citation_id, "a");
}

#[test]
fn dots_jump_directly() {
    let mut m = controller(Surface::Desktop);
    m.handle(&click());
    let u = m.handle(&InputEvent::GoTo { index: 2 });
    assert_eq!(u.action, Some(GestureAction::GoTo(2)));
    assert_eq!(m.active_index(), 2);
    assert_eq!(m.view().map(|v| v.citation_id), Some("c".to_string()));

    m.handle(&InputEvent::GoTo { index: 9 });
    assert_eq!(m.active_index(), 2);
}

#[test]
fn navigation_is_ignored_while_closed() {
    let mut m = controller(Surface::Desktop);
    let u = m.handle(&InputEvent::Navigate {
        direction: Direction::Next,
    });
    assert_eq!(u.action, None);
    assert_eq!(m.active_index(), 0);
}

#[test]
fn reopening_starts_at_first_citation() {
    let mut m = controller(Surface::Desktop);
    m.handle(&click());
    m.handle(&InputEvent::Navigate {
        direction: Direction::Next,
    });
    assert_eq!(m.active_index(), 1);
    m.handle(&InputEvent::CloseButton);
    assert_eq!(m.mode(), Mode::Idle);
    m.handle(&click());
    assert_eq!(m.active_index(), 0);
}

fn swipe_left(m: &mut MarkerController) {
    m.handle(&InputEvent::TouchStart {
        region: HitRegion::SheetContent,
        point: Point::new(300.0, 400.0),
        anchor: None,
    });
    m.handle(&InputEvent::TouchMove {
        point: Point::new(280.0, 401.0),
    });
    m.handle(&InputEvent::TouchMove {
        point: Point::new(220.0, 403.0),
    });
    m.handle(&InputEvent::TouchEnd);
}

#[test]
fn sheet_swipe_clamps_at_last_citation() {
    let mut m = controller(Surface::MobileSheet);
    m.handle(&InputEvent::TouchStart {
        region: HitRegion::Marker,
        point: Point::new(505.0, 305.0),
        anchor: Some(Rect::new(500.0, 300.0, 20.0, 16.0)),
    });
    assert_eq!(m.affordance(), Some(Affordance::BottomSheet));

    swipe_left(&mut m);
    assert_eq!(m.active_index(), 1);
    swipe_left(&mut m);
    assert_eq!(m.active_index(), 2);
    swipe_left(&mut m);
    assert_eq!(m.active_index(), 2);

    let pager = m.view().and_then(|v| v.pager).unwrap();
    assert!(!pager.can_next);
    assert!(pager.can_prev);
}

#[test]
fn sheet_swipe_right_at_first_citation_is_a_no_op() {
    let mut m = controller(Surface::MobileSheet);
    m.handle(&InputEvent::TouchStart {
        region: HitRegion::Marker,
        point: Point::new(505.0, 305.0),
        anchor: None,
    });
    m.handle(&InputEvent::TouchStart {
        region: HitRegion::SheetContent,
        point: Point::new(100.0, 400.0),
        anchor: None,
    });
    m.handle(&InputEvent::TouchMove {
        point: Point::new(200.0, 405.0),
    });
    let u = m.handle(&InputEvent::TouchEnd);
    assert_eq!(u.action, None);
    assert_eq!(m.active_index(), 0);
}

#[test]
fn single_citation_has_no_pager() {
    let doc = Document::shared();
    let mut m = MarkerController::new(
        MarkerId(3),
        CitationGroup::single(Citation::new("only", "memo.txt")),
        Surface::Desktop,
        Viewport::new(1024.0, 768.0),
        InteractionConfig::default(),
        &doc,
    );
    m.handle(&click());
    assert_eq!(m.view().and_then(|v| v.pager), None);
}

#[test]
fn hover_tooltip_next_wraps_after_three_clicks() {
    let mut m = controller(Surface::Desktop);
    m.handle(&InputEvent::PointerEnter {
        region: HitRegion::Marker,
        anchor: Some(Rect::new(500.0, 300.0, 20.0, 16.0)),
    });
    assert_eq!(m.affordance(), Some(Affordance::HoverTooltip));
    assert!(!m.aria().aria_expanded);

    let mut seen = vec![m.active_index()];
    for _ in 0..3 {
        m.handle(&InputEvent::Navigate {
            direction: Direction::Next,
        });
        seen.push(m.active_index());
    }
    assert_eq!(seen, vec![0, 1, 2, 0]);
    assert_eq!(m.mode(), Mode::HoverPreview);
}

#[test]
fn expanded_card_sets_aria_expanded() {
    let mut m = controller(Surface::Desktop);
    m.handle(&click());
    let aria = m.aria();
    assert!(aria.aria_expanded);
    assert_eq!(aria.aria_label, "Citation: alpha.pdf, Page 1 and 2 more");
    assert_eq!(m.hint(), "No preview available");
}

#[test]
fn promoting_hover_to_card_keeps_the_active_citation() {
    let mut m = controller(Surface::Desktop);
    m.handle(&InputEvent::PointerEnter {
        region: HitRegion::Marker,
        anchor: Some(Rect::new(500.0, 300.0, 20.0, 16.0)),
    });
    m.handle(&InputEvent::Navigate {
        direction: Direction::Next,
    });
    assert_eq!(m.active_index(), 1);

    m.handle(&click());
    assert_eq!(m.mode(), Mode::ExpandedCard);
    assert_eq!(m.active_index(), 1);
    assert_eq!(m.view().map(|v| v.citation_id), Some("b".to_string()));
}
