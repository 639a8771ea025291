use super::render::compose_frame;
use super::zone::render_static;
use super::*;

use crate::config::AppConfig;
use crate::effects::{Dispatcher, FlagQuery, PercentQuery, SideEffect};
use crate::resources::MenuArt;
use crate::surface::Surface;
use crate::theme::LayoutStore;

use clap::Parser;

struct RecordingDispatcher {
    dispatched: Vec<SideEffect>,
    fail: bool,
    volume: u8,
    brightness: u8,
    usb_connected: bool,
    usb_sharing: bool,
}

impl RecordingDispatcher {
    fn new() -> Self {
        Self {
            dispatched: Vec::new(),
            fail: false,
            volume: 40,
            brightness: 70,
            usb_connected: false,
            usb_sharing: false,
        }
    }
}

impl Dispatcher for RecordingDispatcher {
    fn dispatch(&mut self, effect: &SideEffect) -> bool {
        self.dispatched.push(effect.clone());
        !self.fail
    }

    fn query_percent(&mut self, query: PercentQuery) -> u8 {
        match query {
            PercentQuery::Volume => self.volume,
            PercentQuery::Brightness => self.brightness,
        }
    }

    fn query_flag(&mut self, query: FlagQuery) -> bool {
        match query {
            FlagQuery::UsbConnected => self.usb_connected,
            FlagQuery::UsbSharing => self.usb_sharing,
        }
    }
}

fn test_config() -> AppConfig {
    AppConfig::parse_from(["test-app"])
}

fn state_with(zones: &[ZoneType], values: ZoneValues) -> MenuState {
    let zones = build_zones(zones).expect("non-empty zone set");
    MenuState::new(zones, values, None, &test_config())
}

fn settle(state: &mut MenuState) {
    while state.is_scrolling() {
        state.step_scroll(3, 16);
    }
}

fn press(state: &mut MenuState, input: MenuInput) -> InputOutcome {
    let outcome = state.handle_input(input);
    settle(state);
    outcome
}

/// Drive the confirm path the way the frame driver does: begin the action,
/// dispatch, fold the result back.
fn commit_current(state: &mut MenuState, dispatcher: &mut RecordingDispatcher) -> SessionEvent {
    match state.handle_input(MenuInput::Confirm) {
        InputOutcome::Commit(effect) => {
            state.begin_action();
            assert!(state.action_in_progress());
            assert!(!state.confirmation_pending());
            let success = match effect.as_ref() {
                Some(effect) => dispatcher.dispatch(effect),
                None => true,
            };
            state.apply_commit(effect.as_ref(), success)
        }
        other => panic!("expected a commit, got {other:?}"),
    }
}

#[test]
fn registry_orders_zones_by_priority() {
    let zones = build_zones(&[ZoneType::Powerdown, ZoneType::Volume, ZoneType::Exit])
        .expect("zones");
    assert_eq!(zones, vec![ZoneType::Volume, ZoneType::Exit, ZoneType::Powerdown]);
}

#[test]
fn registry_rejects_an_empty_capability_set() {
    assert!(build_zones(&[]).is_err());
}

#[test]
fn registry_deduplicates_zones() {
    let zones = build_zones(&[ZoneType::Volume, ZoneType::Volume]).expect("zones");
    assert_eq!(zones, vec![ZoneType::Volume]);
}

#[test]
fn down_presses_cycle_back_to_start_when_usb_is_connected() {
    let values = ZoneValues {
        usb_connected: true,
        ..ZoneValues::default()
    };
    let mut state = state_with(ZONE_PRIORITY, values);
    let len = state.zones().len();
    for _ in 0..len {
        press(&mut state, MenuInput::Down);
    }
    assert_eq!(state.current_index(), 0);
}

#[test]
fn down_presses_skip_usb_while_disconnected() {
    let mut state = state_with(ZONE_PRIORITY, ZoneValues::default());
    let len = state.zones().len();
    let mut visited = Vec::new();
    // The USB zone drops out of the circuit, so one full cycle is a press
    // shorter than the zone list.
    for _ in 0..(len - 1) {
        press(&mut state, MenuInput::Down);
        visited.push(state.current_zone());
    }
    assert!(!visited.contains(&ZoneType::Usb));
    assert_eq!(state.current_index(), 0);
}

#[test]
fn up_navigation_wraps_and_skips_usb_too() {
    let mut state = state_with(ZONE_PRIORITY, ZoneValues::default());
    press(&mut state, MenuInput::Up);
    assert_eq!(state.current_zone(), ZoneType::Powerdown);

    // Walk backwards over the spot where USB sits.
    let mut state = state_with(&[ZoneType::Volume, ZoneType::Usb, ZoneType::Exit], ZoneValues::default());
    press(&mut state, MenuInput::Up);
    assert_eq!(state.current_zone(), ZoneType::Exit);
    press(&mut state, MenuInput::Up);
    assert_eq!(state.current_zone(), ZoneType::Volume);
}

#[test]
fn navigation_clears_a_pending_confirmation() {
    let mut state = state_with(&[ZoneType::Volume, ZoneType::Exit], ZoneValues::default());
    press(&mut state, MenuInput::Down);
    assert_eq!(press(&mut state, MenuInput::Confirm), InputOutcome::Redraw);
    assert!(state.confirmation_pending());
    press(&mut state, MenuInput::Down);
    assert!(!state.confirmation_pending());
}

#[test]
fn navigation_is_ignored_while_usb_is_sharing() {
    let values = ZoneValues {
        usb_connected: true,
        usb_sharing: true,
        ..ZoneValues::default()
    };
    let mut state = state_with(ZONE_PRIORITY, values);
    assert_eq!(press(&mut state, MenuInput::Down), InputOutcome::Ignored);
    assert_eq!(press(&mut state, MenuInput::Close), InputOutcome::Ignored);
    assert_eq!(state.current_index(), 0);
}

#[test]
fn volume_steps_saturate_at_the_bounds() {
    let mut state = state_with(&[ZoneType::Volume], ZoneValues::default());
    // Default 50, step 10: five presses to the ceiling, then it stays.
    for expected in [60u8, 70, 80, 90, 100, 100] {
        let outcome = press(&mut state, MenuInput::Right);
        assert_eq!(outcome, InputOutcome::Effect(SideEffect::SetVolume(expected)));
        assert!(state.values().volume_percent <= 100);
    }
    for expected in (0..10).map(|i| 100u8.saturating_sub((i + 1) * 10)) {
        let outcome = press(&mut state, MenuInput::Left);
        assert_eq!(outcome, InputOutcome::Effect(SideEffect::SetVolume(expected)));
    }
    assert_eq!(
        press(&mut state, MenuInput::Left),
        InputOutcome::Effect(SideEffect::SetVolume(0))
    );
}

#[test]
fn brightness_steps_use_their_own_value() {
    let mut state = state_with(&[ZoneType::Brightness], ZoneValues::default());
    let outcome = press(&mut state, MenuInput::Left);
    assert_eq!(
        outcome,
        InputOutcome::Effect(SideEffect::SetBrightness(40))
    );
    assert_eq!(state.values().volume_percent, 50);
}

#[test]
fn save_slot_wraps_over_the_slot_count() {
    let mut state = state_with(&[ZoneType::Save], ZoneValues::default());
    press(&mut state, MenuInput::Left);
    assert_eq!(state.values().save_slot, 8);
    press(&mut state, MenuInput::Right);
    assert_eq!(state.values().save_slot, 0);
    press(&mut state, MenuInput::Right);
    assert_eq!(state.values().save_slot, 1);
}

#[test]
fn aspect_ratio_wraps_over_its_names() {
    let mut state = state_with(&[ZoneType::AspectRatio], ZoneValues::default());
    for _ in 0..ASPECT_RATIO_NAMES.len() {
        press(&mut state, MenuInput::Right);
    }
    assert_eq!(state.values().aspect_ratio, 0);
    press(&mut state, MenuInput::Left);
    assert_eq!(state.values().aspect_ratio, ASPECT_RATIO_NAMES.len() - 1);
}

#[test]
fn confirm_twice_dispatches_exactly_once() {
    let mut state = state_with(&[ZoneType::ReadWrite], ZoneValues::default());
    let mut dispatcher = RecordingDispatcher::new();

    assert_eq!(press(&mut state, MenuInput::Confirm), InputOutcome::Redraw);
    assert!(state.confirmation_pending());
    assert!(dispatcher.dispatched.is_empty());

    let event = commit_current(&mut state, &mut dispatcher);
    assert_eq!(event, SessionEvent::Continue);
    assert_eq!(dispatcher.dispatched, vec![SideEffect::MountReadWrite]);
    assert!(!state.confirmation_pending());
    assert!(!state.action_in_progress());
    assert!(state.values().read_write);
}

#[test]
fn back_clears_confirmation_without_moving_or_dispatching() {
    let mut state = state_with(&[ZoneType::Save, ZoneType::Exit], ZoneValues::default());
    press(&mut state, MenuInput::Down);
    press(&mut state, MenuInput::Confirm);
    assert!(state.confirmation_pending());

    assert_eq!(press(&mut state, MenuInput::Back), InputOutcome::Redraw);
    assert!(!state.confirmation_pending());
    assert_eq!(state.current_zone(), ZoneType::Exit);

    // A second back with nothing pending is a no-op, not a close.
    assert_eq!(press(&mut state, MenuInput::Back), InputOutcome::Ignored);
}

#[test]
fn scroll_offset_grows_monotonically_then_snaps_to_zero() {
    let mut state = state_with(&[ZoneType::Volume, ZoneType::Save], ZoneValues::default());
    state.handle_input(MenuInput::Down);
    assert!(state.is_scrolling());

    let mut last = 0;
    let mut observed = Vec::new();
    while state.is_scrolling() {
        assert!(state.step_scroll(3, 16));
        let offset = state.scroll();
        observed.push(offset);
        if offset != 0 {
            assert!(offset > last, "offset must grow while travelling");
            assert!(offset < 16, "offset never reaches the zone height");
            last = offset;
        }
    }
    assert_eq!(observed.last(), Some(&0));
    assert_eq!(state.previous_index(), state.current_index());
    assert!(!state.step_scroll(3, 16));
}

#[test]
fn upward_scroll_uses_negative_offsets() {
    let mut state = state_with(&[ZoneType::Volume, ZoneType::Save], ZoneValues::default());
    state.handle_input(MenuInput::Up);
    assert!(state.step_scroll(5, 16));
    assert_eq!(state.scroll(), -5);
    settle(&mut state);
    assert_eq!(state.scroll(), 0);
}

#[test]
fn usb_confirm_toggles_sharing_only_on_success() {
    let values = ZoneValues {
        usb_connected: true,
        ..ZoneValues::default()
    };
    let mut state = state_with(&[ZoneType::Usb], values);
    let mut dispatcher = RecordingDispatcher::new();

    press(&mut state, MenuInput::Confirm);
    let event = commit_current(&mut state, &mut dispatcher);
    assert_eq!(event, SessionEvent::Continue);
    assert_eq!(dispatcher.dispatched, vec![SideEffect::MountUsb]);
    assert!(state.values().usb_sharing);

    press(&mut state, MenuInput::Confirm);
    let event = commit_current(&mut state, &mut dispatcher);
    assert_eq!(event, SessionEvent::Continue);
    assert_eq!(
        dispatcher.dispatched,
        vec![SideEffect::MountUsb, SideEffect::EjectUsb]
    );
    assert!(!state.values().usb_sharing);
}

#[test]
fn failed_dispatch_never_flips_persistent_flags() {
    let mut state = state_with(&[ZoneType::ReadWrite], ZoneValues::default());
    let mut dispatcher = RecordingDispatcher::new();
    dispatcher.fail = true;

    press(&mut state, MenuInput::Confirm);
    let event = commit_current(&mut state, &mut dispatcher);
    assert_eq!(event, SessionEvent::Continue);
    assert_eq!(dispatcher.dispatched, vec![SideEffect::MountReadWrite]);
    assert!(!state.values().read_write, "failed remount must not flip the flag");
    assert!(!state.confirmation_pending());
    assert!(!state.action_in_progress());
}

#[test]
fn save_commit_closes_the_session_with_the_chosen_slot() {
    let mut state = state_with(&[ZoneType::Save], ZoneValues::default());
    let mut dispatcher = RecordingDispatcher::new();
    press(&mut state, MenuInput::Right);
    press(&mut state, MenuInput::Right);

    press(&mut state, MenuInput::Confirm);
    let event = commit_current(&mut state, &mut dispatcher);
    assert_eq!(event, SessionEvent::Close);
    assert_eq!(dispatcher.dispatched, vec![SideEffect::SaveState(2)]);
}

#[test]
fn load_commit_closes_the_session() {
    let mut state = state_with(&[ZoneType::Load], ZoneValues::default());
    let mut dispatcher = RecordingDispatcher::new();
    press(&mut state, MenuInput::Confirm);
    let event = commit_current(&mut state, &mut dispatcher);
    assert_eq!(event, SessionEvent::Close);
    assert_eq!(dispatcher.dispatched, vec![SideEffect::LoadState(0)]);
}

#[test]
fn theme_selection_wraps_and_commits_the_selected_name() {
    let store = LayoutStore::from_names(
        vec!["aurora.theme".into(), "mono.theme".into(), "zebra.theme".into()],
        1,
    )
    .expect("store");
    let zones = build_zones(&[ZoneType::Theme]).expect("zones");
    let mut state = MenuState::new(zones, ZoneValues::default(), Some(&store), &test_config());
    assert_eq!(state.layout_name(), Some("mono.theme"));

    press(&mut state, MenuInput::Right);
    press(&mut state, MenuInput::Right);
    assert_eq!(state.layout_name(), Some("aurora.theme"));

    let mut dispatcher = RecordingDispatcher::new();
    press(&mut state, MenuInput::Confirm);
    let event = commit_current(&mut state, &mut dispatcher);
    assert_eq!(event, SessionEvent::ExitRequested);
    assert_eq!(
        dispatcher.dispatched,
        vec![SideEffect::ApplyLayout {
            name: "aurora.theme".into()
        }]
    );
}

#[test]
fn launcher_commit_requests_a_host_exit() {
    let mut state = state_with(&[ZoneType::Launcher], ZoneValues::default());
    let mut dispatcher = RecordingDispatcher::new();
    press(&mut state, MenuInput::Confirm);
    let event = commit_current(&mut state, &mut dispatcher);
    assert_eq!(event, SessionEvent::ExitRequested);
    assert_eq!(dispatcher.dispatched, vec![SideEffect::SetLauncher]);
}

#[test]
fn powerdown_commit_dispatches_and_requests_exit() {
    let mut state = state_with(&[ZoneType::Powerdown], ZoneValues::default());
    let mut dispatcher = RecordingDispatcher::new();
    press(&mut state, MenuInput::Confirm);
    let event = commit_current(&mut state, &mut dispatcher);
    assert_eq!(event, SessionEvent::ExitRequested);
    assert_eq!(dispatcher.dispatched, vec![SideEffect::Powerdown]);
}

#[test]
fn volume_save_exit_walkthrough() {
    let zones = [ZoneType::Volume, ZoneType::Save, ZoneType::Exit];
    let mut dispatcher = RecordingDispatcher::new();
    dispatcher.volume = 0;
    let mut state = state_with(&zones, ZoneValues::default());
    state.refresh_system_values(&mut dispatcher);
    assert_eq!(state.values().volume_percent, 0);

    for _ in 0..5 {
        let outcome = press(&mut state, MenuInput::Right);
        if let InputOutcome::Effect(effect) = outcome {
            assert!(dispatcher.dispatch(&effect));
        } else {
            panic!("expected an immediate volume effect");
        }
    }
    assert_eq!(state.values().volume_percent, 50);
    assert_eq!(dispatcher.dispatched.len(), 5);
    assert_eq!(dispatcher.dispatched.last(), Some(&SideEffect::SetVolume(50)));

    press(&mut state, MenuInput::Down);
    press(&mut state, MenuInput::Down);
    assert_eq!(state.current_zone(), ZoneType::Exit);
    press(&mut state, MenuInput::Down);
    assert_eq!(state.current_index(), 0);
    press(&mut state, MenuInput::Up);
    assert_eq!(state.current_zone(), ZoneType::Exit);

    assert_eq!(press(&mut state, MenuInput::Confirm), InputOutcome::Redraw);
    assert_eq!(dispatcher.dispatched.len(), 5, "no dispatch on the first confirm");
    let event = commit_current(&mut state, &mut dispatcher);
    assert_eq!(event, SessionEvent::ExitRequested);
    assert_eq!(dispatcher.dispatched.len(), 5, "exit commits without a dispatch");
}

#[test]
fn refresh_pulls_percentages_and_usb_state() {
    let mut dispatcher = RecordingDispatcher::new();
    dispatcher.volume = 30;
    dispatcher.brightness = 80;
    dispatcher.usb_connected = true;
    dispatcher.usb_sharing = true;

    let mut state = state_with(ZONE_PRIORITY, ZoneValues::default());
    state.refresh_system_values(&mut dispatcher);
    assert_eq!(state.values().volume_percent, 30);
    assert_eq!(state.values().brightness_percent, 80);
    assert!(state.values().usb_sharing);
    // An active share forces the session onto the USB zone.
    assert_eq!(state.current_zone(), ZoneType::Usb);
}

#[test]
fn refresh_clears_a_stale_share_when_the_cable_is_gone() {
    let mut dispatcher = RecordingDispatcher::new();
    dispatcher.usb_connected = false;
    dispatcher.usb_sharing = true;

    let values = ZoneValues {
        usb_connected: true,
        usb_sharing: true,
        ..ZoneValues::default()
    };
    let mut state = state_with(ZONE_PRIORITY, values);
    state.refresh_system_values(&mut dispatcher);
    assert!(!state.values().usb_connected);
    assert!(!state.values().usb_sharing);
    assert_eq!(state.current_index(), 0);
}

mod frame_composition {
    use super::*;

    fn no_art() -> MenuArt {
        MenuArt {
            zone_bg: None,
            arrow_up: None,
            arrow_down: None,
        }
    }

    fn arrows_only() -> MenuArt {
        MenuArt {
            zone_bg: None,
            arrow_up: crate::resources::surface_from_text("^"),
            arrow_down: crate::resources::surface_from_text("v"),
        }
    }

    fn statics_for(state: &MenuState, config: &AppConfig, art: &MenuArt) -> Vec<Surface> {
        state
            .zones()
            .iter()
            .map(|zone| render_static(*zone, config, art))
            .collect()
    }

    fn char_at(frame: &Surface, x: i32, y: i32) -> char {
        frame.get(x, y).map(|cell| cell.ch).unwrap_or('?')
    }

    fn row_text(frame: &Surface, y: i32) -> String {
        (0..frame.width() as i32)
            .map(|x| char_at(frame, x, y))
            .collect::<String>()
            .trim()
            .to_string()
    }

    #[test]
    fn settled_frame_shows_the_current_zone() {
        let config = test_config();
        let state = state_with(&[ZoneType::Volume, ZoneType::Save], ZoneValues::default());
        let art = no_art();
        let statics = statics_for(&state, &config, &art);
        let mut frame = Surface::new(48, 16);
        compose_frame(&state, &statics, &art, &mut frame);
        assert_eq!(row_text(&frame, 6), "VOLUME");
    }

    #[test]
    fn mid_scroll_frame_shows_both_zones_of_the_pair() {
        let config = test_config();
        let mut state = state_with(&[ZoneType::Volume, ZoneType::Save], ZoneValues::default());
        let art = no_art();
        let statics = statics_for(&state, &config, &art);
        state.handle_input(MenuInput::Down);
        state.step_scroll(6, 16);
        assert_eq!(state.scroll(), 6);

        let mut frame = Surface::new(48, 16);
        compose_frame(&state, &statics, &art, &mut frame);
        // The volume title (row 6) moved up by the offset; the save title
        // (row 4) rides in from the bottom edge.
        assert_eq!(row_text(&frame, 0), "VOLUME");
        assert_eq!(row_text(&frame, 14), "SAVE");
    }

    #[test]
    fn arrows_render_only_while_settled_and_not_sharing() {
        let config = test_config();
        let mut state = state_with(&[ZoneType::Volume, ZoneType::Save], ZoneValues::default());
        let art = arrows_only();
        let statics = statics_for(&state, &config, &art);
        let mut frame = Surface::new(48, 16);

        compose_frame(&state, &statics, &art, &mut frame);
        assert_eq!(char_at(&frame, 23, 0), '^');
        assert_eq!(char_at(&frame, 23, 15), 'v');

        state.handle_input(MenuInput::Down);
        state.step_scroll(3, 16);
        compose_frame(&state, &statics, &art, &mut frame);
        assert_ne!(char_at(&frame, 23, 0), '^');
    }

    #[test]
    fn usb_zone_caption_tracks_share_state_and_hides_arrows() {
        let config = test_config();
        let values = ZoneValues {
            usb_connected: true,
            usb_sharing: true,
            ..ZoneValues::default()
        };
        let state = state_with(&[ZoneType::Usb], values);
        let art = arrows_only();
        let statics = statics_for(&state, &config, &art);
        let mut frame = Surface::new(48, 16);
        compose_frame(&state, &statics, &art, &mut frame);
        assert_eq!(row_text(&frame, 8), "EJECT USB");
        assert_ne!(char_at(&frame, 23, 0), '^');
    }

    #[test]
    fn confirmation_and_action_captions_render() {
        let config = test_config();
        let mut state = state_with(&[ZoneType::Exit], ZoneValues::default());
        let art = no_art();
        let statics = statics_for(&state, &config, &art);
        let mut frame = Surface::new(48, 16);

        state.handle_input(MenuInput::Confirm);
        compose_frame(&state, &statics, &art, &mut frame);
        assert_eq!(row_text(&frame, 12), "Are you sure?");

        state.begin_action();
        compose_frame(&state, &statics, &art, &mut frame);
        assert_eq!(row_text(&frame, 12), "Shutting down...");
    }

    #[test]
    fn volume_bar_reflects_the_current_percentage() {
        let config = test_config();
        let mut state = state_with(&[ZoneType::Volume], ZoneValues::default());
        let art = no_art();
        let statics = statics_for(&state, &config, &art);

        let solid_cells = |frame: &Surface| {
            (0..frame.width() as i32)
                .filter(|x| char_at(frame, *x, 10) == '█')
                .count()
        };

        let mut frame = Surface::new(48, 16);
        compose_frame(&state, &statics, &art, &mut frame);
        let at_fifty = solid_cells(&frame);

        for _ in 0..5 {
            state.handle_input(MenuInput::Right);
            settle(&mut state);
        }
        compose_frame(&state, &statics, &art, &mut frame);
        assert!(solid_cells(&frame) > at_fifty);
    }
}
