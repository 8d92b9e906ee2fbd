//! Bevy host bridge
//!
//! Forwards Bevy mouse and keyboard input into an [`EditorSession`]. The
//! session holds `Rc` handles, so it lives in a non-send resource and the
//! systems run on the main thread.
//!
//! World coordinates are converted to view pixels with the y axis flipped,
//! so map row 0 sits at world y = 0 and rows grow downwards.

use bevy::prelude::*;

use crate::config::EditorConfig;
use crate::input::PointerEvent;
use crate::pipeline::{CursorIcon, Modifiers};
use crate::session::EditorSession;

/// Plugin creating the editing session and wiring input into it
pub struct MapEditorInputPlugin {
    pub config: EditorConfig,
}

impl Default for MapEditorInputPlugin {
    fn default() -> Self {
        Self {
            config: EditorConfig::load(),
        }
    }
}

impl MapEditorInputPlugin {
    pub fn with_config(config: EditorConfig) -> Self {
        Self { config }
    }
}

impl Plugin for MapEditorInputPlugin {
    fn build(&self, app: &mut App) {
        match EditorSession::new(&self.config) {
            Ok(session) => {
                app.insert_non_send_resource(session);
            }
            Err(e) => {
                error!("Failed to create editing session: {}", e);
                return;
            }
        }
        app.init_resource::<PointerBridgeState>()
            .init_resource::<EditorCursor>()
            .add_systems(Update, (forward_pointer_input, forward_keyboard_shortcuts));
    }
}

/// Cursor requested by the editor layers; hosts map it to a window cursor
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EditorCursor(pub CursorIcon);

/// Pointer state carried between frames
#[derive(Resource, Debug, Default)]
pub struct PointerBridgeState {
    /// Whether the cursor was inside the window last frame
    pub inside: bool,
    /// Last pixel forwarded as a move
    pub last_pixel: Option<(i32, i32)>,
}

fn modifiers(keyboard: &ButtonInput<KeyCode>, mouse: &ButtonInput<MouseButton>) -> Modifiers {
    let mut mods = Modifiers::NONE;
    if keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]) {
        mods = mods | Modifiers::CONTROL;
    }
    if keyboard.any_pressed([KeyCode::AltLeft, KeyCode::AltRight]) {
        mods = mods | Modifiers::ALT;
    }
    if mouse.pressed(MouseButton::Right) || mouse.just_released(MouseButton::Right) {
        mods = mods | Modifiers::RIGHT_CLICK;
    }
    if mouse.pressed(MouseButton::Middle) || mouse.just_released(MouseButton::Middle) {
        mods = mods | Modifiers::MIDDLE_CLICK;
    }
    mods
}

fn forward_pointer_input(
    mut session: NonSendMut<EditorSession>,
    mut state: ResMut<PointerBridgeState>,
    mut cursor: ResMut<EditorCursor>,
    windows: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
) {
    let Some(window) = windows.iter().next() else {
        return;
    };
    let Some((camera, camera_transform)) = camera_q.iter().next() else {
        return;
    };

    let Some(cursor_position) = window.cursor_position() else {
        if state.inside {
            state.inside = false;
            state.last_pixel = None;
            cursor.0 = session.pointer(PointerEvent::Exited);
        }
        return;
    };
    state.inside = true;

    let Ok(world_pos) = camera.viewport_to_world_2d(camera_transform, cursor_position) else {
        return;
    };
    let x = world_pos.x.floor() as i32;
    let y = (-world_pos.y).floor() as i32;
    let mods = modifiers(&keyboard, &mouse_buttons);

    if mouse_buttons.get_just_pressed().next().is_some() {
        cursor.0 = session.pointer(PointerEvent::Pressed { x, y, mods });
    }
    if state.last_pixel != Some((x, y)) {
        state.last_pixel = Some((x, y));
        cursor.0 = session.pointer(PointerEvent::Moved { x, y, mods });
    }
    if mouse_buttons.get_just_released().next().is_some() {
        cursor.0 = session.pointer(PointerEvent::Released { x, y, mods });
    }
}

/// Character a shortcut key produces, for the keys the editor binds
fn key_char(key: KeyCode) -> Option<char> {
    let c = match key {
        KeyCode::KeyZ => 'z',
        KeyCode::KeyY => 'y',
        KeyCode::KeyG => 'g',
        KeyCode::KeyL => 'l',
        KeyCode::Digit1 => '1',
        KeyCode::Digit2 => '2',
        KeyCode::Digit3 => '3',
        KeyCode::Digit4 => '4',
        _ => return None,
    };
    Some(c)
}

fn forward_keyboard_shortcuts(
    mut session: NonSendMut<EditorSession>,
    keyboard: Res<ButtonInput<KeyCode>>,
) {
    let ctrl = keyboard.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
    let shift = keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

    for key in keyboard.get_just_pressed() {
        if let Some(c) = key_char(*key) {
            session.key(c, ctrl, shift);
        }
    }
}
