#![warn(clippy::pedantic)]

use log::{debug, warn};
use thiserror::Error;

use keyboard::{Key, KeyboardSnapshot};
use mouse::MouseSnapshot;

/// Screen pixels moved per unit of relative mouse motion.
pub const MOUSE_RESOLUTION: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputDevice {
    Mouse,
    Keyboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RawInputError {
    #[error("the input device was lost")]
    InputLost,
    #[error("couldn't acquire the {0:?}")]
    Acquire(InputDevice),
    #[error("couldn't set the {0:?} cooperative level")]
    CooperativeLevel(InputDevice),
    #[error("the input driver failed: {0}")]
    Driver(String),
}

pub type Result<T> = std::result::Result<T, RawInputError>;

/// Polled access to the mouse and keyboard devices.
pub trait RawInput {
    /// Position of the system cursor, used as the starting mouse position.
    fn cursor_position(&self) -> (i32, i32);
    fn set_cooperative_level(&mut self, device: InputDevice, exclusive: bool) -> Result<()>;
    fn acquire(&mut self, device: InputDevice) -> Result<()>;
    fn unacquire(&mut self, device: InputDevice);
    fn release(&mut self, device: InputDevice);
    /// Returns `Ok(None)` when the mouse has nothing new to report.
    fn read_mouse(&mut self) -> Result<Option<MouseSnapshot>>;
    /// Returns `Ok(None)` when the keyboard has nothing new to report.
    fn read_keyboard(&mut self) -> Result<Option<KeyboardSnapshot>>;
}

/// Whatever currently receives input, usually the active window.
pub trait InputFocus {
    /// Lets the focus confirm or clamp the new mouse position and wheel motion.
    fn move_mouse(&mut self, _x: &mut i32, _y: &mut i32, _z: &mut i32) {}
    fn left_button_down(&mut self, _x: i32, _y: i32) {}
    fn left_button_up(&mut self, _x: i32, _y: i32) {}
    fn right_button_down(&mut self, _x: i32, _y: i32) {}
    fn right_button_up(&mut self, _x: i32, _y: i32) {}
    fn handle_keys(&mut self, _current: &KeyboardSnapshot, _previous: &KeyboardSnapshot) {}
    fn release_focus(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Continue,
    /// Escape, Control and Shift were held together and the focus was released.
    FocusReleased,
    /// Escape and Control were held together.
    ExitRequested,
}

pub struct InputSystem {
    pub keyboard: keyboard::State,
    pub mouse: mouse::State,
    acquired: bool,
}

impl InputSystem {
    #[must_use]
    pub fn new() -> Self {
        Self {
            keyboard: keyboard::State::new(),
            mouse: mouse::State::new(),
            acquired: false,
        }
    }

    /// Sets both devices' cooperative levels and acquires them. Fullscreen
    /// programs take the devices exclusively.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver refuses either step. Devices acquired
    /// before the failure are unacquired again.
    pub fn init<R>(&mut self, raw: &mut R, windowed: bool) -> Result<()>
    where
        R: RawInput + ?Sized,
    {
        let exclusive = !windowed;
        for device in [InputDevice::Mouse, InputDevice::Keyboard] {
            raw.set_cooperative_level(device, exclusive)?;
        }

        let (x, y) = raw.cursor_position();
        self.mouse.set_position(x, y);

        let devices = [InputDevice::Mouse, InputDevice::Keyboard];
        for (index, device) in devices.into_iter().enumerate() {
            if let Err(error) = raw.acquire(device) {
                for acquired in &devices[..index] {
                    raw.unacquire(*acquired);
                }
                return Err(error);
            }
        }
        self.acquired = true;
        debug!("Input devices acquired, exclusive: {exclusive}");
        Ok(())
    }

    /// Polls both devices and forwards what changed to `focus`.
    ///
    /// A lost device is acquired again and skipped for this update.
    ///
    /// # Errors
    ///
    /// Returns an error if a device fails for another reason than being lost,
    /// or if it cannot be acquired again.
    pub fn update<R, F>(&mut self, raw: &mut R, focus: &mut F) -> Result<InputOutcome>
    where
        R: RawInput + ?Sized,
        F: InputFocus + ?Sized,
    {
        match raw.read_mouse() {
            Ok(Some(snapshot)) => self.mouse.on_snapshot(snapshot, focus),
            Ok(None) => {}
            Err(RawInputError::InputLost) => {
                warn!("Mouse lost, acquiring it again");
                raw.acquire(InputDevice::Mouse)?;
            }
            Err(error) => return Err(error),
        }

        match raw.read_keyboard() {
            Ok(Some(snapshot)) => Ok(self.on_keyboard_snapshot(snapshot, focus)),
            Ok(None) => Ok(InputOutcome::Continue),
            Err(RawInputError::InputLost) => {
                warn!("Keyboard lost, acquiring it again");
                raw.acquire(InputDevice::Keyboard)?;
                Ok(InputOutcome::Continue)
            }
            Err(error) => Err(error),
        }
    }

    fn on_keyboard_snapshot<F>(&mut self, snapshot: KeyboardSnapshot, focus: &mut F) -> InputOutcome
    where
        F: InputFocus + ?Sized,
    {
        focus.handle_keys(&snapshot, self.keyboard.current());
        self.keyboard.on_snapshot(snapshot);

        let escape = self.keyboard.is_key_down(Key::Escape);
        let control =
            self.keyboard.is_key_down(Key::LControl) || self.keyboard.is_key_down(Key::RControl);
        let shift =
            self.keyboard.is_key_down(Key::LShift) || self.keyboard.is_key_down(Key::RShift);

        if escape && control && shift {
            debug!("Forcing a focus release");
            focus.release_focus();
            InputOutcome::FocusReleased
        } else if escape && control {
            warn!("Hard exit requested from the keyboard");
            InputOutcome::ExitRequested
        } else {
            InputOutcome::Continue
        }
    }

    /// Forgets every key, button and edge seen so far.
    pub fn clear_states(&mut self) {
        self.keyboard.clear();
        self.mouse.clear();
    }

    pub fn shutdown<R>(&mut self, raw: &mut R)
    where
        R: RawInput + ?Sized,
    {
        if !self.acquired {
            return;
        }

        for device in [InputDevice::Mouse, InputDevice::Keyboard] {
            raw.unacquire(device);
            raw.release(device);
        }
        self.acquired = false;
        debug!("Input devices released");
    }
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}

pub mod mouse {
    use log::trace;

    use crate::{InputFocus, MOUSE_RESOLUTION};

    pub const CURSOR_WIDTH: i32 = 32;
    pub const CURSOR_HEIGHT: i32 = 32;

    const BUTTON_COUNT: usize = 4;
    const DOWN: u8 = 0x80;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Button {
        Left = 0,
        Right,
        Middle,
        Extra,
    }

    /// Relative motion since the previous read and the button bytes.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
    pub struct MouseSnapshot {
        pub dx: i32,
        pub dy: i32,
        pub dz: i32,
        pub buttons: [u8; BUTTON_COUNT],
    }

    impl MouseSnapshot {
        #[must_use]
        pub fn new(dx: i32, dy: i32, dz: i32) -> Self {
            Self {
                dx,
                dy,
                dz,
                buttons: [0; BUTTON_COUNT],
            }
        }

        #[must_use]
        pub fn with_button_down(mut self, button: Button) -> Self {
            self.buttons[button as usize] = DOWN;
            self
        }

        #[must_use]
        pub fn is_button_down(&self, button: Button) -> bool {
            self.buttons[button as usize] & DOWN != 0
        }
    }

    /// Which edge was last reported for a button.
    #[derive(Debug, Default, Clone, Copy)]
    struct ButtonLatch {
        down_handled: bool,
        up_handled: bool,
    }

    pub struct State {
        x: i32,
        y: i32,
        z: i32,
        previous: MouseSnapshot,
        latches: [ButtonLatch; 2],
    }

    impl State {
        #[must_use]
        pub fn new() -> Self {
            Self {
                x: 0,
                y: 0,
                z: 0,
                previous: MouseSnapshot::default(),
                latches: [ButtonLatch::default(); 2],
            }
        }

        #[must_use]
        pub fn position(&self) -> (i32, i32) {
            (self.x, self.y)
        }

        pub fn set_position(&mut self, x: i32, y: i32) {
            self.x = x;
            self.y = y;
        }

        /// Wheel motion of the last snapshot, in screen units.
        #[must_use]
        pub fn wheel(&self) -> i32 {
            self.z
        }

        /// Cursor rectangle as `(left, top, right, bottom)`.
        #[must_use]
        pub fn cursor_rect(&self) -> (i32, i32, i32, i32) {
            (
                self.x,
                self.y,
                self.x + CURSOR_WIDTH,
                self.y + CURSOR_HEIGHT,
            )
        }

        #[must_use]
        pub fn is_button_down(&self, button: Button) -> bool {
            self.previous.is_button_down(button)
        }

        pub(crate) fn on_snapshot<F>(&mut self, snapshot: MouseSnapshot, focus: &mut F)
        where
            F: InputFocus + ?Sized,
        {
            self.x = self.x.saturating_add(snapshot.dx.saturating_mul(MOUSE_RESOLUTION));
            self.y = self.y.saturating_add(snapshot.dy.saturating_mul(MOUSE_RESOLUTION));
            self.z = snapshot.dz.saturating_mul(MOUSE_RESOLUTION);
            focus.move_mouse(&mut self.x, &mut self.y, &mut self.z);

            for button in [Button::Left, Button::Right] {
                let was_down = self.previous.is_button_down(button);
                let is_down = snapshot.is_button_down(button);
                let latch = &mut self.latches[button as usize];

                if was_down && !is_down && !latch.up_handled {
                    latch.up_handled = true;
                    latch.down_handled = false;
                    trace!("Button up: {button:?} at ({}, {})", self.x, self.y);
                    match button {
                        Button::Left => focus.left_button_up(self.x, self.y),
                        _ => focus.right_button_up(self.x, self.y),
                    }
                } else if !was_down && is_down && !latch.down_handled {
                    latch.down_handled = true;
                    latch.up_handled = false;
                    trace!("Button down: {button:?} at ({}, {})", self.x, self.y);
                    match button {
                        Button::Left => focus.left_button_down(self.x, self.y),
                        _ => focus.right_button_down(self.x, self.y),
                    }
                }
            }

            self.previous = snapshot;
        }

        pub(crate) fn clear(&mut self) {
            self.previous = MouseSnapshot::default();
            self.latches = [ButtonLatch::default(); 2];
            self.z = 0;
        }
    }

    impl Default for State {
        fn default() -> Self {
            Self::new()
        }
    }
}

pub mod keyboard {
    use log::trace;

    const KEY_COUNT: usize = 256;
    const DOWN: u8 = 0x80;

    /// One byte per scan code, the high bit set while the key is held.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct KeyboardSnapshot {
        keys: [u8; KEY_COUNT],
    }

    impl KeyboardSnapshot {
        #[must_use]
        pub fn new() -> Self {
            Self {
                keys: [0; KEY_COUNT],
            }
        }

        #[must_use]
        pub fn from_bytes(keys: [u8; KEY_COUNT]) -> Self {
            Self { keys }
        }

        #[must_use]
        pub fn with_keys_down(keys: &[Key]) -> Self {
            let mut snapshot = Self::new();
            for key in keys {
                snapshot.press(*key);
            }
            snapshot
        }

        pub fn press(&mut self, key: Key) {
            self.keys[key as usize] |= DOWN;
        }

        pub fn release(&mut self, key: Key) {
            self.keys[key as usize] &= !DOWN;
        }

        #[must_use]
        pub fn is_key_down(&self, key: Key) -> bool {
            self.keys[key as usize] & DOWN != 0
        }

        #[must_use]
        pub fn bytes(&self) -> &[u8; KEY_COUNT] {
            &self.keys
        }
    }

    impl Default for KeyboardSnapshot {
        fn default() -> Self {
            Self::new()
        }
    }

    impl std::fmt::Debug for KeyboardSnapshot {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            let down: Vec<usize> = (0..KEY_COUNT)
                .filter(|&code| self.keys[code] & DOWN != 0)
                .collect();
            f.debug_struct("KeyboardSnapshot")
                .field("down", &down)
                .finish()
        }
    }

    pub struct State {
        current: KeyboardSnapshot,
        previous: KeyboardSnapshot,
    }

    impl State {
        #[must_use]
        pub fn new() -> Self {
            Self {
                current: KeyboardSnapshot::new(),
                previous: KeyboardSnapshot::new(),
            }
        }

        #[must_use]
        pub fn current(&self) -> &KeyboardSnapshot {
            &self.current
        }

        #[must_use]
        pub fn is_key_down(&self, key: Key) -> bool {
            self.current.is_key_down(key)
        }

        #[must_use]
        pub fn was_key_down(&self, key: Key) -> bool {
            self.previous.is_key_down(key)
        }

        #[must_use]
        pub fn is_key_up(&self, key: Key) -> bool {
            !self.current.is_key_down(key)
        }

        pub(crate) fn on_snapshot(&mut self, snapshot: KeyboardSnapshot) {
            trace!("Keys: {snapshot:?}");
            self.previous = self.current;
            self.current = snapshot;
        }

        pub(crate) fn clear(&mut self) {
            self.current = KeyboardSnapshot::new();
            self.previous = KeyboardSnapshot::new();
        }
    }

    impl Default for State {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Keyboard scan codes.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    #[repr(u8)]
    pub enum Key {
        Escape = 0x01,
        Num1 = 0x02,
        Num2 = 0x03,
        Num3 = 0x04,
        Num4 = 0x05,
        Num5 = 0x06,
        Num6 = 0x07,
        Num7 = 0x08,
        Num8 = 0x09,
        Num9 = 0x0A,
        Num0 = 0x0B,
        Minus = 0x0C,
        Equals = 0x0D,
        Backspace = 0x0E,
        Tab = 0x0F,
        Q = 0x10,
        W = 0x11,
        E = 0x12,
        R = 0x13,
        T = 0x14,
        Y = 0x15,
        U = 0x16,
        I = 0x17,
        O = 0x18,
        P = 0x19,
        Return = 0x1C,
        LControl = 0x1D,
        A = 0x1E,
        S = 0x1F,
        D = 0x20,
        F = 0x21,
        G = 0x22,
        H = 0x23,
        J = 0x24,
        K = 0x25,
        L = 0x26,
        LShift = 0x2A,
        Z = 0x2C,
        X = 0x2D,
        C = 0x2E,
        V = 0x2F,
        B = 0x30,
        N = 0x31,
        M = 0x32,
        RShift = 0x36,
        LAlt = 0x38,
        Space = 0x39,
        F1 = 0x3B,
        F2 = 0x3C,
        F3 = 0x3D,
        F4 = 0x3E,
        F5 = 0x3F,
        F6 = 0x40,
        F7 = 0x41,
        F8 = 0x42,
        F9 = 0x43,
        F10 = 0x44,
        F11 = 0x57,
        F12 = 0x58,
        RControl = 0x9D,
        RAlt = 0xB8,
        ArrowUp = 0xC8,
        ArrowLeft = 0xCB,
        ArrowRight = 0xCD,
        ArrowDown = 0xD0,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::keyboard::{Key, KeyboardSnapshot};
    use super::mouse::{Button, MouseSnapshot};
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum RawCall {
        CooperativeLevel(InputDevice, bool),
        Acquire(InputDevice),
        Unacquire(InputDevice),
        Release(InputDevice),
    }

    #[derive(Default)]
    struct MockRawInput {
        mouse: VecDeque<Result<Option<MouseSnapshot>>>,
        keyboard: VecDeque<Result<Option<KeyboardSnapshot>>>,
        calls: Vec<RawCall>,
    }

    impl MockRawInput {
        fn with_mouse(snapshots: Vec<MouseSnapshot>) -> Self {
            Self {
                mouse: snapshots.into_iter().map(|s| Ok(Some(s))).collect(),
                ..Self::default()
            }
        }

        fn with_keyboard(snapshots: Vec<KeyboardSnapshot>) -> Self {
            Self {
                keyboard: snapshots.into_iter().map(|s| Ok(Some(s))).collect(),
                ..Self::default()
            }
        }
    }

    impl RawInput for MockRawInput {
        fn cursor_position(&self) -> (i32, i32) {
            (100, 50)
        }

        fn set_cooperative_level(&mut self, device: InputDevice, exclusive: bool) -> Result<()> {
            self.calls.push(RawCall::CooperativeLevel(device, exclusive));
            Ok(())
        }

        fn acquire(&mut self, device: InputDevice) -> Result<()> {
            self.calls.push(RawCall::Acquire(device));
            Ok(())
        }

        fn unacquire(&mut self, device: InputDevice) {
            self.calls.push(RawCall::Unacquire(device));
        }

        fn release(&mut self, device: InputDevice) {
            self.calls.push(RawCall::Release(device));
        }

        fn read_mouse(&mut self) -> Result<Option<MouseSnapshot>> {
            self.mouse.pop_front().unwrap_or(Ok(None))
        }

        fn read_keyboard(&mut self) -> Result<Option<KeyboardSnapshot>> {
            self.keyboard.pop_front().unwrap_or(Ok(None))
        }
    }

    #[derive(Debug, PartialEq, Eq)]
    enum FocusEvent {
        LeftDown(i32, i32),
        LeftUp(i32, i32),
        RightDown(i32, i32),
        RightUp(i32, i32),
        Keys(Vec<u8>, Vec<u8>),
        Released,
    }

    #[derive(Default)]
    struct RecordingFocus {
        events: Vec<FocusEvent>,
        clamp_to: Option<(i32, i32)>,
    }

    impl InputFocus for RecordingFocus {
        fn move_mouse(&mut self, x: &mut i32, y: &mut i32, _z: &mut i32) {
            if let Some((width, height)) = self.clamp_to {
                *x = (*x).clamp(0, width);
                *y = (*y).clamp(0, height);
            }
        }

        fn left_button_down(&mut self, x: i32, y: i32) {
            self.events.push(FocusEvent::LeftDown(x, y));
        }

        fn left_button_up(&mut self, x: i32, y: i32) {
            self.events.push(FocusEvent::LeftUp(x, y));
        }

        fn right_button_down(&mut self, x: i32, y: i32) {
            self.events.push(FocusEvent::RightDown(x, y));
        }

        fn right_button_up(&mut self, x: i32, y: i32) {
            self.events.push(FocusEvent::RightUp(x, y));
        }

        fn handle_keys(&mut self, current: &KeyboardSnapshot, previous: &KeyboardSnapshot) {
            let down = |snapshot: &KeyboardSnapshot| {
                (0..=255u8)
                    .filter(|&code| snapshot.bytes()[code as usize] & 0x80 != 0)
                    .collect()
            };
            self.events
                .push(FocusEvent::Keys(down(current), down(previous)));
        }

        fn release_focus(&mut self) {
            self.events.push(FocusEvent::Released);
        }
    }

    fn update_all(
        input: &mut InputSystem,
        raw: &mut MockRawInput,
        focus: &mut RecordingFocus,
        count: usize,
    ) -> Vec<InputOutcome> {
        (0..count)
            .map(|_| input.update(raw, focus).unwrap())
            .collect()
    }

    #[test]
    fn init_windowed_is_non_exclusive() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput::default();

        input.init(&mut raw, true).unwrap();

        assert_eq!(
            raw.calls,
            vec![
                RawCall::CooperativeLevel(InputDevice::Mouse, false),
                RawCall::CooperativeLevel(InputDevice::Keyboard, false),
                RawCall::Acquire(InputDevice::Mouse),
                RawCall::Acquire(InputDevice::Keyboard),
            ]
        );
        assert_eq!(input.mouse.position(), (100, 50));
    }

    #[test]
    fn init_fullscreen_is_exclusive() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput::default();

        input.init(&mut raw, false).unwrap();

        assert!(raw
            .calls
            .contains(&RawCall::CooperativeLevel(InputDevice::Keyboard, true)));
    }

    #[test]
    fn unclamped_mouse_motion_saturates() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput::with_mouse(vec![
            MouseSnapshot::new(i32::MAX, i32::MIN, i32::MAX),
            MouseSnapshot::new(1, -1, 0),
        ]);
        let mut focus = RecordingFocus::default();
        input.mouse.set_position(i32::MAX - 10, i32::MIN + 10);

        input.update(&mut raw, &mut focus).unwrap();
        assert_eq!(input.mouse.position(), (i32::MAX, i32::MIN));
        assert_eq!(input.mouse.wheel(), i32::MAX);

        input.update(&mut raw, &mut focus).unwrap();
        assert_eq!(input.mouse.position(), (i32::MAX, i32::MIN));
    }

    #[test]
    fn mouse_motion_is_scaled() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput::with_mouse(vec![
            MouseSnapshot::new(3, -2, 1),
            MouseSnapshot::new(1, 1, 0),
        ]);
        let mut focus = RecordingFocus::default();
        input.mouse.set_position(10, 10);

        input.update(&mut raw, &mut focus).unwrap();
        assert_eq!(input.mouse.position(), (16, 6));
        assert_eq!(input.mouse.wheel(), 2);
        assert_eq!(input.mouse.cursor_rect(), (16, 6, 48, 38));

        input.update(&mut raw, &mut focus).unwrap();
        assert_eq!(input.mouse.position(), (18, 8));
        assert_eq!(input.mouse.wheel(), 0);
    }

    #[test]
    fn focus_clamps_the_mouse() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput::with_mouse(vec![MouseSnapshot::new(-50, 500, 0)]);
        let mut focus = RecordingFocus {
            clamp_to: Some((799, 599)),
            ..RecordingFocus::default()
        };

        input.update(&mut raw, &mut focus).unwrap();

        assert_eq!(input.mouse.position(), (0, 599));
    }

    #[test]
    fn button_edges_are_reported_once() {
        let mut input = InputSystem::new();
        let down = MouseSnapshot::new(0, 0, 0).with_button_down(Button::Left);
        let up = MouseSnapshot::new(0, 0, 0);
        let mut raw = MockRawInput::with_mouse(vec![down, down, down, up, up, down]);
        let mut focus = RecordingFocus::default();
        input.mouse.set_position(5, 7);

        update_all(&mut input, &mut raw, &mut focus, 6);

        assert_eq!(
            focus.events,
            vec![
                FocusEvent::LeftDown(5, 7),
                FocusEvent::LeftUp(5, 7),
                FocusEvent::LeftDown(5, 7),
            ]
        );
    }

    #[test]
    fn edges_carry_the_updated_position() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput::with_mouse(vec![
            MouseSnapshot::new(10, 5, 0).with_button_down(Button::Right),
            MouseSnapshot::new(-1, 0, 0),
        ]);
        let mut focus = RecordingFocus::default();

        update_all(&mut input, &mut raw, &mut focus, 2);

        assert_eq!(
            focus.events,
            vec![FocusEvent::RightDown(20, 10), FocusEvent::RightUp(18, 10)]
        );
    }

    #[test]
    fn middle_button_is_not_reported() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput::with_mouse(vec![
            MouseSnapshot::new(0, 0, 0).with_button_down(Button::Middle),
            MouseSnapshot::new(0, 0, 0),
        ]);
        let mut focus = RecordingFocus::default();

        update_all(&mut input, &mut raw, &mut focus, 2);

        assert!(focus.events.is_empty());
    }

    #[test]
    fn clear_states_forgets_held_buttons() {
        let mut input = InputSystem::new();
        let held = MouseSnapshot::new(0, 0, 0).with_button_down(Button::Left);
        let mut raw = MockRawInput::with_mouse(vec![held, held]);
        let mut focus = RecordingFocus::default();

        input.update(&mut raw, &mut focus).unwrap();
        input.clear_states();
        input.update(&mut raw, &mut focus).unwrap();

        assert_eq!(
            focus.events,
            vec![FocusEvent::LeftDown(0, 0), FocusEvent::LeftDown(0, 0)]
        );
    }

    #[test]
    fn keys_are_forwarded_with_the_previous_snapshot() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput::with_keyboard(vec![
            KeyboardSnapshot::with_keys_down(&[Key::A]),
            KeyboardSnapshot::with_keys_down(&[Key::A, Key::Space]),
        ]);
        let mut focus = RecordingFocus::default();

        update_all(&mut input, &mut raw, &mut focus, 2);

        assert_eq!(
            focus.events,
            vec![
                FocusEvent::Keys(vec![Key::A as u8], vec![]),
                FocusEvent::Keys(vec![Key::A as u8, Key::Space as u8], vec![Key::A as u8]),
            ]
        );
        assert!(input.keyboard.is_key_down(Key::Space));
        assert!(input.keyboard.was_key_down(Key::A));
        assert!(!input.keyboard.was_key_down(Key::Space));
        assert!(input.keyboard.is_key_up(Key::Escape));
    }

    #[test]
    fn escape_control_shift_releases_focus() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput::with_keyboard(vec![KeyboardSnapshot::with_keys_down(&[
            Key::Escape,
            Key::RControl,
            Key::LShift,
        ])]);
        let mut focus = RecordingFocus::default();

        let outcome = input.update(&mut raw, &mut focus).unwrap();

        assert_eq!(outcome, InputOutcome::FocusReleased);
        assert_eq!(focus.events.last(), Some(&FocusEvent::Released));
    }

    #[test]
    fn escape_control_requests_exit() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput::with_keyboard(vec![KeyboardSnapshot::with_keys_down(&[
            Key::Escape,
            Key::LControl,
        ])]);
        let mut focus = RecordingFocus::default();

        let outcome = input.update(&mut raw, &mut focus).unwrap();

        assert_eq!(outcome, InputOutcome::ExitRequested);
        assert!(!focus.events.contains(&FocusEvent::Released));
    }

    #[test]
    fn escape_alone_continues() {
        let mut input = InputSystem::new();
        let mut raw =
            MockRawInput::with_keyboard(vec![KeyboardSnapshot::with_keys_down(&[Key::Escape])]);
        let mut focus = RecordingFocus::default();

        let outcome = input.update(&mut raw, &mut focus).unwrap();

        assert_eq!(outcome, InputOutcome::Continue);
    }

    #[test]
    fn lost_devices_are_acquired_again() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput {
            mouse: VecDeque::from([Err(RawInputError::InputLost)]),
            keyboard: VecDeque::from([Err(RawInputError::InputLost)]),
            ..MockRawInput::default()
        };
        let mut focus = RecordingFocus::default();

        let outcome = input.update(&mut raw, &mut focus).unwrap();

        assert_eq!(outcome, InputOutcome::Continue);
        assert_eq!(
            raw.calls,
            vec![
                RawCall::Acquire(InputDevice::Mouse),
                RawCall::Acquire(InputDevice::Keyboard)
            ]
        );
        assert!(focus.events.is_empty());
    }

    #[test]
    fn other_device_errors_are_returned() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput {
            mouse: VecDeque::from([Err(RawInputError::Driver("unplugged".to_string()))]),
            ..MockRawInput::default()
        };
        let mut focus = RecordingFocus::default();

        let result = input.update(&mut raw, &mut focus);

        assert_eq!(
            result,
            Err(RawInputError::Driver("unplugged".to_string()))
        );
    }

    #[test]
    fn shutdown_releases_acquired_devices_once() {
        let mut input = InputSystem::new();
        let mut raw = MockRawInput::default();
        input.init(&mut raw, true).unwrap();
        raw.calls.clear();

        input.shutdown(&mut raw);
        input.shutdown(&mut raw);

        assert_eq!(
            raw.calls,
            vec![
                RawCall::Unacquire(InputDevice::Mouse),
                RawCall::Release(InputDevice::Mouse),
                RawCall::Unacquire(InputDevice::Keyboard),
                RawCall::Release(InputDevice::Keyboard),
            ]
        );
    }

    #[test]
    fn snapshot_press_and_release() {
        let mut snapshot = KeyboardSnapshot::new();

        snapshot.press(Key::F1);
        assert!(snapshot.is_key_down(Key::F1));
        assert_eq!(snapshot.bytes()[0x3B], 0x80);

        snapshot.release(Key::F1);
        assert!(!snapshot.is_key_down(Key::F1));
    }

    #[test]
    fn only_the_high_bit_means_down() {
        let mut bytes = [0u8; 256];
        bytes[Key::Escape as usize] = 0x7F;
        bytes[Key::Return as usize] = 0x81;

        let snapshot = KeyboardSnapshot::from_bytes(bytes);

        assert!(!snapshot.is_key_down(Key::Escape));
        assert!(snapshot.is_key_down(Key::Return));
    }
}
