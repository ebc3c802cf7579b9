//! Event vocabulary: event types, key values and counted modifier state

use std::fmt;

/// The discriminated type of an event.
///
/// Numeric values are stable: they are stored in keyconfig preferences and
/// compared in range predicates (`is_keyboard`, `is_timer`, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum EventType {
    #[default]
    None = 0x0000,

    // Mouse buttons
    LeftMouse = 0x0001,
    MiddleMouse = 0x0002,
    RightMouse = 0x0003,
    MouseMove = 0x0004,
    Button4Mouse = 0x0007,
    Button5Mouse = 0x0008,
    WheelUpMouse = 0x000a,
    WheelDownMouse = 0x000b,
    WheelInMouse = 0x000c,
    WheelOutMouse = 0x000d,
    MousePan = 0x000e,
    MouseZoom = 0x000f,
    MouseRotate = 0x0010,
    InbetweenMouseMove = 0x0011,
    Button6Mouse = 0x0012,
    Button7Mouse = 0x0013,
    ImeCompositeStart = 0x0014,
    ImeCompositeEvent = 0x0015,
    ImeCompositeEnd = 0x0016,
    MouseSmartZoom = 0x0017,
    TabletStylus = 0x001a,
    TabletEraser = 0x001b,

    // Digits
    Zero = 0x0030,
    One = 0x0031,
    Two = 0x0032,
    Three = 0x0033,
    Four = 0x0034,
    Five = 0x0035,
    Six = 0x0036,
    Seven = 0x0037,
    Eight = 0x0038,
    Nine = 0x0039,

    // Letters
    A = 0x0061,
    B = 0x0062,
    C = 0x0063,
    D = 0x0064,
    E = 0x0065,
    F = 0x0066,
    G = 0x0067,
    H = 0x0068,
    I = 0x0069,
    J = 0x006a,
    K = 0x006b,
    L = 0x006c,
    M = 0x006d,
    N = 0x006e,
    O = 0x006f,
    P = 0x0070,
    Q = 0x0071,
    R = 0x0072,
    S = 0x0073,
    T = 0x0074,
    U = 0x0075,
    V = 0x0076,
    W = 0x0077,
    X = 0x0078,
    Y = 0x0079,
    Z = 0x007a,

    // Arrows
    LeftArrow = 0x0089,
    DownArrow = 0x008a,
    RightArrow = 0x008b,
    UpArrow = 0x008c,

    // Numpad
    Pad0 = 0x0096,
    Pad1 = 0x0097,
    Pad2 = 0x0098,
    Pad3 = 0x0099,
    Pad4 = 0x009a,
    Pad5 = 0x009b,
    Pad6 = 0x009c,
    Pad7 = 0x009d,
    Pad8 = 0x009e,
    Pad9 = 0x009f,
    PadAsterisk = 0x00a0,
    PadSlash = 0x00a1,
    PadMinus = 0x00a2,
    PadEnter = 0x00a3,
    PadPlus = 0x00a4,

    // Navigation and misc
    Pause = 0x00a5,
    Insert = 0x00a6,
    Home = 0x00a7,
    PageUp = 0x00a8,
    PageDown = 0x00a9,
    End = 0x00aa,
    UnknownKey = 0x00ab,
    OsKey = 0x00ac,
    GrLess = 0x00ad,
    MediaPlay = 0x00ae,
    MediaStop = 0x00af,
    MediaFirst = 0x00b0,
    MediaLast = 0x00b1,
    AppKey = 0x00b2,
    PadPeriod = 0x00c7,
    CapsLock = 0x00d3,

    // Modifier keys
    LeftCtrl = 0x00d4,
    LeftAlt = 0x00d5,
    RightAlt = 0x00d6,
    RightCtrl = 0x00d7,
    RightShift = 0x00d8,
    LeftShift = 0x00d9,

    // Named keys
    Esc = 0x00da,
    Tab = 0x00db,
    Return = 0x00dc,
    Space = 0x00dd,
    LineFeed = 0x00de,
    Backspace = 0x00df,
    Delete = 0x00e0,
    Semicolon = 0x00e1,
    Period = 0x00e2,
    Comma = 0x00e3,
    Quote = 0x00e4,
    AccentGrave = 0x00e5,
    Minus = 0x00e6,
    Plus = 0x00e7,
    Slash = 0x00e8,
    Backslash = 0x00e9,
    Equal = 0x00ea,
    LeftBracket = 0x00eb,
    RightBracket = 0x00ec,

    // Function keys
    F1 = 0x012c,
    F2 = 0x012d,
    F3 = 0x012e,
    F4 = 0x012f,
    F5 = 0x0130,
    F6 = 0x0131,
    F7 = 0x0132,
    F8 = 0x0133,
    F9 = 0x0134,
    F10 = 0x0135,
    F11 = 0x0136,
    F12 = 0x0137,
    F13 = 0x0138,
    F14 = 0x0139,
    F15 = 0x013a,
    F16 = 0x013b,
    F17 = 0x013c,
    F18 = 0x013d,
    F19 = 0x013e,
    F20 = 0x013f,
    F21 = 0x0140,
    F22 = 0x0141,
    F23 = 0x0142,
    F24 = 0x0143,

    // System
    WindowDeactivate = 0x0104,
    Timer = 0x0110,
    Timer0 = 0x0111,
    Timer1 = 0x0112,
    Timer2 = 0x0113,
    TimerJobs = 0x0114,
    TimerAutosave = 0x0115,
    TimerReport = 0x0116,
    TimerRegion = 0x0117,
    TimerNotifier = 0x0118,

    // 3D mouse
    NdofMotion = 0x0190,
    NdofButtonMenu = 0x0191,
    NdofButtonFit = 0x0192,
    NdofButtonTop = 0x0193,
    NdofButtonBottom = 0x0194,
    NdofButtonLeft = 0x0195,
    NdofButtonRight = 0x0196,
    NdofButtonFront = 0x0197,
    NdofButtonBack = 0x0198,
    NdofButtonEsc = 0x01a6,
    NdofButtonAlt = 0x01a7,
    NdofButtonShift = 0x01a8,
    NdofButtonCtrl = 0x01a9,
    NdofButtonC = 0x01b6,

    // Internal events, never produced by the platform layer
    ActionZoneArea = 0x5000,
    ActionZoneRegion = 0x5001,
    ActionZoneFullscreen = 0x5011,
    FileSelect = 0x5020,
    ButOpen = 0x5021,
    ModalMap = 0x5022,
    Drop = 0x5023,
    ButCancel = 0x5024,
    GizmoUpdate = 0x5025,
    XrAction = 0x5030,
}

/// Last timer slot; timer types occupy `Timer..=TIMER_LAST`.
const TIMER_LAST: u16 = 0x011f;

/// Identifier, display name and compact description of one event type.
#[derive(Debug, Clone, Copy)]
pub struct EventTypeItem {
    pub event_type: EventType,
    /// Stable identifier used in keyconfig files (e.g. `"LEFTMOUSE"`).
    pub id: &'static str,
    /// Human readable name. Empty for internal events that never show in UI.
    pub name: &'static str,
    /// Short form used by compact rendering; empty means "use the name".
    pub short: &'static str,
}

const fn item(
    event_type: EventType,
    id: &'static str,
    name: &'static str,
    short: &'static str,
) -> EventTypeItem {
    EventTypeItem {
        event_type,
        id,
        name,
        short,
    }
}

/// Every named event type, in code order.
pub const EVENT_TYPE_ITEMS: &[EventTypeItem] = &[
    item(EventType::None, "NONE", "", ""),
    item(EventType::LeftMouse, "LEFTMOUSE", "Left Mouse", "LMB"),
    item(EventType::MiddleMouse, "MIDDLEMOUSE", "Middle Mouse", "MMB"),
    item(EventType::RightMouse, "RIGHTMOUSE", "Right Mouse", "RMB"),
    item(EventType::MouseMove, "MOUSEMOVE", "Mouse Move", "MsMov"),
    item(EventType::Button4Mouse, "BUTTON4MOUSE", "Button4 Mouse", "MB4"),
    item(EventType::Button5Mouse, "BUTTON5MOUSE", "Button5 Mouse", "MB5"),
    item(EventType::WheelUpMouse, "WHEELUPMOUSE", "Wheel Up", "WhUp"),
    item(EventType::WheelDownMouse, "WHEELDOWNMOUSE", "Wheel Down", "WhDown"),
    item(EventType::WheelInMouse, "WHEELINMOUSE", "Wheel In", "WhIn"),
    item(EventType::WheelOutMouse, "WHEELOUTMOUSE", "Wheel Out", "WhOut"),
    item(EventType::MousePan, "TRACKPADPAN", "Mouse/Trackpad Pan", "MsPan"),
    item(EventType::MouseZoom, "TRACKPADZOOM", "Mouse/Trackpad Zoom", "MsZoom"),
    item(EventType::MouseRotate, "MOUSEROTATE", "Mouse/Trackpad Rotate", "MsRot"),
    item(EventType::InbetweenMouseMove, "INBETWEEN_MOUSEMOVE", "In-between Move", "MsSubMov"),
    item(EventType::Button6Mouse, "BUTTON6MOUSE", "Button6 Mouse", "MB6"),
    item(EventType::Button7Mouse, "BUTTON7MOUSE", "Button7 Mouse", "MB7"),
    item(EventType::ImeCompositeStart, "IME_COMPOSITE_START", "", ""),
    item(EventType::ImeCompositeEvent, "IME_COMPOSITE_EVENT", "", ""),
    item(EventType::ImeCompositeEnd, "IME_COMPOSITE_END", "", ""),
    item(EventType::MouseSmartZoom, "MOUSESMARTZOOM", "Mouse/Trackpad Smart Zoom", "MsSmartZoom"),
    item(EventType::TabletStylus, "PEN", "Pen", ""),
    item(EventType::TabletEraser, "ERASER", "Eraser", ""),
    item(EventType::Zero, "ZERO", "0", ""),
    item(EventType::One, "ONE", "1", ""),
    item(EventType::Two, "TWO", "2", ""),
    item(EventType::Three, "THREE", "3", ""),
    item(EventType::Four, "FOUR", "4", ""),
    item(EventType::Five, "FIVE", "5", ""),
    item(EventType::Six, "SIX", "6", ""),
    item(EventType::Seven, "SEVEN", "7", ""),
    item(EventType::Eight, "EIGHT", "8", ""),
    item(EventType::Nine, "NINE", "9", ""),
    item(EventType::A, "A", "A", ""),
    item(EventType::B, "B", "B", ""),
    item(EventType::C, "C", "C", ""),
    item(EventType::D, "D", "D", ""),
    item(EventType::E, "E", "E", ""),
    item(EventType::F, "F", "F", ""),
    item(EventType::G, "G", "G", ""),
    item(EventType::H, "H", "H", ""),
    item(EventType::I, "I", "I", ""),
    item(EventType::J, "J", "J", ""),
    item(EventType::K, "K", "K", ""),
    item(EventType::L, "L", "L", ""),
    item(EventType::M, "M", "M", ""),
    item(EventType::N, "N", "N", ""),
    item(EventType::O, "O", "O", ""),
    item(EventType::P, "P", "P", ""),
    item(EventType::Q, "Q", "Q", ""),
    item(EventType::R, "R", "R", ""),
    item(EventType::S, "S", "S", ""),
    item(EventType::T, "T", "T", ""),
    item(EventType::U, "U", "U", ""),
    item(EventType::V, "V", "V", ""),
    item(EventType::W, "W", "W", ""),
    item(EventType::X, "X", "X", ""),
    item(EventType::Y, "Y", "Y", ""),
    item(EventType::Z, "Z", "Z", ""),
    item(EventType::LeftArrow, "LEFT_ARROW", "Left Arrow", "\u{2190}"),
    item(EventType::DownArrow, "DOWN_ARROW", "Down Arrow", "\u{2193}"),
    item(EventType::RightArrow, "RIGHT_ARROW", "Right Arrow", "\u{2192}"),
    item(EventType::UpArrow, "UP_ARROW", "Up Arrow", "\u{2191}"),
    item(EventType::Pad0, "NUMPAD_0", "Numpad 0", "Pad0"),
    item(EventType::Pad1, "NUMPAD_1", "Numpad 1", "Pad1"),
    item(EventType::Pad2, "NUMPAD_2", "Numpad 2", "Pad2"),
    item(EventType::Pad3, "NUMPAD_3", "Numpad 3", "Pad3"),
    item(EventType::Pad4, "NUMPAD_4", "Numpad 4", "Pad4"),
    item(EventType::Pad5, "NUMPAD_5", "Numpad 5", "Pad5"),
    item(EventType::Pad6, "NUMPAD_6", "Numpad 6", "Pad6"),
    item(EventType::Pad7, "NUMPAD_7", "Numpad 7", "Pad7"),
    item(EventType::Pad8, "NUMPAD_8", "Numpad 8", "Pad8"),
    item(EventType::Pad9, "NUMPAD_9", "Numpad 9", "Pad9"),
    item(EventType::PadAsterisk, "NUMPAD_ASTERIX", "Numpad *", "Pad*"),
    item(EventType::PadSlash, "NUMPAD_SLASH", "Numpad /", "Pad/"),
    item(EventType::PadMinus, "NUMPAD_MINUS", "Numpad -", "Pad-"),
    item(EventType::PadEnter, "NUMPAD_ENTER", "Numpad Enter", "PadEnter"),
    item(EventType::PadPlus, "NUMPAD_PLUS", "Numpad +", "Pad+"),
    item(EventType::Pause, "PAUSE", "Pause", ""),
    item(EventType::Insert, "INSERT", "Insert", "Ins"),
    item(EventType::Home, "HOME", "Home", ""),
    item(EventType::PageUp, "PAGE_UP", "Page Up", "PgUp"),
    item(EventType::PageDown, "PAGE_DOWN", "Page Down", "PgDown"),
    item(EventType::End, "END", "End", ""),
    item(EventType::UnknownKey, "UNKNOWN", "", ""),
    item(EventType::OsKey, "OSKEY", "OS Key", "Cmd"),
    item(EventType::GrLess, "GRLESS", "Grless", ""),
    item(EventType::MediaPlay, "MEDIA_PLAY", "Media Play/Pause", ">/||"),
    item(EventType::MediaStop, "MEDIA_STOP", "Media Stop", "Stop"),
    item(EventType::MediaFirst, "MEDIA_FIRST", "Media First", "|<<"),
    item(EventType::MediaLast, "MEDIA_LAST", "Media Last", ">>|"),
    item(EventType::AppKey, "APP", "Application", "App"),
    item(EventType::PadPeriod, "NUMPAD_PERIOD", "Numpad .", "Pad."),
    item(EventType::CapsLock, "CAPSLOCK", "Caps Lock", ""),
    item(EventType::LeftCtrl, "LEFT_CTRL", "Left Ctrl", "CtrlL"),
    item(EventType::LeftAlt, "LEFT_ALT", "Left Alt", "AltL"),
    item(EventType::RightAlt, "RIGHT_ALT", "Right Alt", "AltR"),
    item(EventType::RightCtrl, "RIGHT_CTRL", "Right Ctrl", "CtrlR"),
    item(EventType::RightShift, "RIGHT_SHIFT", "Right Shift", "ShiftR"),
    item(EventType::LeftShift, "LEFT_SHIFT", "Left Shift", "ShiftL"),
    item(EventType::Esc, "ESC", "Esc", ""),
    item(EventType::Tab, "TAB", "Tab", ""),
    item(EventType::Return, "RET", "Return", "Enter"),
    item(EventType::Space, "SPACE", "Spacebar", "Space"),
    item(EventType::LineFeed, "LINE_FEED", "Line Feed", ""),
    item(EventType::Backspace, "BACK_SPACE", "Backspace", "BkSpace"),
    item(EventType::Delete, "DEL", "Delete", "Del"),
    item(EventType::Semicolon, "SEMI_COLON", ";", ""),
    item(EventType::Period, "PERIOD", ".", ""),
    item(EventType::Comma, "COMMA", ",", ""),
    item(EventType::Quote, "QUOTE", "\"", ""),
    item(EventType::AccentGrave, "ACCENT_GRAVE", "`", ""),
    item(EventType::Minus, "MINUS", "-", ""),
    item(EventType::Plus, "PLUS", "+", ""),
    item(EventType::Slash, "SLASH", "/", ""),
    item(EventType::Backslash, "BACK_SLASH", "\\", ""),
    item(EventType::Equal, "EQUAL", "=", ""),
    item(EventType::LeftBracket, "LEFT_BRACKET", "[", ""),
    item(EventType::RightBracket, "RIGHT_BRACKET", "]", ""),
    item(EventType::F1, "F1", "F1", ""),
    item(EventType::F2, "F2", "F2", ""),
    item(EventType::F3, "F3", "F3", ""),
    item(EventType::F4, "F4", "F4", ""),
    item(EventType::F5, "F5", "F5", ""),
    item(EventType::F6, "F6", "F6", ""),
    item(EventType::F7, "F7", "F7", ""),
    item(EventType::F8, "F8", "F8", ""),
    item(EventType::F9, "F9", "F9", ""),
    item(EventType::F10, "F10", "F10", ""),
    item(EventType::F11, "F11", "F11", ""),
    item(EventType::F12, "F12", "F12", ""),
    item(EventType::F13, "F13", "F13", ""),
    item(EventType::F14, "F14", "F14", ""),
    item(EventType::F15, "F15", "F15", ""),
    item(EventType::F16, "F16", "F16", ""),
    item(EventType::F17, "F17", "F17", ""),
    item(EventType::F18, "F18", "F18", ""),
    item(EventType::F19, "F19", "F19", ""),
    item(EventType::F20, "F20", "F20", ""),
    item(EventType::F21, "F21", "F21", ""),
    item(EventType::F22, "F22", "F22", ""),
    item(EventType::F23, "F23", "F23", ""),
    item(EventType::F24, "F24", "F24", ""),
    item(EventType::WindowDeactivate, "WINDOW_DEACTIVATE", "Window Deactivate", ""),
    item(EventType::Timer, "TIMER", "Timer", "Tmr"),
    item(EventType::Timer0, "TIMER0", "Timer 0", "Tmr0"),
    item(EventType::Timer1, "TIMER1", "Timer 1", "Tmr1"),
    item(EventType::Timer2, "TIMER2", "Timer 2", "Tmr2"),
    item(EventType::TimerJobs, "TIMER_JOBS", "Timer Jobs", "TmrJob"),
    item(EventType::TimerAutosave, "TIMER_AUTOSAVE", "Timer Autosave", "TmrSave"),
    item(EventType::TimerReport, "TIMER_REPORT", "Timer Report", "TmrReport"),
    item(EventType::TimerRegion, "TIMERREGION", "Timer Region", "TmrReg"),
    item(EventType::TimerNotifier, "TIMER_NOTIFIER", "", ""),
    item(EventType::NdofMotion, "NDOF_MOTION", "NDOF Motion", "NdofMov"),
    item(EventType::NdofButtonMenu, "NDOF_BUTTON_MENU", "NDOF Menu", "NdofMenu"),
    item(EventType::NdofButtonFit, "NDOF_BUTTON_FIT", "NDOF Fit", "NdofFit"),
    item(EventType::NdofButtonTop, "NDOF_BUTTON_TOP", "NDOF Top", "Ndof\u{2191}"),
    item(EventType::NdofButtonBottom, "NDOF_BUTTON_BOTTOM", "NDOF Bottom", "Ndof\u{2193}"),
    item(EventType::NdofButtonLeft, "NDOF_BUTTON_LEFT", "NDOF Left", "Ndof\u{2190}"),
    item(EventType::NdofButtonRight, "NDOF_BUTTON_RIGHT", "NDOF Right", "Ndof\u{2192}"),
    item(EventType::NdofButtonFront, "NDOF_BUTTON_FRONT", "NDOF Front", "NdofFront"),
    item(EventType::NdofButtonBack, "NDOF_BUTTON_BACK", "NDOF Back", "NdofBack"),
    item(EventType::NdofButtonEsc, "NDOF_BUTTON_ESC", "NDOF Esc", "NdofEsc"),
    item(EventType::NdofButtonAlt, "NDOF_BUTTON_ALT", "NDOF Alt", "NdofAlt"),
    item(EventType::NdofButtonShift, "NDOF_BUTTON_SHIFT", "NDOF Shift", "NdofShift"),
    item(EventType::NdofButtonCtrl, "NDOF_BUTTON_CTRL", "NDOF Ctrl", "NdofCtrl"),
    item(EventType::NdofButtonC, "NDOF_BUTTON_C", "NDOF Button C", "NdofBC"),
    item(EventType::ActionZoneArea, "ACTIONZONE_AREA", "ActionZone Area", "AZone Area"),
    item(EventType::ActionZoneRegion, "ACTIONZONE_REGION", "ActionZone Region", "AZone Region"),
    item(
        EventType::ActionZoneFullscreen,
        "ACTIONZONE_FULLSCREEN",
        "ActionZone Fullscreen",
        "AZone FullScr",
    ),
    item(EventType::FileSelect, "FILESELECT", "", ""),
    item(EventType::ButOpen, "BUT_OPEN", "", ""),
    item(EventType::ModalMap, "MODAL_MAP", "", ""),
    item(EventType::Drop, "DROP", "", ""),
    item(EventType::ButCancel, "BUT_CANCEL", "", ""),
    item(EventType::GizmoUpdate, "GIZMO_UPDATE", "", ""),
    item(EventType::XrAction, "XR_ACTION", "XR Action", ""),
];

impl EventType {
    /// Numeric code of this event type.
    #[inline]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Look up the table entry for this type.
    pub fn item(self) -> Option<&'static EventTypeItem> {
        EVENT_TYPE_ITEMS.iter().find(|it| it.event_type == self)
    }

    /// Resolve an event type from its numeric code.
    pub fn from_code(code: u16) -> Option<EventType> {
        EVENT_TYPE_ITEMS
            .iter()
            .find(|it| it.event_type.code() == code)
            .map(|it| it.event_type)
    }

    /// Resolve an event type from its stable identifier (case-insensitive).
    pub fn from_id(id: &str) -> Option<EventType> {
        EVENT_TYPE_ITEMS
            .iter()
            .find(|it| it.id.eq_ignore_ascii_case(id))
            .map(|it| it.event_type)
    }

    /// Stable identifier, e.g. `"LEFTMOUSE"`.
    pub fn id(self) -> &'static str {
        self.item().map(|it| it.id).unwrap_or("")
    }

    /// Display name, empty for internal events.
    pub fn name(self) -> &'static str {
        self.item().map(|it| it.name).unwrap_or("")
    }

    /// Letter key for an ASCII letter or digit.
    pub fn from_char(c: char) -> Option<EventType> {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            EventType::from_code(c as u16)
        } else {
            match c {
                ';' => Some(EventType::Semicolon),
                '.' => Some(EventType::Period),
                ',' => Some(EventType::Comma),
                '\'' | '"' => Some(EventType::Quote),
                '`' => Some(EventType::AccentGrave),
                '-' => Some(EventType::Minus),
                '+' => Some(EventType::Plus),
                '/' => Some(EventType::Slash),
                '\\' => Some(EventType::Backslash),
                '=' => Some(EventType::Equal),
                '[' => Some(EventType::LeftBracket),
                ']' => Some(EventType::RightBracket),
                ' ' => Some(EventType::Space),
                _ => None,
            }
        }
    }

    /// Any mouse input: buttons, wheel, motion and trackpad gestures.
    #[inline]
    pub fn is_mouse(self) -> bool {
        (EventType::LeftMouse.code()..=EventType::Button7Mouse.code()).contains(&self.code())
    }

    #[inline]
    pub fn is_mouse_motion(self) -> bool {
        matches!(self, EventType::MouseMove | EventType::InbetweenMouseMove)
    }

    #[inline]
    pub fn is_mouse_button(self) -> bool {
        matches!(
            self,
            EventType::LeftMouse
                | EventType::MiddleMouse
                | EventType::RightMouse
                | EventType::Button4Mouse
                | EventType::Button5Mouse
                | EventType::Button6Mouse
                | EventType::Button7Mouse
        )
    }

    #[inline]
    pub fn is_mouse_wheel(self) -> bool {
        (EventType::WheelUpMouse.code()..=EventType::WheelOutMouse.code()).contains(&self.code())
    }

    #[inline]
    pub fn is_mouse_gesture(self) -> bool {
        matches!(
            self,
            EventType::MousePan
                | EventType::MouseZoom
                | EventType::MouseRotate
                | EventType::MouseSmartZoom
        )
    }

    /// Keyboard keys: digits, letters, the navigation/modifier block and F-keys.
    pub fn is_keyboard(self) -> bool {
        let code = self.code();
        (EventType::Zero.code()..=EventType::Nine.code()).contains(&code)
            || (EventType::A.code()..=EventType::Z.code()).contains(&code)
            || (EventType::LeftArrow.code()..=EventType::RightBracket.code()).contains(&code)
            || (EventType::F1.code()..=EventType::F24.code()).contains(&code)
    }

    #[inline]
    pub fn is_key_modifier(self) -> bool {
        matches!(
            self,
            EventType::LeftCtrl
                | EventType::RightCtrl
                | EventType::LeftAlt
                | EventType::RightAlt
                | EventType::LeftShift
                | EventType::RightShift
                | EventType::OsKey
        )
    }

    #[inline]
    pub fn is_timer(self) -> bool {
        (EventType::Timer.code()..=TIMER_LAST).contains(&self.code())
    }

    #[inline]
    pub fn is_ndof(self) -> bool {
        (EventType::NdofMotion.code()..=EventType::NdofButtonC.code()).contains(&self.code())
    }

    #[inline]
    pub fn is_action_zone(self) -> bool {
        matches!(
            self,
            EventType::ActionZoneArea
                | EventType::ActionZoneRegion
                | EventType::ActionZoneFullscreen
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The value of an event (`KM_*`), or the value a keymap item requires.
///
/// `Any` only appears on keymap items; events never carry it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum KeyValue {
    Any = -1,
    #[default]
    Nothing = 0,
    Press = 1,
    Release = 2,
    Click = 3,
    DblClick = 4,
    ClickDrag = 5,
}

impl KeyValue {
    pub fn from_id(id: &str) -> Option<KeyValue> {
        match id.to_ascii_lowercase().as_str() {
            "any" => Some(KeyValue::Any),
            "nothing" => Some(KeyValue::Nothing),
            "press" => Some(KeyValue::Press),
            "release" => Some(KeyValue::Release),
            "click" => Some(KeyValue::Click),
            "double_click" | "dbl_click" => Some(KeyValue::DblClick),
            "click_drag" => Some(KeyValue::ClickDrag),
            _ => None,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            KeyValue::Any => "ANY",
            KeyValue::Nothing => "NOTHING",
            KeyValue::Press => "PRESS",
            KeyValue::Release => "RELEASE",
            KeyValue::Click => "CLICK",
            KeyValue::DblClick => "DOUBLE_CLICK",
            KeyValue::ClickDrag => "CLICK_DRAG",
        }
    }
}

/// Counted modifier state.
///
/// On events: `0` released, `FIRST` pressed alone, `FIRST | SECOND` pressed
/// while another modifier was already held. On keymap items the same values
/// are requirements, plus `ANY` as a wildcard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ModState(i8);

impl ModState {
    pub const ANY: ModState = ModState(-1);
    pub const NOTHING: ModState = ModState(0);
    pub const FIRST: ModState = ModState(1);
    pub const SECOND: ModState = ModState(2);
    pub const BOTH: ModState = ModState(3);
    /// Alias used by keymap items that just require the modifier held.
    pub const HELD: ModState = ModState::FIRST;

    pub const fn from_raw(raw: i8) -> Self {
        ModState(raw)
    }

    pub const fn raw(self) -> i8 {
        self.0
    }

    /// True for any non-zero value, including the `ANY` wildcard.
    #[inline]
    pub const fn is_set(self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub const fn is_any(self) -> bool {
        self.0 == ModState::ANY.0
    }

    /// Whether an event's modifier state satisfies this requirement.
    ///
    /// Bits are compared rather than values so that the press order of
    /// several held modifiers does not matter.
    #[inline]
    pub const fn accepts(self, event: ModState) -> bool {
        self.is_any() || event.0 == self.0 || (event.0 & self.0) != 0
    }

    pub const fn from_held(held: bool) -> Self {
        if held {
            ModState::HELD
        } else {
            ModState::NOTHING
        }
    }
}

/// The four counted modifiers of an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct EventModifiers {
    pub shift: ModState,
    pub ctrl: ModState,
    pub alt: ModState,
    pub oskey: ModState,
}

impl EventModifiers {
    pub const NONE: EventModifiers = EventModifiers {
        shift: ModState::NOTHING,
        ctrl: ModState::NOTHING,
        alt: ModState::NOTHING,
        oskey: ModState::NOTHING,
    };

    #[inline]
    pub fn any_held(&self) -> bool {
        self.shift.is_set() || self.ctrl.is_set() || self.alt.is_set() || self.oskey.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(EventType::LeftMouse.code(), 0x0001);
        assert_eq!(EventType::A.code(), 97);
        assert_eq!(EventType::Esc.code(), 218);
        assert_eq!(EventType::F24.code(), 323);
        assert_eq!(EventType::Drop.code(), 0x5023);
    }

    #[test]
    fn test_lookup_by_id_and_code() {
        assert_eq!(EventType::from_id("leftmouse"), Some(EventType::LeftMouse));
        assert_eq!(EventType::from_id("NUMPAD_PLUS"), Some(EventType::PadPlus));
        assert_eq!(EventType::from_id("nope"), None);
        assert_eq!(EventType::from_code(0x0073), Some(EventType::S));
        assert_eq!(EventType::from_char('Q'), Some(EventType::Q));
        assert_eq!(EventType::from_char('7'), Some(EventType::Seven));
    }

    #[test]
    fn test_every_item_round_trips() {
        for it in EVENT_TYPE_ITEMS {
            assert_eq!(EventType::from_id(it.id), Some(it.event_type), "{}", it.id);
            assert_eq!(EventType::from_code(it.event_type.code()), Some(it.event_type));
        }
    }

    #[test]
    fn test_category_predicates() {
        assert!(EventType::LeftMouse.is_mouse());
        assert!(EventType::LeftMouse.is_mouse_button());
        assert!(EventType::MouseMove.is_mouse_motion());
        assert!(EventType::WheelUpMouse.is_mouse_wheel());
        assert!(!EventType::MouseMove.is_mouse_button());
        assert!(EventType::A.is_keyboard());
        assert!(EventType::LeftShift.is_keyboard());
        assert!(EventType::LeftShift.is_key_modifier());
        assert!(EventType::F12.is_keyboard());
        assert!(!EventType::LeftMouse.is_keyboard());
        assert!(EventType::TimerRegion.is_timer());
        assert!(!EventType::WindowDeactivate.is_timer());
        assert!(EventType::NdofButtonFit.is_ndof());
        assert!(EventType::ActionZoneArea.is_action_zone());
    }

    #[test]
    fn test_mod_state_accepts() {
        // Wildcard accepts everything
        assert!(ModState::ANY.accepts(ModState::NOTHING));
        assert!(ModState::ANY.accepts(ModState::BOTH));
        // "Nothing" only accepts released
        assert!(ModState::NOTHING.accepts(ModState::NOTHING));
        assert!(!ModState::NOTHING.accepts(ModState::FIRST));
        // Held accepts either press order
        assert!(ModState::HELD.accepts(ModState::FIRST));
        assert!(ModState::HELD.accepts(ModState::BOTH));
        assert!(!ModState::HELD.accepts(ModState::NOTHING));
    }
}
