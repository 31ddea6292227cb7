//! Key code table for macOS virtual key codes
//!
//! Maps CGKeyCode values to display names, and names back to codes so
//! remap rules can be written as `e=f` instead of `14=3`.

/// A macOS virtual key code (CGKeyCode)
pub type KeyCode = u16;

pub const KEY_A: KeyCode = 0;
pub const KEY_D: KeyCode = 2;
pub const KEY_F: KeyCode = 3;
pub const KEY_W: KeyCode = 13;
pub const KEY_E: KeyCode = 14;
pub const KEY_R: KeyCode = 15;
pub const KEY_I: KeyCode = 34;

/// Keys whose character is invisible or ambiguous, shown by name instead
const SPECIAL_KEYS: &[(KeyCode, &str)] = &[
    (51, "⌫ Delete"),
    (36, "↩ Return"),
    (48, "⇥ Tab"),
    (49, "Space"),
    (53, "⎋ Escape"),
    (123, "←"),
    (124, "→"),
    (125, "↓"),
    (126, "↑"),
    (116, "Page Up"),
    (121, "Page Down"),
    (115, "Home"),
    (119, "End"),
    (117, "⌦ Delete"),
    (122, "F1"),
    (120, "F2"),
    (99, "F3"),
    (118, "F4"),
    (96, "F5"),
    (97, "F6"),
    (98, "F7"),
    (100, "F8"),
    (101, "F9"),
    (109, "F10"),
    (103, "F11"),
    (111, "F12"),
];

/// Character keys of the ANSI layout
const ANSI_KEYS: &[(KeyCode, &str)] = &[
    (0, "A"),
    (1, "S"),
    (2, "D"),
    (3, "F"),
    (4, "H"),
    (5, "G"),
    (6, "Z"),
    (7, "X"),
    (8, "C"),
    (9, "V"),
    (11, "B"),
    (12, "Q"),
    (13, "W"),
    (14, "E"),
    (15, "R"),
    (16, "Y"),
    (17, "T"),
    (18, "1"),
    (19, "2"),
    (20, "3"),
    (21, "4"),
    (22, "6"),
    (23, "5"),
    (24, "="),
    (25, "9"),
    (26, "7"),
    (27, "-"),
    (28, "8"),
    (29, "0"),
    (30, "]"),
    (31, "O"),
    (32, "U"),
    (33, "["),
    (34, "I"),
    (35, "P"),
    (37, "L"),
    (38, "J"),
    (39, "'"),
    (40, "K"),
    (41, ";"),
    (42, "\\"),
    (43, ","),
    (44, "/"),
    (45, "N"),
    (46, "M"),
    (47, "."),
    (50, "`"),
];

/// Name for keys that are shown by name rather than by character
pub fn special_name(code: KeyCode) -> Option<&'static str> {
    lookup(SPECIAL_KEYS, code)
}

/// Best known name for a key code, special keys first
pub fn key_name(code: KeyCode) -> Option<&'static str> {
    special_name(code).or_else(|| lookup(ANSI_KEYS, code))
}

/// Label used in trace lines: the special name, else the character the
/// event produced, else the layout name, else the raw code.
pub fn display_name(code: KeyCode, character: Option<&str>) -> String {
    if let Some(name) = special_name(code) {
        return name.to_string();
    }
    match character {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => key_name(code)
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{code}")),
    }
}

/// Resolve a key name (case-insensitive) to its code
///
/// Accepts character keys (`e`, `5`, `;`) and the plain part of special
/// key names (`Tab`, `Escape`, `F5`).
pub fn code_for_name(name: &str) -> Option<KeyCode> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    ANSI_KEYS
        .iter()
        .chain(SPECIAL_KEYS)
        .find(|(_, label)| {
            label.eq_ignore_ascii_case(name)
                || label
                    .rsplit(' ')
                    .next()
                    .is_some_and(|word| word.eq_ignore_ascii_case(name))
        })
        .map(|(code, _)| *code)
}

fn lookup(table: &[(KeyCode, &'static str)], code: KeyCode) -> Option<&'static str> {
    table
        .iter()
        .find(|(entry, _)| *entry == code)
        .map(|(_, name)| *name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_special_names() {
        assert_eq!(special_name(36), Some("↩ Return"));
        assert_eq!(special_name(111), Some("F12"));
        assert_eq!(special_name(KEY_E), None);
    }

    #[test]
    fn test_key_name_covers_letters() {
        assert_eq!(key_name(KEY_E), Some("E"));
        assert_eq!(key_name(KEY_F), Some("F"));
        assert_eq!(key_name(KEY_I), Some("I"));
        assert_eq!(key_name(200), None);
    }

    #[test]
    fn test_display_prefers_special_name() {
        assert_eq!(display_name(49, Some(" ")), "Space");
        assert_eq!(display_name(KEY_E, Some("e")), "e");
        assert_eq!(display_name(KEY_E, None), "E");
        assert_eq!(display_name(KEY_E, Some("")), "E");
        assert_eq!(display_name(200, None), "#200");
    }

    #[test]
    fn test_code_for_name() {
        assert_eq!(code_for_name("e"), Some(KEY_E));
        assert_eq!(code_for_name("F"), Some(KEY_F));
        assert_eq!(code_for_name("tab"), Some(48));
        assert_eq!(code_for_name("Escape"), Some(53));
        assert_eq!(code_for_name("f5"), Some(96));
        assert_eq!(code_for_name("nope"), None);
        assert_eq!(code_for_name(""), None);
    }

    #[test]
    fn test_codes_unique() {
        for (i, (code, _)) in ANSI_KEYS.iter().chain(SPECIAL_KEYS).enumerate() {
            let dupes = ANSI_KEYS
                .iter()
                .chain(SPECIAL_KEYS)
                .skip(i + 1)
                .filter(|(other, _)| other == code)
                .count();
            assert_eq!(dupes, 0, "key code {code} listed twice");
        }
    }
}
