//! Keystroke classification for word-boundary detection.

use unicode_general_category::{get_general_category, GeneralCategory};

/// Backspace as delivered by the host.
pub const BACKSPACE: char = '\u{8}';
/// Sent by some applications for control+backspace.
pub const DELETE: char = '\u{7f}';
/// Characters below this are control characters and never echoed.
pub const FIRST_NONCONTROL_CHAR: char = ' ';

/// How a keystroke affects the typed-word buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Letter, mark or number: extends the current word.
    WordConstituent,
    /// Backspace: drops the last buffered character.
    DeleteLast,
    /// Delete: ignored entirely.
    Discard,
    /// Anything else: ends the current word.
    Boundary,
}

pub fn classify(ch: char) -> KeyClass {
    if is_word_constituent(ch) {
        KeyClass::WordConstituent
    } else if ch == BACKSPACE {
        KeyClass::DeleteLast
    } else if ch == DELETE {
        KeyClass::Discard
    } else {
        KeyClass::Boundary
    }
}

/// Unicode general category L*, M* or N*.
pub fn is_word_constituent(ch: char) -> bool {
    use GeneralCategory::*;
    matches!(
        get_general_category(ch),
        UppercaseLetter
            | LowercaseLetter
            | TitlecaseLetter
            | ModifierLetter
            | OtherLetter
            | NonspacingMark
            | SpacingMark
            | EnclosingMark
            | DecimalNumber
            | LetterNumber
            | OtherNumber
    )
}

pub fn is_control(ch: char) -> bool {
    ch < FIRST_NONCONTROL_CHAR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_marks_and_numbers_build_words() {
        for ch in ['a', 'Z', 'é', 'ж', '中', '7', '٣', 'Ⅻ', '½', '\u{301}', '\u{93e}'] {
            assert_eq!(classify(ch), KeyClass::WordConstituent, "{ch:?}");
        }
    }

    #[test]
    fn punctuation_and_whitespace_are_boundaries() {
        for ch in [' ', '.', ',', '\n', '\t', '-', '_', '@', '€', '\r'] {
            assert_eq!(classify(ch), KeyClass::Boundary, "{ch:?}");
        }
    }

    #[test]
    fn editing_keys() {
        assert_eq!(classify(BACKSPACE), KeyClass::DeleteLast);
        assert_eq!(classify(DELETE), KeyClass::Discard);
    }

    #[test]
    fn control_boundary() {
        assert!(is_control('\n'));
        assert!(is_control(BACKSPACE));
        assert!(!is_control(' '));
        assert!(!is_control('a'));
    }
}
