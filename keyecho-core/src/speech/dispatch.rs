//! Rate-scoped dispatch to the host speech sink.
//!
//! A non-zero offset is always paired with a reset in the same call, so the
//! override never outlives the utterance it was made for.

use super::{SpeechCommand, SpeechHost, SpeechSequence, SpellOptions};
use crate::error::Result;
use crate::typing::SpeechRequest;

/// Wrap `sequence` as `[rate(offset)] + sequence + [rate(reset)]`.
/// A zero offset returns the sequence untouched.
pub fn with_rate_offset(sequence: SpeechSequence, offset: i32) -> SpeechSequence {
    if offset == 0 {
        return sequence;
    }
    let mut wrapped = Vec::with_capacity(sequence.len() + 2);
    wrapped.push(SpeechCommand::Rate(Some(offset)));
    wrapped.extend(sequence);
    wrapped.push(SpeechCommand::Rate(None));
    wrapped
}

/// Speak a prepared sequence at `offset`.
pub fn speak_with_offset<H>(host: &H, sequence: SpeechSequence, offset: i32) -> Result<()>
where
    H: SpeechHost + ?Sized,
{
    host.speak(with_rate_offset(sequence, offset))
}

/// Expand a request into speech and dispatch it at `offset`.
///
/// Characters go through the host's spelling builder; words are spoken as
/// plain text.
pub fn speak_request<H>(host: &H, request: &SpeechRequest, offset: i32) -> Result<()>
where
    H: SpeechHost + ?Sized,
{
    let sequence = match request {
        SpeechRequest::Character(ch) => {
            let mut buf = [0u8; 4];
            host.spelling_sequence(ch.encode_utf8(&mut buf), &SpellOptions::default())?
        }
        SpeechRequest::Word(word) => vec![SpeechCommand::Text(word.clone())],
    };
    speak_with_offset(host, sequence, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> SpeechCommand {
        SpeechCommand::Text(s.into())
    }

    #[test]
    fn zero_offset_forwards_unmodified() {
        let seq = vec![text("a"), SpeechCommand::EndUtterance];
        assert_eq!(with_rate_offset(seq.clone(), 0), seq);
    }

    #[test]
    fn nonzero_offset_is_scoped_to_the_sequence() {
        let seq = vec![text("hello"), SpeechCommand::EndUtterance];
        assert_eq!(
            with_rate_offset(seq, -15),
            vec![
                SpeechCommand::Rate(Some(-15)),
                text("hello"),
                SpeechCommand::EndUtterance,
                SpeechCommand::Rate(None),
            ]
        );
    }

    #[test]
    fn empty_sequence_still_restores_rate() {
        assert_eq!(
            with_rate_offset(Vec::new(), 40),
            vec![SpeechCommand::Rate(Some(40)), SpeechCommand::Rate(None)]
        );
    }
}
