//! Splitting a single WebSocket text message into protocol frames.
//!
//! A message may carry one or more newline-terminated frames. `\r` is
//! stripped before splitting (so `\r\n` line endings behave like `\n`), and
//! empty frames are dropped — there is no partial-frame buffering across
//! messages, each message is fully self-delimiting.

/// Splits `text` into its non-empty frames, in order.
pub fn split_frames(text: &str) -> Vec<String> {
    text.replace('\r', "")
        .split('\n')
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_two_frames() {
        let frames = split_frames("A1B2\nA1B200112233445566778899\n");
        assert_eq!(frames, vec!["A1B2", "A1B200112233445566778899"]);
    }

    #[test]
    fn drops_empty_frames() {
        assert!(split_frames("\n\n").is_empty());
        assert!(split_frames("").is_empty());
    }

    #[test]
    fn strips_carriage_returns_before_splitting() {
        assert_eq!(split_frames("A1B2\r\nL\r\n"), vec!["A1B2", "L"]);
    }

    #[test]
    fn tolerates_a_missing_trailing_newline() {
        assert_eq!(split_frames("L"), vec!["L"]);
    }
}
