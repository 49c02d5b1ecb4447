//! The two-state template scanner.
//!
//! Text outside `${...}` is copied verbatim. There is no escape syntax: a lone
//! `$`, `{` or `}` is ordinary text.

use crate::error::InterpolationError;

/// Scanner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Copying plain text.
    Out,
    /// Inside an expression. `marker` is the byte offset of the opening `$`.
    In { marker: usize },
}

/// What the driver does with the current character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Append the current character to the output.
    Copy,
    /// Drop the current character.
    Skip,
    /// Start an expression; the lookahead `{` is consumed too.
    Open,
    /// Evaluate `template[start..end]`; the lookahead `}` is consumed too.
    Evaluate { start: usize, end: usize },
}

/// The transition function.
///
/// `index` is the byte offset of `current`. Only one character of lookahead is
/// ever needed.
pub fn step(state: State, index: usize, current: char, lookahead: Option<char>) -> (State, Action) {
    match state {
        State::Out if current == '$' && lookahead == Some('{') => {
            (State::In { marker: index }, Action::Open)
        }
        State::Out => (State::Out, Action::Copy),
        State::In { marker } if lookahead == Some('}') => (
            State::Out,
            Action::Evaluate {
                start: marker + 2,
                end: index + current.len_utf8(),
            },
        ),
        State::In { .. } => (state, Action::Skip),
    }
}

/// Run the scanner over `template`, replacing each expression with the output
/// of `evaluate`.
pub fn scan<F>(template: &str, mut evaluate: F) -> Result<String, InterpolationError>
where
    F: FnMut(&str) -> Result<String, InterpolationError>,
{
    let mut output = String::with_capacity(template.len());
    let mut state = State::Out;
    let mut chars = template.char_indices().peekable();

    while let Some((index, current)) = chars.next() {
        let lookahead = chars.peek().map(|&(_, c)| c);
        let (next, action) = step(state, index, current, lookahead);
        state = next;

        match action {
            Action::Copy => output.push(current),
            Action::Skip => {}
            Action::Open => {
                chars.next();
            }
            Action::Evaluate { start, end } => {
                output.push_str(&evaluate(&template[start..end])?);
                chars.next();
            }
        }
    }

    if let State::In { marker } = state {
        return Err(InterpolationError::Unterminated {
            fragment: template[marker..].to_string(),
        });
    }

    Ok(output)
}
