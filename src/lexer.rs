//! Splitting an input line into words.

/// One tokenized input line.
///
/// Tokens borrow from the line they were split from. None of them is empty
/// and none contains whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine<'a> {
    tokens: Vec<&'a str>,
    background: bool,
}

impl<'a> CommandLine<'a> {
    /// All tokens, command name first.
    pub fn tokens(&self) -> &[&'a str] {
        &self.tokens
    }

    /// The command name, if the line had any words at all.
    pub fn name(&self) -> Option<&'a str> {
        self.tokens.first().copied()
    }

    /// Tokens after the command name.
    pub fn args(&self) -> &[&'a str] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    /// Whether the line ended with a standalone `&`.
    pub fn background(&self) -> bool {
        self.background
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    /// Inside a word that began at this byte offset.
    ReadingWord(usize),
}

fn is_delimiter(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n')
}

/// Split `line` on spaces, tabs and newlines.
///
/// A final token that is exactly `&` is removed and marks the command as a
/// background one. A blank line produces no tokens.
pub fn split_into_tokens(line: &str) -> CommandLine<'_> {
    let mut tokens = Vec::new();
    let mut state = LexingState::Start;

    for (pos, ch) in line.char_indices() {
        state = match (state, is_delimiter(ch)) {
            (LexingState::Start, true) => LexingState::Start,
            (LexingState::Start, false) => LexingState::ReadingWord(pos),
            (LexingState::ReadingWord(start), true) => {
                tokens.push(&line[start..pos]);
                LexingState::Start
            }
            (word @ LexingState::ReadingWord(_), false) => word,
        };
    }
    if let LexingState::ReadingWord(start) = state {
        tokens.push(&line[start..]);
    }

    let background = tokens.last() == Some(&"&");
    if background {
        tokens.pop();
    }

    CommandLine { tokens, background }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_every_delimiter() {
        let cmd = split_into_tokens("ls  -l\t/tmp\n");
        assert_eq!(cmd.tokens(), &["ls", "-l", "/tmp"]);
        assert_eq!(cmd.name(), Some("ls"));
        assert_eq!(cmd.args(), &["-l", "/tmp"]);
        assert!(!cmd.background());
    }

    #[test]
    fn test_leading_and_trailing_whitespace() {
        let cmd = split_into_tokens("   pwd   ");
        assert_eq!(cmd.tokens(), &["pwd"]);
        assert!(cmd.args().is_empty());
    }

    #[test]
    fn test_blank_lines_have_no_tokens() {
        for line in ["", " ", "\t\t", " \n"] {
            let cmd = split_into_tokens(line);
            assert!(cmd.is_empty(), "{line:?} should not produce tokens");
            assert_eq!(cmd.name(), None);
            assert!(cmd.args().is_empty());
        }
    }

    #[test]
    fn test_trailing_ampersand_sets_background() {
        let cmd = split_into_tokens("sleep 5 &");
        assert_eq!(cmd.tokens(), &["sleep", "5"]);
        assert!(cmd.background());
    }

    #[test]
    fn test_ampersand_must_be_its_own_last_token() {
        let glued = split_into_tokens("sleep 5&");
        assert_eq!(glued.tokens(), &["sleep", "5&"]);
        assert!(!glued.background());

        let middle = split_into_tokens("echo & done");
        assert_eq!(middle.tokens(), &["echo", "&", "done"]);
        assert!(!middle.background());
    }

    #[test]
    fn test_lone_ampersand() {
        let cmd = split_into_tokens(" & ");
        assert!(cmd.is_empty());
        assert!(cmd.background());
    }

    #[test]
    fn test_non_ascii_words() {
        let cmd = split_into_tokens("echo héllo wörld");
        assert_eq!(cmd.tokens(), &["echo", "héllo", "wörld"]);
    }
}
