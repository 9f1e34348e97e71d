use thiserror::Error;

/// Failure to parse or resolve a command script.
///
/// Parse errors (`Syntax`, `Regex`) are raised before any edit is made.
/// Resolution errors (`NoMatch`, `OutOfOrder`) are raised before the first
/// command of the script runs.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("syntax error at {pos}: {message} (found {token})")]
    Syntax {
        pos: usize,
        token: String,
        message: String,
    },

    #[error("invalid regex /{pattern}/: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("no match for /{pattern}/")]
    NoMatch { pattern: String },

    #[error("address range out of order: {start} > {end}")]
    OutOfOrder { start: usize, end: usize },
}

impl CommandError {
    pub(crate) fn syntax(pos: usize, token: impl ToString, message: impl Into<String>) -> Self {
        Self::Syntax {
            pos,
            token: token.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = CommandError::syntax(3, "','", "wrong address");
        assert_eq!(e.to_string(), "syntax error at 3: wrong address (found ',')");
        let e = CommandError::NoMatch {
            pattern: "zzz".into(),
        };
        assert_eq!(e.to_string(), "no match for /zzz/");
        let e = CommandError::OutOfOrder { start: 9, end: 2 };
        assert_eq!(e.to_string(), "address range out of order: 9 > 2");
    }
}
