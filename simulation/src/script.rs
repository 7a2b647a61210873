use maze_pursuit_core::Direction;
use thiserror::Error;

/// Failures while reading an input script.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A line did not have the `<step> <direction>` shape.
    #[error("line {line}: expected `<step> <direction>`, found `{content}`")]
    Malformed {
        /// One-based line number.
        line: usize,
        /// Offending line.
        content: String,
    },
    /// The step column was not a non-negative integer.
    #[error("line {line}: invalid step `{token}`")]
    InvalidStep {
        /// One-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// The direction column was not recognised.
    #[error("line {line}: unknown direction `{token}`")]
    UnknownDirection {
        /// One-based line number.
        line: usize,
        /// Offending token.
        token: String,
    },
    /// Steps must strictly increase from line to line.
    #[error("line {line}: step {step} does not follow step {previous}")]
    OutOfOrder {
        /// One-based line number.
        line: usize,
        /// Step on this line.
        step: u64,
        /// Step on the previous entry.
        previous: u64,
    },
}

/// Scripted player intent, held from each listed step until the next one.
///
/// ```text
/// # step direction
/// 0    left
/// 140  up
/// 300  none
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputScript {
    entries: Vec<(u64, Option<Direction>)>,
}

impl InputScript {
    /// Parses the line-oriented script format.
    pub fn parse(source: &str) -> Result<Self, ScriptError> {
        let mut entries: Vec<(u64, Option<Direction>)> = Vec::new();
        for (index, raw) in source.lines().enumerate() {
            let line = index + 1;
            let content = raw.split('#').next().unwrap_or_default().trim();
            if content.is_empty() {
                continue;
            }

            let mut tokens = content.split_whitespace();
            let (Some(step_token), Some(direction_token), None) =
                (tokens.next(), tokens.next(), tokens.next())
            else {
                return Err(ScriptError::Malformed {
                    line,
                    content: content.to_owned(),
                });
            };

            let step = step_token
                .parse::<u64>()
                .map_err(|_| ScriptError::InvalidStep {
                    line,
                    token: step_token.to_owned(),
                })?;
            let direction = parse_direction(direction_token).ok_or_else(|| {
                ScriptError::UnknownDirection {
                    line,
                    token: direction_token.to_owned(),
                }
            })?;

            if let Some(&(previous, _)) = entries.last() {
                if step <= previous {
                    return Err(ScriptError::OutOfOrder {
                        line,
                        step,
                        previous,
                    });
                }
            }
            entries.push((step, direction));
        }
        Ok(Self { entries })
    }

    /// Intent in effect at `step`.
    #[must_use]
    pub fn direction_at(&self, step: u64) -> Option<Direction> {
        let index = self.entries.partition_point(|(start, _)| *start <= step);
        index
            .checked_sub(1)
            .and_then(|index| self.entries[index].1)
    }

    /// Reports whether the script holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_direction(token: &str) -> Option<Option<Direction>> {
    match token.to_ascii_lowercase().as_str() {
        "up" | "u" => Some(Some(Direction::Up)),
        "down" | "d" => Some(Some(Direction::Down)),
        "left" | "l" => Some(Some(Direction::Left)),
        "right" | "r" => Some(Some(Direction::Right)),
        "none" | "-" => Some(None),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holds_each_direction_until_the_next_entry() {
        let script = InputScript::parse("# demo\n5 left\n10 Up # turn\n\n20 none\n")
            .expect("script parses");
        assert_eq!(script.direction_at(0), None);
        assert_eq!(script.direction_at(5), Some(Direction::Left));
        assert_eq!(script.direction_at(9), Some(Direction::Left));
        assert_eq!(script.direction_at(10), Some(Direction::Up));
        assert_eq!(script.direction_at(25), None);
    }

    #[test]
    fn reports_the_offending_line() {
        assert_eq!(
            InputScript::parse("0 left\n3 sideways"),
            Err(ScriptError::UnknownDirection {
                line: 2,
                token: "sideways".to_owned(),
            })
        );
        assert_eq!(
            InputScript::parse("x left"),
            Err(ScriptError::InvalidStep {
                line: 1,
                token: "x".to_owned(),
            })
        );
        assert_eq!(
            InputScript::parse("4 left extra"),
            Err(ScriptError::Malformed {
                line: 1,
                content: "4 left extra".to_owned(),
            })
        );
        assert_eq!(
            InputScript::parse("4 left\n4 up"),
            Err(ScriptError::OutOfOrder {
                line: 2,
                step: 4,
                previous: 4,
            })
        );
    }
}
