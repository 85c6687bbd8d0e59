//! Splitting raw SQL scripts into executable batches.
//!
//! Two splitters cover the scripts migrations embed: [`split_go_batches`]
//! for T-SQL scripts separated by `GO` lines, and [`split_plsql_batches`]
//! for Oracle scripts where semicolons inside `BEGIN`/`END` blocks must not
//! terminate the statement.
//!
//! Both are single-pass character scanners; neither attempts to parse SQL.

/// Scanner state shared by both splitters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    LineComment,
    BlockComment,
    SingleQuoted,
    DoubleQuoted,
    BracketQuoted,
}

/// Splits a T-SQL script on `GO` separator lines.
///
/// A separator is a line holding only `GO` (case-insensitive), optionally
/// followed by a repeat count, which is ignored. `GO` inside string
/// literals, comments, or bracketed identifiers never separates. Empty
/// batches are dropped.
pub fn split_go_batches(script: &str) -> Vec<String> {
    let mut batches = Vec::new();
    let mut current = String::new();
    let mut state = ScanState::Normal;

    for line in script.lines() {
        if state == ScanState::Normal && is_go_line(line) {
            push_batch(&mut batches, &mut current);
            continue;
        }
        current.push_str(line);
        current.push('\n');
        state = scan_line(line, state);
    }
    push_batch(&mut batches, &mut current);
    batches
}

fn push_batch(batches: &mut Vec<String>, current: &mut String) {
    let batch = current.trim();
    if !batch.is_empty() {
        batches.push(batch.to_string());
    }
    current.clear();
}

fn is_go_line(line: &str) -> bool {
    let trimmed = line.trim();
    let Some(rest) = trimmed
        .get(..2)
        .filter(|head| head.eq_ignore_ascii_case("go"))
        .and_then(|_| trimmed.get(2..))
    else {
        return false;
    };
    let rest = rest.trim();
    rest.is_empty() || rest.chars().all(|c| c.is_ascii_digit())
}

/// Advances the scanner across one line. Line comments end with the line;
/// block comments and quoted regions carry over.
fn scan_line(line: &str, mut state: ScanState) -> ScanState {
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        state = match state {
            ScanState::Normal => match c {
                '-' if chars.peek() == Some(&'-') => return carry_over(ScanState::Normal),
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    ScanState::BlockComment
                }
                '\'' => ScanState::SingleQuoted,
                '"' => ScanState::DoubleQuoted,
                '[' => ScanState::BracketQuoted,
                _ => ScanState::Normal,
            },
            ScanState::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    ScanState::Normal
                } else {
                    ScanState::BlockComment
                }
            }
            ScanState::SingleQuoted => {
                if c == '\'' {
                    // A doubled quote re-enters the literal on the next char.
                    ScanState::Normal
                } else {
                    ScanState::SingleQuoted
                }
            }
            ScanState::DoubleQuoted => {
                if c == '"' {
                    ScanState::Normal
                } else {
                    ScanState::DoubleQuoted
                }
            }
            ScanState::BracketQuoted => {
                if c == ']' {
                    ScanState::Normal
                } else {
                    ScanState::BracketQuoted
                }
            }
            ScanState::LineComment => ScanState::LineComment,
        };
    }
    carry_over(state)
}

fn carry_over(state: ScanState) -> ScanState {
    if state == ScanState::LineComment {
        ScanState::Normal
    } else {
        state
    }
}

/// Splits an Oracle script into statements.
///
/// Plain statements end at a top-level semicolon, which is dropped.
/// `BEGIN`/`DECLARE` open a block; the matching `END;` closes it and the
/// whole block becomes one statement with its inner semicolons and the
/// trailing `;` intact. `CASE` expressions and statements open their own
/// scope, so the `END` or `END CASE` closing them never closes the block;
/// `END IF` and `END LOOP` close their compound statement only.
pub fn split_plsql_batches(script: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut word = String::new();
    let mut state = ScanState::Normal;
    // One entry per open block or CASE scope; `true` until a DECLARE sees
    // its BEGIN.
    let mut blocks: Vec<bool> = Vec::new();
    let mut pending_end = false;

    let mut chars = script.chars().peekable();
    while let Some(c) = chars.next() {
        match state {
            ScanState::Normal => {
                if c.is_ascii_alphanumeric() || c == '_' {
                    word.push(c);
                    current.push(c);
                    continue;
                }
                flush_word(&mut word, &mut blocks, &mut pending_end);

                match c {
                    '-' if chars.peek() == Some(&'-') => {
                        current.push(c);
                        state = ScanState::LineComment;
                    }
                    '/' if chars.peek() == Some(&'*') => {
                        current.push(c);
                        state = ScanState::BlockComment;
                    }
                    '\'' => {
                        current.push(c);
                        state = ScanState::SingleQuoted;
                    }
                    '"' => {
                        current.push(c);
                        state = ScanState::DoubleQuoted;
                    }
                    ';' => {
                        if pending_end {
                            // END; closes the innermost block.
                            blocks.pop();
                            pending_end = false;
                            if blocks.is_empty() {
                                current.push(';');
                                push_batch(&mut statements, &mut current);
                                continue;
                            }
                        } else if blocks.is_empty() {
                            push_batch(&mut statements, &mut current);
                            continue;
                        }
                        current.push(';');
                    }
                    _ => current.push(c),
                }
            }
            ScanState::LineComment => {
                current.push(c);
                if c == '\n' {
                    state = ScanState::Normal;
                }
            }
            ScanState::BlockComment => {
                current.push(c);
                if c == '*' && chars.peek() == Some(&'/') {
                    current.push('/');
                    chars.next();
                    state = ScanState::Normal;
                }
            }
            ScanState::SingleQuoted => {
                current.push(c);
                if c == '\'' {
                    state = ScanState::Normal;
                }
            }
            ScanState::DoubleQuoted => {
                current.push(c);
                if c == '"' {
                    state = ScanState::Normal;
                }
            }
            ScanState::BracketQuoted => {
                current.push(c);
            }
        }
    }
    flush_word(&mut word, &mut blocks, &mut pending_end);
    push_batch(&mut statements, &mut current);
    statements
}

/// Classifies a completed keyword and updates the scope stack. `CASE`
/// opens a scope of its own so the `END` terminating a CASE expression or
/// statement never closes the enclosing block.
fn flush_word(word: &mut String, blocks: &mut Vec<bool>, pending_end: &mut bool) {
    if word.is_empty() {
        return;
    }
    let upper = word.to_ascii_uppercase();
    word.clear();

    if *pending_end {
        *pending_end = false;
        // END IF / END LOOP close a compound statement, not a scope;
        // any other END pops the innermost one.
        if !matches!(upper.as_str(), "IF" | "LOOP") {
            blocks.pop();
        }
        if upper == "END" {
            *pending_end = true;
        }
        return;
    }

    match upper.as_str() {
        "DECLARE" => blocks.push(true),
        "BEGIN" => match blocks.last_mut() {
            // The BEGIN that follows a DECLARE belongs to the same block.
            Some(awaiting) if *awaiting => *awaiting = false,
            _ => blocks.push(false),
        },
        "CASE" => blocks.push(false),
        "END" => *pending_end = true,
        _ => {}
    }
}
