/// Line-level rewriting of `uses:` statements
///
/// Works on raw text so comments, quoting and layout of every other line
/// survive byte for byte.
pub struct UsesRewriter;

/// Outcome of [`UsesRewriter::rewrite`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub content: String,
    /// 1-based line per replacement, `None` when no line matched
    pub line_numbers: Vec<Option<usize>>,
}

impl UsesRewriter {
    /// Applies `(old_uses, new_uses)` pairs in order
    ///
    /// Each pair rewrites the first `uses:` line still containing `old_uses`
    /// as a whole token. The text before `uses:` (indentation and a list
    /// `- ` marker) is kept; the rest of the line becomes `uses: <new_uses>`.
    pub fn rewrite<'a, I>(content: &str, replacements: I) -> Rewrite
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut lines: Vec<(String, &str)> = content
            .split_inclusive('\n')
            .map(|line| {
                let (body, ending) = split_line_ending(line);
                (body.to_string(), ending)
            })
            .collect();

        let line_numbers = replacements
            .into_iter()
            .map(|(old_uses, new_uses)| {
                lines.iter_mut().enumerate().find_map(|(index, (body, _))| {
                    let replaced = replace_uses_statement(body, old_uses, new_uses)?;
                    *body = replaced;
                    Some(index + 1)
                })
            })
            .collect();

        let content = lines
            .iter()
            .map(|(body, ending)| format!("{}{}", body, ending))
            .collect();

        Rewrite {
            content,
            line_numbers,
        }
    }
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn replace_uses_statement(line: &str, old_uses: &str, new_uses: &str) -> Option<String> {
    if old_uses.is_empty() {
        return None;
    }

    let uses_at = line.find("uses:")?;
    let prefix = &line[..uses_at];
    if !matches!(prefix.trim(), "" | "-") {
        return None;
    }

    let value = &line[uses_at + "uses:".len()..];
    if !contains_token(value, old_uses) {
        return None;
    }

    Some(format!("{}uses: {}", prefix, new_uses))
}

/// `needle` occurs delimited by whitespace, quotes, a comment or the line edges
fn contains_token(haystack: &str, needle: &str) -> bool {
    let is_delimiter = |c: char| c.is_whitespace() || c == '"' || c == '\'';

    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        before.map_or(true, is_delimiter) && after.map_or(true, |c| is_delimiter(c) || c == '#')
    })
}
