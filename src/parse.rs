use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;

/// Feeds every non-blank line of `reader` into `consume`, together with its 1-based line number.
pub(crate) fn consume_lines<I, R: From<io::Error>>(
    mut importer: I,
    reader: impl Read,
    mut consume: impl FnMut(I, usize, &str) -> Result<I, R>,
) -> Result<I, R> {
    for (line_number, line) in BufReader::new(reader).lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            importer = consume(importer, line_number + 1, trimmed)?;
        }
    }
    Ok(importer)
}

/// Returns the content of `line` in front of an optional `#` comment, without surrounding whitespace.
pub fn strip_comment(line: &str) -> &str {
    match line.split_once('#') {
        Some((content, _comment)) => content.trim(),
        None => line.trim(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strip_comments() {
        assert_eq!(strip_comment("5/4"), "5/4");
        assert_eq!(strip_comment("  5/4  "), "5/4");
        assert_eq!(strip_comment("5/4 # major third"), "5/4");
        assert_eq!(strip_comment("# only a comment"), "");
        assert_eq!(strip_comment("5/4#a#b"), "5/4");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let input = "first\n\n   \nsecond  \n";
        let lines = consume_lines(Vec::new(), input.as_bytes(), |mut lines, line_number, line| {
            lines.push((line_number, line.to_owned()));
            Ok::<_, io::Error>(lines)
        })
        .unwrap();

        assert_eq!(
            lines,
            [(1, "first".to_owned()), (4, "second".to_owned())]
        );
    }
}
