/// A `(label, value)` line of a plain text description.
pub type Descriptor = (String, String);

pub const DESCRIBE_WIDTH: usize = 66;

/// Renders descriptors as right aligned labels followed by their values,
/// wrapped with continuation lines indented under the value column. The
/// final newline is omitted.
pub fn render(descriptors: &[Descriptor]) -> String {
    let pad = format!("\n{}", " ".repeat(14));
    descriptors
        .iter()
        .map(|(label, value)| format!("{:>12}: {}", label, wrap(value, DESCRIBE_WIDTH).join(&pad)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Greedy word wrap. Runs of whitespace collapse to one space and words
/// longer than a line are split.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        loop {
            let current_len = current.chars().count();
            let needed = if current.is_empty() {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed <= width {
                if !current.is_empty() {
                    current.push(' ');
                }
                current.extend(word.iter());
                break;
            }
            if word.len() > width {
                // break the long word into what is left of this line
                let room = if current.is_empty() {
                    width
                } else {
                    width.saturating_sub(current_len + 1)
                };
                if room == 0 {
                    lines.push(std::mem::take(&mut current));
                    continue;
                }
                if !current.is_empty() {
                    current.push(' ');
                }
                current.extend(word.drain(..room));
                lines.push(std::mem::take(&mut current));
                continue;
            }
            lines.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_aligns_labels() {
        let text = render(&[
            ("Name".to_string(), "temp".to_string()),
            ("Type".to_string(), "Float (float,flt4)".to_string()),
        ]);
        assert_eq!(
            text,
            "        Name: temp\n        Type: Float (float,flt4)"
        );
    }

    #[test]
    fn test_wrap_continuation_indent() {
        let long = "word ".repeat(20);
        let text = render(&[("Description".to_string(), long)]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" Description: word"));
        assert!(lines[1].starts_with(&" ".repeat(14)));
        assert!(lines[0].len() <= 14 + DESCRIBE_WIDTH);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = wrap(&"x".repeat(10), 4);
        assert_eq!(lines, vec!["xxxx", "xxxx", "xx"]);
        assert_eq!(wrap("a  b\n c", 10), vec!["a b c"]);
        assert_eq!(wrap("", 10), vec![""]);
    }
}
