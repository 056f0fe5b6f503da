/// Greedy word wrap for the error box. A word longer than `width` gets a
/// line of its own rather than being broken.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = vec![String::new()];

    for word in text.split_whitespace() {
        let line = lines.last_mut().expect("lines starts non-empty");
        if line.is_empty() {
            line.push_str(word);
        } else if line.len() + word.len() < width {
            line.push(' ');
            line.push_str(word);
        } else {
            lines.push(word.to_string());
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap("hello world", 20), vec!["hello world"]);
    }

    #[test]
    fn long_text_breaks_at_the_width() {
        let lines = wrap("one two three four five six", 9);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.len() <= 9);
        }
        assert_eq!(lines.join(" "), "one two three four five six");
    }

    #[test]
    fn empty_text_yields_one_empty_line() {
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let lines = wrap("ok reallyquitelongword ok", 8);
        assert!(lines.contains(&"reallyquitelongword".to_string()));
    }
}
