/// Count words the way a mixed Chinese/English writer expects: every CJK character is
/// one word, and each run of ASCII letters or digits is one word.
pub fn count(text: &str) -> usize {
    let mut total = 0;
    let mut in_word = false;
    for c in text.chars() {
        if is_cjk(c) {
            total += 1;
            in_word = false;
        } else if c.is_ascii_alphanumeric() {
            if !in_word {
                total += 1;
                in_word = true;
            }
        } else {
            in_word = false;
        }
    }
    total
}

fn is_cjk(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF     // unified ideographs
        | 0x3400..=0x4DBF   // extension A
        | 0x20000..=0x2A6DF // extension B
        | 0xF900..=0xFAFF   // compatibility ideographs
        | 0x3000..=0x303F   // symbols and punctuation
        | 0xFF00..=0xFFEF   // half/full-width forms
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_ascii_words() {
        assert_eq!(count("Hello, world! 2024 is here"), 5);
        assert_eq!(count(""), 0);
        assert_eq!(count("   \n\t"), 0);
    }

    #[test]
    fn counts_each_cjk_character() {
        assert_eq!(count("你好世界"), 4);
        assert_eq!(count("你好，world"), 4);
    }

    #[test]
    fn cjk_splits_ascii_runs() {
        assert_eq!(count("abc中def"), 3);
    }

    #[test]
    fn other_letters_separate_words() {
        assert_eq!(count("naïve"), 2);
        assert_eq!(count("snake_case"), 2);
    }

    #[test]
    fn markdown_markup_is_not_counted() {
        assert_eq!(count("# Title\n\n- **bold** item"), 3);
    }
}
