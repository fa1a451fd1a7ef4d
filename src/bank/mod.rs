use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;

static BANK_DIR: Dir = include_dir!("src/bank");

/// A fixed pool of candidate strings a session draws its words from.
#[derive(Deserialize, Clone, Debug)]
pub struct WordBank {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordBank {
    /// The base English word pool.
    pub fn base() -> Self {
        read_bank_from_file("english.json")
    }

    /// Digits and number words, mixed in when `include_numbers` is set.
    pub fn numbers() -> Self {
        read_bank_from_file("numbers.json")
    }

    /// Punctuation tokens, mixed in when `include_punctuation` is set.
    pub fn punctuation() -> Self {
        read_bank_from_file("punctuation.json")
    }
}

// Banks ship inside the binary; a missing or malformed file is a build
// defect, not a runtime condition.
fn read_bank_from_file(file_name: &str) -> WordBank {
    let file = BANK_DIR.get_file(file_name).expect("Word bank not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret word bank as a string");

    from_str(file_as_str).expect("Unable to deserialize word bank json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_bank_loads() {
        let bank = WordBank::base();

        assert_eq!(bank.name, "english");
        assert!(!bank.words.is_empty());
        assert_eq!(bank.size as usize, bank.words.len());
    }

    #[test]
    fn test_numbers_bank_loads() {
        let bank = WordBank::numbers();

        assert_eq!(bank.name, "numbers");
        assert!(bank.words.contains(&"7".to_string()));
        assert!(bank.words.contains(&"million".to_string()));
    }

    #[test]
    fn test_punctuation_bank_loads() {
        let bank = WordBank::punctuation();

        assert_eq!(bank.name, "punctuation");
        assert!(bank.words.contains(&".".to_string()));
        assert!(bank.words.contains(&"?".to_string()));
    }

    #[test]
    fn test_bank_deserialization() {
        let json_data = r#"
        {
            "name": "test",
            "size": 3,
            "words": ["hello", "world", "test"]
        }
        "#;

        let bank: WordBank = from_str(json_data).expect("Failed to deserialize test bank");

        assert_eq!(bank.name, "test");
        assert_eq!(bank.size, 3);
        assert_eq!(bank.words.len(), 3);
    }

    #[test]
    #[should_panic(expected = "Word bank not found")]
    fn test_read_nonexistent_bank_file() {
        read_bank_from_file("nonexistent.json");
    }

    #[test]
    fn test_base_bank_covers_all_length_classes() {
        let bank = WordBank::base();
        let alnum_len =
            |w: &String| w.chars().filter(|c| c.is_alphanumeric()).count();

        assert!(bank.words.iter().any(|w| alnum_len(w) <= 4));
        assert!(bank.words.iter().any(|w| (5..=8).contains(&alnum_len(w))));
        assert!(bank.words.iter().any(|w| (9..=12).contains(&alnum_len(w))));
        assert!(bank.words.iter().any(|w| alnum_len(w) > 12));
    }
}
