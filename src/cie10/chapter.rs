//! CIE-10 chapter lookup.

pub const UNDEFINED_CHAPTER: &str = "Undefined chapter";

/// Chapter title for a code, decided by its letter and, for the letters
/// split across chapters, the digits that follow it (at most two).
pub fn chapter_of(code: &str) -> &'static str {
    let code = code.trim();
    let letter = match code.chars().next() {
        Some(c) => c.to_ascii_uppercase(),
        None => return UNDEFINED_CHAPTER,
    };
    let digits: String = code[letter.len_utf8()..]
        .chars()
        .take(2)
        .take_while(|c| c.is_ascii_digit())
        .collect();
    let num = digits.parse::<u32>().ok();

    match (letter, num) {
        ('A', _) | ('B', _) => "I. Certain infectious and parasitic diseases",
        ('C', _) | ('D', Some(0..=48)) => "II. Neoplasms",
        ('D', Some(50..=89)) => {
            "III. Diseases of the blood and blood-forming organs and certain disorders involving the immune mechanism"
        }
        ('E', _) => "IV. Endocrine, nutritional and metabolic diseases",
        ('F', _) => "V. Mental and behavioural disorders",
        ('G', _) => "VI. Diseases of the nervous system",
        ('H', Some(0..=59)) => "VII. Diseases of the eye and adnexa",
        ('H', Some(60..=95)) => "VIII. Diseases of the ear and mastoid process",
        ('I', _) => "IX. Diseases of the circulatory system",
        ('J', _) => "X. Diseases of the respiratory system",
        ('K', _) => "XI. Diseases of the digestive system",
        ('L', _) => "XII. Diseases of the skin and subcutaneous tissue",
        ('M', _) => "XIII. Diseases of the musculoskeletal system and connective tissue",
        ('N', _) => "XIV. Diseases of the genitourinary system",
        ('O', _) => "XV. Pregnancy, childbirth and the puerperium",
        ('P', _) => "XVI. Certain conditions originating in the perinatal period",
        ('Q', _) => "XVII. Congenital malformations, deformations and chromosomal abnormalities",
        ('R', _) => {
            "XVIII. Symptoms, signs and abnormal clinical and laboratory findings, not elsewhere classified"
        }
        ('S', _) | ('T', _) => {
            "XIX. Injury, poisoning and certain other consequences of external causes"
        }
        ('V', _) | ('W', _) | ('X', _) | ('Y', _) => "XX. External causes of morbidity and mortality",
        ('Z', _) => {
            "XXI. Factors influencing health status and contact with health services"
        }
        ('U', _) => "XXII. Codes for special purposes",
        _ => UNDEFINED_CHAPTER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_letter_chapters() {
        assert!(chapter_of("A09X").starts_with("I."));
        assert!(chapter_of("J00X").starts_with("X."));
        assert!(chapter_of("z000").starts_with("XXI."));
        assert!(chapter_of("U071").starts_with("XXII."));
    }

    #[test]
    fn d_is_split_at_49() {
        assert!(chapter_of("D48").starts_with("II."));
        assert!(chapter_of("C509").starts_with("II."));
        assert!(chapter_of("D50").starts_with("III."));
        assert!(chapter_of("D899").starts_with("III."));
        assert_eq!(chapter_of("D49"), UNDEFINED_CHAPTER);
        assert_eq!(chapter_of("D90"), UNDEFINED_CHAPTER);
    }

    #[test]
    fn short_codes_use_the_digits_they_have() {
        assert!(chapter_of("D4").starts_with("II."));
        assert!(chapter_of("d4").starts_with("II."));
        assert!(chapter_of("H6X").starts_with("VII."));
        assert_eq!(chapter_of("DX1"), UNDEFINED_CHAPTER);
    }

    #[test]
    fn h_is_split_at_60() {
        assert!(chapter_of("H59").starts_with("VII."));
        assert!(chapter_of("H60").starts_with("VIII."));
        assert!(chapter_of("H95").starts_with("VIII."));
        assert_eq!(chapter_of("H96"), UNDEFINED_CHAPTER);
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(chapter_of(""), UNDEFINED_CHAPTER);
        assert_eq!(chapter_of("D"), UNDEFINED_CHAPTER);
        assert_eq!(chapter_of("9AB"), UNDEFINED_CHAPTER);
    }
}
