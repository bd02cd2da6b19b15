//! Field normalization contracts applied while reading the input tables
//! (§6): names are case- and accent-folded, phone numbers and zip codes are
//! reduced to their digit content, and sex is read from its first letter.

use rh_pedigree::model::Sex;

/// Lowercases, folds common Latin-1 diacritics to their plain letter,
/// turns hyphens into spaces, and collapses surrounding/interior whitespace.
pub fn normalize_name(raw: &str) -> String {
    let folded: String = raw.chars().map(fold_diacritic).collect();
    folded
        .to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'a',
        'é' | 'è' | 'ê' | 'ë' | 'É' | 'È' | 'Ê' | 'Ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' | 'Í' | 'Ì' | 'Î' | 'Ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' | 'Ú' | 'Ù' | 'Û' | 'Ü' => 'u',
        'ñ' | 'Ñ' => 'n',
        'ç' | 'Ç' => 'c',
        other => other,
    }
}

/// Keeps only digit characters and takes the last 10. Rejects a number that
/// is fewer than 10 digits or is the all-zero placeholder some EHRs use for
/// "no phone on file".
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 10 {
        return None;
    }
    let last_ten = &digits[digits.len() - 10..];
    if last_ten.chars().all(|c| c == '0') {
        return None;
    }
    Some(last_ten.to_string())
}

/// Keeps only digit characters and takes the first 5 (US ZIP+4 truncation).
pub fn normalize_zip(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 5 {
        return None;
    }
    Some(digits[..5].to_string())
}

pub fn normalize_sex(raw: &str) -> Option<Sex> {
    Sex::parse(raw.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_accents_and_hyphens() {
        assert_eq!(normalize_name("Jos\u{e9}-Luis  Garc\u{ed}a"), "jose luis garcia");
    }

    #[test]
    fn phone_keeps_last_ten_digits() {
        assert_eq!(normalize_phone("+1 (555) 123-4567"), Some("5551234567".to_string()));
        assert_eq!(normalize_phone("555-1234"), None);
        assert_eq!(normalize_phone("0000000000"), None);
    }

    #[test]
    fn zip_keeps_first_five_digits() {
        assert_eq!(normalize_zip("10001-4567"), Some("10001".to_string()));
        assert_eq!(normalize_zip("123"), None);
    }

    #[test]
    fn sex_reads_first_letter() {
        assert_eq!(normalize_sex("female"), Some(Sex::F));
        assert_eq!(normalize_sex(" M "), Some(Sex::M));
    }
}
