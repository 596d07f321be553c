//! Простые функции валидации для входных DTO.
//! Позволяет раннее отбрасывание некорректных данных.

use regex::Regex;

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Оценки (настроение, энергия, качество сна) задаются по шкале 1..=10.
pub fn score_in_range(score: i16) -> bool {
    (1..=10).contains(&score)
}

/// Физиологически осмысленный диапазон пульса.
pub fn bpm_in_range(bpm: i16) -> bool {
    (20..=300).contains(&bpm)
}

pub fn ensure_max_len(value: &str, max: usize) -> bool {
    value.len() <= max
}

pub fn one_of(value: &str, allowed: &[&str]) -> bool {
    allowed.contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(validate_email("ada@example.com"));
        assert!(!validate_email("not-an-email"));
        assert!(!validate_email("missing@tld"));
    }

    #[test]
    fn score_bounds() {
        assert!(score_in_range(1));
        assert!(score_in_range(10));
        assert!(!score_in_range(0));
        assert!(!score_in_range(11));
    }

    #[test]
    fn bpm_bounds() {
        assert!(bpm_in_range(60));
        assert!(!bpm_in_range(19));
        assert!(!bpm_in_range(301));
    }

    #[test]
    fn one_of_checks_membership() {
        assert!(one_of("lunch", &["breakfast", "lunch", "dinner", "snack"]));
        assert!(!one_of("brunch", &["breakfast", "lunch", "dinner", "snack"]));
    }
}
