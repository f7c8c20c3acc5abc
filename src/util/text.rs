use regex::Regex;

pub fn is_valid_email(value: &str) -> bool {
  let email = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("regex");
  email.is_match(value)
}

pub fn truncate_chars(value: &str, max: usize) -> String {
  match value.char_indices().nth(max) {
    Some((cut, _)) => value[..cut].to_string(),
    None => value.to_string(),
  }
}

pub fn is_blank(value: &str) -> bool {
  value.trim().is_empty()
}

#[cfg(test)]
mod tests {
  use super::{is_blank, is_valid_email, truncate_chars};

  #[test]
  fn email_needs_local_part_domain_and_tld() {
    assert!(is_valid_email("olena@example.com"));
    assert!(is_valid_email("a.b@c.d"));
    assert!(!is_valid_email("olena@example"));
    assert!(!is_valid_email("olena example@x.com"));
    assert!(!is_valid_email("@example.com"));
    assert!(!is_valid_email(""));
  }

  #[test]
  fn truncation_counts_characters_not_bytes() {
    assert_eq!(truncate_chars("Опитування", 4), "Опит");
    assert_eq!(truncate_chars("abc", 10), "abc");
    assert_eq!(truncate_chars("", 3), "");
  }

  #[test]
  fn whitespace_only_is_blank() {
    assert!(is_blank("   \n\t"));
    assert!(!is_blank(" a "));
  }
}
